pub mod rollover;
