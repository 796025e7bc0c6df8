pub mod calendar;
pub mod compliance;
pub mod config;
pub mod data;
pub mod forecast;
pub mod nps;
