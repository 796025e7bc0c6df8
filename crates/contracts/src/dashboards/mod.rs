pub mod d400_ceo_summary;
