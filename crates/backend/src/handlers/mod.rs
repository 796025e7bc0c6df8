pub mod a001_site;
pub mod a002_daily_report;
pub mod a003_monthly_history;
pub mod a004_marketing_proposal;
pub mod d400_ceo_summary;
pub mod sys_rollover;
pub mod u100_sales_forecast;
