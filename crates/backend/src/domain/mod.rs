pub mod a001_site;
pub mod a002_daily_report;
pub mod a003_monthly_history;
pub mod a004_marketing_proposal;
