use crate::shared::kpi::{Compliance, MonthProgress, SalesForecast};
use serde::{Deserialize, Serialize};

/// Request for the CEO summary dashboard
///
/// With no reference date the server uses today's date.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CeoSummaryRequest {
    /// Reference date in format "YYYY-MM-DD"
    pub date: Option<String>,
}

/// Response for the CEO summary dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CeoSummaryResponse {
    /// Period in format "YYYY-MM"
    pub period: String,
    /// Month progress used for every compliance figure below
    pub progress: MonthProgress,
    /// One row per active site
    pub rows: Vec<SiteSummaryRow>,
    /// Chain-wide totals
    pub totals: ChainTotals,
}

/// Per-site KPI row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSummaryRow {
    pub site_id: String,
    pub site_code: String,
    pub site_name: String,
    pub revenue_to_date: f64,
    pub monthly_goal: f64,
    pub retention_rate: f64,
    pub nps_score: f64,
    pub average_ticket: f64,
    pub compliance: Compliance,
    /// Cached forecast for the current revenue, if one exists. The dashboard
    /// never calls the provider itself; the forecast endpoints do.
    pub forecast: Option<SalesForecast>,
}

/// Chain-wide aggregates across all sites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainTotals {
    pub revenue_to_date: f64,
    pub monthly_goal: f64,
    pub compliance: Compliance,
    /// Simple mean over sites with a nonzero NPS
    pub average_nps: f64,
}
