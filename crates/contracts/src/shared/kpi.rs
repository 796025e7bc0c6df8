use serde::{Deserialize, Serialize};

/// Month progress for a reference date, weighted by effective business days
///
/// Derived on each call, never persisted. An effective business day weights a
/// calendar day by expected sales volume: 1.0 for a full weekday, 0.5 for a
/// Saturday or holiday, 0.0 for a Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthProgress {
    /// Calendar days in the month of the reference date
    #[serde(rename = "totalDays")]
    pub total_days: u32,
    /// Day-of-month of the reference date, 1-indexed
    #[serde(rename = "elapsedDays")]
    pub elapsed_days: u32,
    /// Weighted sum over days 1..=elapsed_days
    #[serde(rename = "effectivePast")]
    pub effective_past: f64,
    /// Weighted sum over the remaining days of the month
    #[serde(rename = "effectiveRemaining")]
    pub effective_remaining: f64,
}

impl MonthProgress {
    /// Total effective weight of the month
    pub fn effective_total(&self) -> f64 {
        self.effective_past + self.effective_remaining
    }
}

/// Classification of the compliance deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Above,
    OnTrack,
    Below,
}

/// Expected-vs-actual revenue deviation for a site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Compliance {
    /// Time-weighted expected revenue-to-date
    pub expected: f64,
    /// Signed deviation: revenue_to_date - expected
    pub difference: f64,
    pub status: ComplianceStatus,
}

/// AI-assisted projection of the total month revenue for one site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesForecast {
    /// Projected total monthly revenue
    pub forecast: f64,
    /// One-sentence rationale from the provider
    pub reasoning: String,
}
