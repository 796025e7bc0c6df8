use async_trait::async_trait;
use contracts::domain::a001_site::aggregate::SiteId;
use contracts::shared::kpi::{MonthProgress, SalesForecast};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Forecast provider errors
///
/// Every variant means the same thing to the caller: the forecast is
/// unavailable right now. The engine never retries; the UI shows a non-fatal
/// warning and keeps whatever value it had.
#[derive(Debug, Clone, Error)]
pub enum ForecastError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Input handed to the external forecast provider
///
/// `recent_daily_revenues` carries the last seven (or fewer) daily values,
/// most recent first; the provider controls how it interprets the ordering.
#[derive(Debug, Clone)]
pub struct ForecastInput {
    pub recent_daily_revenues: Vec<f64>,
    pub current_month_revenue: f64,
    pub progress: MonthProgress,
}

/// External projection of the total month revenue
#[async_trait]
pub trait SalesForecastProvider: Send + Sync {
    async fn project_month_total(
        &self,
        input: &ForecastInput,
    ) -> Result<SalesForecast, ForecastError>;

    fn provider_name(&self) -> &str;
}

/// Cache key: a forecast is valid only while the site's revenue-to-date is
/// unchanged. Revenue is keyed in cents so float formatting never splits
/// logically-equal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForecastKey {
    pub site_id: SiteId,
    pub revenue_cents: i64,
}

impl ForecastKey {
    pub fn new(site_id: SiteId, current_revenue: f64) -> Self {
        Self {
            site_id,
            revenue_cents: (current_revenue * 100.0).round() as i64,
        }
    }
}

/// Pluggable forecast result store (get/set by structured key)
pub trait ForecastStore: Send + Sync {
    fn get(&self, key: &ForecastKey) -> Option<SalesForecast>;
    fn put(&self, key: ForecastKey, forecast: SalesForecast);
}

/// Session-scoped in-memory store
#[derive(Default)]
pub struct InMemoryForecastStore {
    entries: RwLock<HashMap<ForecastKey, SalesForecast>>,
}

impl InMemoryForecastStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ForecastStore for InMemoryForecastStore {
    fn get(&self, key: &ForecastKey) -> Option<SalesForecast> {
        self.entries
            .read()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    fn put(&self, key: ForecastKey, forecast: SalesForecast) {
        if let Ok(mut map) = self.entries.write() {
            map.insert(key, forecast);
        }
    }
}
