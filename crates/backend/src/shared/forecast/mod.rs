pub mod cache;
pub mod openai_provider;
pub mod types;

use once_cell::sync::OnceCell;

static FORECAST_CACHE: OnceCell<cache::ForecastCache> = OnceCell::new();

/// Install the process-wide forecast cache (once, at startup)
pub fn initialize(cache: cache::ForecastCache) -> anyhow::Result<()> {
    FORECAST_CACHE
        .set(cache)
        .map_err(|_| anyhow::anyhow!("Forecast cache already initialized"))
}

pub fn forecast_cache() -> &'static cache::ForecastCache {
    FORECAST_CACHE
        .get()
        .expect("Forecast cache has not been initialized")
}

/// Non-panicking accessor for callers that degrade gracefully without a cache
pub fn try_forecast_cache() -> Option<&'static cache::ForecastCache> {
    FORECAST_CACHE.get()
}
