use super::types::{
    ForecastError, ForecastInput, ForecastKey, ForecastStore, SalesForecastProvider,
};
use contracts::domain::a001_site::aggregate::SiteId;
use contracts::domain::common::AggregateId;
use contracts::shared::kpi::SalesForecast;
use std::sync::Arc;
use tracing::warn;

/// One entry of a batch forecast request
#[derive(Debug, Clone)]
pub struct SiteForecastRequest {
    pub site_id: SiteId,
    pub input: ForecastInput,
}

/// Provider wrapper with a per-site result cache keyed by revenue-to-date.
///
/// A cached value stays valid exactly as long as the site's revenue is
/// unchanged; a new revenue produces a new key, so the stale entry is never
/// consulted again. Provider failures are surfaced, never cached and never
/// retried by the engine.
#[derive(Clone)]
pub struct ForecastCache {
    provider: Arc<dyn SalesForecastProvider>,
    store: Arc<dyn ForecastStore>,
}

impl ForecastCache {
    pub fn new(provider: Arc<dyn SalesForecastProvider>, store: Arc<dyn ForecastStore>) -> Self {
        Self { provider, store }
    }

    /// Look up a cached forecast without ever calling the provider
    pub fn peek(&self, site_id: SiteId, current_revenue: f64) -> Option<SalesForecast> {
        self.store.get(&ForecastKey::new(site_id, current_revenue))
    }

    /// Fetch the forecast for one site.
    ///
    /// Cache hit (same site, same revenue) returns without touching the
    /// provider unless `force_refresh` is set.
    pub async fn get_forecast(
        &self,
        site_id: SiteId,
        input: &ForecastInput,
        force_refresh: bool,
    ) -> Result<SalesForecast, ForecastError> {
        let key = ForecastKey::new(site_id, input.current_month_revenue);

        if !force_refresh {
            if let Some(cached) = self.store.get(&key) {
                return Ok(cached);
            }
        }

        match self.provider.project_month_total(input).await {
            Ok(forecast) => {
                self.store.put(key, forecast.clone());
                Ok(forecast)
            }
            Err(e) => {
                warn!("Forecast unavailable for site {}: {}", site_id.as_string(), e);
                Err(e)
            }
        }
    }

    /// Batch fetch: one independent task per site.
    ///
    /// Each entry resolves on its own to a forecast or an error; a failing
    /// site never cancels or fails its siblings.
    pub async fn get_forecasts(
        &self,
        requests: Vec<SiteForecastRequest>,
        force_refresh: bool,
    ) -> Vec<(SiteId, Result<SalesForecast, ForecastError>)> {
        let mut handles = Vec::with_capacity(requests.len());
        for request in requests {
            let cache = self.clone();
            let site_id = request.site_id;
            handles.push((
                site_id,
                tokio::spawn(async move {
                    cache
                        .get_forecast(site_id, &request.input, force_refresh)
                        .await
                }),
            ));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (site_id, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ForecastError::ApiError(format!(
                    "forecast task aborted: {}",
                    e
                ))),
            };
            results.push((site_id, result));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::forecast::types::InMemoryForecastStore;
    use async_trait::async_trait;
    use contracts::shared::kpi::MonthProgress;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail_when_revenue_is: Option<f64>,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_when_revenue_is: None,
            }
        }

        fn failing_on(revenue: f64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_when_revenue_is: Some(revenue),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SalesForecastProvider for CountingProvider {
        async fn project_month_total(
            &self,
            input: &ForecastInput,
        ) -> Result<SalesForecast, ForecastError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_when_revenue_is == Some(input.current_month_revenue) {
                return Err(ForecastError::ApiError("provider down".into()));
            }
            Ok(SalesForecast {
                forecast: input.current_month_revenue * 2.0,
                reasoning: "test".into(),
            })
        }

        fn provider_name(&self) -> &str {
            "counting"
        }
    }

    fn input(revenue: f64) -> ForecastInput {
        ForecastInput {
            recent_daily_revenues: vec![revenue / 10.0],
            current_month_revenue: revenue,
            progress: MonthProgress {
                total_days: 30,
                elapsed_days: 10,
                effective_past: 8.0,
                effective_remaining: 16.0,
            },
        }
    }

    fn cache_with(provider: Arc<CountingProvider>) -> ForecastCache {
        ForecastCache::new(provider, Arc::new(InMemoryForecastStore::new()))
    }

    #[tokio::test]
    async fn test_identical_key_hits_cache() {
        let provider = Arc::new(CountingProvider::new());
        let cache = cache_with(provider.clone());
        let site = SiteId::new_v4();

        let first = cache.get_forecast(site, &input(1000.0), false).await.unwrap();
        let second = cache.get_forecast(site, &input(1000.0), false).await.unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(first.forecast, second.forecast);
    }

    #[tokio::test]
    async fn test_force_refresh_always_invokes_provider() {
        let provider = Arc::new(CountingProvider::new());
        let cache = cache_with(provider.clone());
        let site = SiteId::new_v4();

        cache.get_forecast(site, &input(1000.0), false).await.unwrap();
        cache.get_forecast(site, &input(1000.0), true).await.unwrap();
        cache.get_forecast(site, &input(1000.0), true).await.unwrap();

        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_revenue_change_invalidates_entry() {
        let provider = Arc::new(CountingProvider::new());
        let cache = cache_with(provider.clone());
        let site = SiteId::new_v4();

        cache.get_forecast(site, &input(1000.0), false).await.unwrap();
        cache.get_forecast(site, &input(1250.0), false).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert!(cache.peek(site, 1250.0).is_some());
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let provider = Arc::new(CountingProvider::failing_on(666.0));
        let cache = cache_with(provider.clone());
        let site = SiteId::new_v4();

        assert!(cache.get_forecast(site, &input(666.0), false).await.is_err());
        assert!(cache.get_forecast(site, &input(666.0), false).await.is_err());

        // Both calls reached the provider: nothing was cached.
        assert_eq!(provider.call_count(), 2);
        assert!(cache.peek(site, 666.0).is_none());
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let provider = Arc::new(CountingProvider::failing_on(666.0));
        let cache = cache_with(provider.clone());
        let healthy = SiteId::new_v4();
        let broken = SiteId::new_v4();

        let results = cache
            .get_forecasts(
                vec![
                    SiteForecastRequest {
                        site_id: healthy,
                        input: input(1000.0),
                    },
                    SiteForecastRequest {
                        site_id: broken,
                        input: input(666.0),
                    },
                ],
                false,
            )
            .await;

        assert_eq!(results.len(), 2);
        let by_id = |id: SiteId| results.iter().find(|(s, _)| *s == id).unwrap();
        assert!(by_id(healthy).1.is_ok());
        assert!(by_id(broken).1.is_err());
    }
}
