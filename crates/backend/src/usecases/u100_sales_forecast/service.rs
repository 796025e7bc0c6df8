//! Month-total sales forecasting for sites.
//!
//! Assembles the provider input (recent report revenues plus weighted month
//! progress) and delegates to the shared forecast cache. Forecasting is a
//! read-only overlay: it never mutates site data.

use chrono::{NaiveDate, Utc};
use contracts::domain::a001_site::aggregate::{Site, SiteId};
use contracts::shared::kpi::SalesForecast;
use sea_orm::DatabaseConnection;

use crate::domain::{a001_site, a002_daily_report};
use crate::shared::calendar::{compute_month_progress, HolidayCalendar};
use crate::shared::data::db::get_connection;
use crate::shared::forecast::cache::{ForecastCache, SiteForecastRequest};
use crate::shared::forecast::types::{ForecastError, ForecastInput};
use crate::shared::forecast::forecast_cache;

/// How many recent daily reports feed one forecast prompt
const RECENT_REPORT_LIMIT: u64 = 7;

pub async fn forecast_for_site(site: &Site, force_refresh: bool) -> anyhow::Result<SalesForecast> {
    forecast_with(
        get_connection(),
        forecast_cache(),
        site,
        Utc::now().date_naive(),
        force_refresh,
    )
    .await
}

pub async fn forecast_with(
    db: &DatabaseConnection,
    cache: &ForecastCache,
    site: &Site,
    reference_date: NaiveDate,
    force_refresh: bool,
) -> anyhow::Result<SalesForecast> {
    let input = build_input(db, site, reference_date).await?;
    Ok(cache.get_forecast(site.id, &input, force_refresh).await?)
}

/// Refresh forecasts for every live site, one independent task per site
pub async fn forecast_all(
    force_refresh: bool,
) -> anyhow::Result<Vec<(SiteId, Result<SalesForecast, ForecastError>)>> {
    forecast_all_with(
        get_connection(),
        forecast_cache(),
        Utc::now().date_naive(),
        force_refresh,
    )
    .await
}

pub async fn forecast_all_with(
    db: &DatabaseConnection,
    cache: &ForecastCache,
    reference_date: NaiveDate,
    force_refresh: bool,
) -> anyhow::Result<Vec<(SiteId, Result<SalesForecast, ForecastError>)>> {
    let sites = a001_site::repository::list_all(db).await?;

    let mut requests = Vec::with_capacity(sites.len());
    for site in &sites {
        requests.push(SiteForecastRequest {
            site_id: site.id,
            input: build_input(db, site, reference_date).await?,
        });
    }

    Ok(cache.get_forecasts(requests, force_refresh).await)
}

async fn build_input(
    db: &DatabaseConnection,
    site: &Site,
    reference_date: NaiveDate,
) -> anyhow::Result<ForecastInput> {
    let recent = a002_daily_report::repository::recent_revenues(
        db,
        site.id.value(),
        RECENT_REPORT_LIMIT,
    )
    .await?;
    let calendar = HolidayCalendar::brazil_2025();

    Ok(ForecastInput {
        recent_daily_revenues: recent,
        current_month_revenue: site.revenue_to_date,
        progress: compute_month_progress(reference_date, &calendar),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::bootstrap_schema;
    use crate::shared::forecast::types::{InMemoryForecastStore, SalesForecastProvider};
    use async_trait::async_trait;
    use sea_orm::Database;
    use std::sync::Arc;

    /// Echoes the assembled input back so tests can inspect it
    struct EchoProvider;

    #[async_trait]
    impl SalesForecastProvider for EchoProvider {
        async fn project_month_total(
            &self,
            input: &ForecastInput,
        ) -> Result<SalesForecast, ForecastError> {
            Ok(SalesForecast {
                forecast: input.current_month_revenue,
                reasoning: format!("{} recent points", input.recent_daily_revenues.len()),
            })
        }

        fn provider_name(&self) -> &str {
            "echo"
        }
    }

    async fn test_db() -> DatabaseConnection {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        bootstrap_schema(&conn).await.unwrap();
        conn
    }

    fn echo_cache() -> ForecastCache {
        ForecastCache::new(Arc::new(EchoProvider), Arc::new(InMemoryForecastStore::new()))
    }

    #[tokio::test]
    async fn test_input_built_from_recent_reports() {
        let db = test_db().await;
        let site = Site::new_for_insert("VIB-001".into(), "Vibra Moema".into(), 100_000.0);
        a001_site::repository::insert(&db, &site).await.unwrap();

        for day in 10..13 {
            let dto = contracts::domain::a002_daily_report::aggregate::DailyReportDto {
                site_id: site.id.value().to_string(),
                leader_name: "Ana".into(),
                report_date: NaiveDate::from_ymd_opt(2025, 8, day).unwrap(),
                revenue: 1_000.0 * day as f64,
                new_members: 1,
                lost_members: 0,
                retention_rate: 90.0,
                satisfaction_score: 8.0,
                reflections: None,
            };
            a002_daily_report::service::submit_with_conn(&db, dto)
                .await
                .unwrap();
        }

        let stored = a001_site::repository::get_by_id(&db, site.id.value())
            .await
            .unwrap()
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
        let forecast = forecast_with(&db, &echo_cache(), &stored, date, false)
            .await
            .unwrap();

        assert_eq!(forecast.forecast, 33_000.0);
        assert_eq!(forecast.reasoning, "3 recent points");
    }

    #[tokio::test]
    async fn test_forecast_all_covers_every_site() {
        let db = test_db().await;
        for code in ["VIB-001", "VIB-002"] {
            let site = Site::new_for_insert(code.into(), format!("Vibra {}", code), 50_000.0);
            a001_site::repository::insert(&db, &site).await.unwrap();
        }

        let date = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
        let results = forecast_all_with(&db, &echo_cache(), date, false)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }
}
