use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use contracts::dashboards::d400_ceo_summary::{
    CeoSummaryRequest, CeoSummaryResponse, ChainTotals, SiteSummaryRow,
};
use sea_orm::DatabaseConnection;

use crate::domain::a001_site;
use crate::shared::calendar::{compute_month_progress, HolidayCalendar};
use crate::shared::compliance::compute_compliance;
use crate::shared::data::db::get_connection;
use crate::shared::forecast::{cache::ForecastCache, try_forecast_cache};

/// Build the CEO summary dashboard
pub async fn get_ceo_summary(request: CeoSummaryRequest) -> Result<CeoSummaryResponse> {
    let reference_date = match request.date.as_deref() {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| anyhow::anyhow!("Invalid date: {}", s))?,
        None => Utc::now().date_naive(),
    };
    build_summary(get_connection(), reference_date, try_forecast_cache()).await
}

pub async fn build_summary(
    db: &DatabaseConnection,
    reference_date: NaiveDate,
    forecast_cache: Option<&ForecastCache>,
) -> Result<CeoSummaryResponse> {
    let calendar = HolidayCalendar::brazil_2025();
    let progress = compute_month_progress(reference_date, &calendar);
    let period = format!("{:04}-{:02}", reference_date.year(), reference_date.month());

    let sites = a001_site::repository::list_all(db).await?;

    let mut rows = Vec::with_capacity(sites.len());
    let mut total_revenue = 0.0;
    let mut total_goal = 0.0;
    let mut nps_sum = 0.0;
    let mut nps_count = 0usize;

    for site in &sites {
        let compliance = compute_compliance(site.revenue_to_date, site.monthly_goal, &progress);

        // Read-only cache peek; the forecast endpoints own provider calls.
        let forecast =
            forecast_cache.and_then(|cache| cache.peek(site.id, site.revenue_to_date));

        total_revenue += site.revenue_to_date;
        total_goal += site.monthly_goal;
        if site.nps_score != 0.0 {
            nps_sum += site.nps_score;
            nps_count += 1;
        }

        rows.push(SiteSummaryRow {
            site_id: site.to_string_id(),
            site_code: site.code.clone(),
            site_name: site.name.clone(),
            revenue_to_date: site.revenue_to_date,
            monthly_goal: site.monthly_goal,
            retention_rate: site.retention_rate,
            nps_score: site.nps_score,
            average_ticket: site.average_ticket,
            compliance,
            forecast,
        });
    }

    let totals = ChainTotals {
        revenue_to_date: total_revenue,
        monthly_goal: total_goal,
        compliance: compute_compliance(total_revenue, total_goal, &progress),
        average_nps: if nps_count > 0 {
            nps_sum / nps_count as f64
        } else {
            0.0
        },
    };

    Ok(CeoSummaryResponse {
        period,
        progress,
        rows,
        totals,
    })
}
