use axum::{extract::Path, Json};

use crate::domain::a003_monthly_history;

/// GET /api/monthly_history/site/:site_id
pub async fn list_by_site(
    Path(site_id): Path<String>,
) -> Result<
    Json<Vec<contracts::domain::a003_monthly_history::aggregate::MonthlyHistoryRecord>>,
    axum::http::StatusCode,
> {
    let uuid = match uuid::Uuid::parse_str(&site_id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a003_monthly_history::service::list_by_site(uuid).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/monthly_history/:year/:month
pub async fn list_by_month(
    Path((year, month)): Path<(i32, u32)>,
) -> Result<
    Json<Vec<contracts::domain::a003_monthly_history::aggregate::MonthlyHistoryRecord>>,
    axum::http::StatusCode,
> {
    match a003_monthly_history::service::list_by_month(year, month).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::BAD_REQUEST),
    }
}
