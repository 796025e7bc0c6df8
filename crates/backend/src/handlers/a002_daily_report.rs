use axum::{
    extract::{Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a002_daily_report;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u64>,
}

/// POST /api/daily_report
pub async fn submit(
    Json(dto): Json<contracts::domain::a002_daily_report::aggregate::DailyReportDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    match a002_daily_report::service::submit(dto).await {
        Ok(id) => Ok(Json(json!({"id": id.to_string()}))),
        Err(e) => {
            tracing::warn!("Daily report rejected: {:?}", e);
            Err(axum::http::StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

/// GET /api/daily_report/site/:site_id
pub async fn list_by_site(
    Path(site_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<
    Json<Vec<contracts::domain::a002_daily_report::aggregate::DailyReport>>,
    axum::http::StatusCode,
> {
    let uuid = match uuid::Uuid::parse_str(&site_id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a002_daily_report::service::list_by_site(uuid, params.limit).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}
