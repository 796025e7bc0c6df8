use axum::{extract::Query, Json};
use contracts::dashboards::d400_ceo_summary::{CeoSummaryRequest, CeoSummaryResponse};

use crate::dashboards::d400_ceo_summary;

/// GET /api/d400/ceo_summary
pub async fn get_ceo_summary(
    Query(request): Query<CeoSummaryRequest>,
) -> Result<Json<CeoSummaryResponse>, axum::http::StatusCode> {
    match d400_ceo_summary::service::get_ceo_summary(request).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::warn!("CEO summary failed: {:?}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
