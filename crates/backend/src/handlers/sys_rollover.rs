use axum::Json;
use contracts::system::rollover::RolloverOutcome;

use crate::system::rollover;

/// POST /api/system/rollover/run
///
/// Manual trigger of the monthly rollover check. Safe to call repeatedly.
pub async fn run() -> Result<Json<RolloverOutcome>, axum::http::StatusCode> {
    match rollover::service::run_monthly_rollover().await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            tracing::error!("Manual rollover failed: {:?}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
