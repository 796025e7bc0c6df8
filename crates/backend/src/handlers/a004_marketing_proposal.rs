use axum::{
    extract::{Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a004_marketing_proposal;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub pending: bool,
}

/// GET /api/marketing_proposal
pub async fn list_all(
    Query(params): Query<ListParams>,
) -> Result<
    Json<Vec<contracts::domain::a004_marketing_proposal::aggregate::MarketingProposal>>,
    axum::http::StatusCode,
> {
    let result = if params.pending {
        a004_marketing_proposal::service::list_pending().await
    } else {
        a004_marketing_proposal::service::list_all().await
    };
    match result {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/marketing_proposal/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<
    Json<contracts::domain::a004_marketing_proposal::aggregate::MarketingProposal>,
    axum::http::StatusCode,
> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a004_marketing_proposal::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/marketing_proposal
pub async fn create(
    Json(dto): Json<contracts::domain::a004_marketing_proposal::aggregate::MarketingProposalDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    match a004_marketing_proposal::service::create(dto).await {
        Ok(id) => Ok(Json(json!({"id": id.to_string()}))),
        Err(e) => {
            tracing::warn!("Proposal rejected: {:?}", e);
            Err(axum::http::StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

/// POST /api/marketing_proposal/:id/decide
pub async fn decide(
    Path(id): Path<String>,
    Json(dto): Json<contracts::domain::a004_marketing_proposal::aggregate::ProposalDecisionDto>,
) -> Result<
    Json<contracts::domain::a004_marketing_proposal::aggregate::MarketingProposal>,
    axum::http::StatusCode,
> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a004_marketing_proposal::service::decide(uuid, dto).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::warn!("Proposal decision rejected: {:?}", e);
            Err(axum::http::StatusCode::CONFLICT)
        }
    }
}

/// DELETE /api/marketing_proposal/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a004_marketing_proposal::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}
