use axum::{extract::Path, Json};
use serde_json::json;

use crate::domain::a001_site;

/// GET /api/site
pub async fn list_all(
) -> Result<Json<Vec<contracts::domain::a001_site::aggregate::Site>>, axum::http::StatusCode> {
    match a001_site::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/site/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a001_site::aggregate::Site>, axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a001_site::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/site
pub async fn upsert(
    Json(dto): Json<contracts::domain::a001_site::aggregate::SiteDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let result = if dto.id.is_some() {
        a001_site::service::update(dto).await.map(|id| id.to_string())
    } else {
        a001_site::service::create(dto).await.map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// DELETE /api/site/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a001_site::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/site/sync-nps
pub async fn sync_nps() -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    match a001_site::service::sync_nps_from_sheet().await {
        Ok(updated) => Ok(Json(json!({"updated": updated}))),
        Err(e) => {
            tracing::warn!("NPS sync failed: {:?}", e);
            Err(axum::http::StatusCode::BAD_GATEWAY)
        }
    }
}

/// POST /api/site/testdata
pub async fn insert_test_data() -> axum::http::StatusCode {
    match a001_site::service::insert_test_data().await {
        Ok(_) => axum::http::StatusCode::OK,
        Err(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}
