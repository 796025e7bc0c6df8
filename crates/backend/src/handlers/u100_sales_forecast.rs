use axum::{
    extract::{Path, Query},
    Json,
};
use contracts::domain::common::AggregateId;
use contracts::shared::kpi::SalesForecast;
use serde::Deserialize;
use serde_json::json;

use crate::domain::a001_site;
use crate::shared::forecast::types::ForecastError;
use crate::usecases::u100_sales_forecast;

#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    #[serde(default)]
    pub force: bool,
}

/// GET /api/u100/forecast/:site_id
pub async fn get_forecast(
    Path(site_id): Path<String>,
    Query(params): Query<ForecastParams>,
) -> Result<Json<SalesForecast>, axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&site_id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    let site = match a001_site::service::get_by_id(uuid).await {
        Ok(Some(site)) => site,
        Ok(None) => return Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => return Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    };

    match u100_sales_forecast::service::forecast_for_site(&site, params.force).await {
        Ok(forecast) => Ok(Json(forecast)),
        Err(e) if e.downcast_ref::<ForecastError>().is_some() => {
            Err(axum::http::StatusCode::BAD_GATEWAY)
        }
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/u100/forecast/refresh-all
///
/// One entry per site; sites where the provider failed carry an error string
/// instead of a forecast.
pub async fn refresh_all(
    Query(params): Query<ForecastParams>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let results = match u100_sales_forecast::service::forecast_all(params.force).await {
        Ok(results) => results,
        Err(_) => return Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    };

    let entries: Vec<serde_json::Value> = results
        .into_iter()
        .map(|(site_id, result)| match result {
            Ok(forecast) => json!({
                "siteId": site_id.as_string(),
                "forecast": forecast,
            }),
            Err(e) => json!({
                "siteId": site_id.as_string(),
                "error": e.to_string(),
            }),
        })
        .collect();

    Ok(Json(json!({ "results": entries })))
}
