use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use carhire_core::CarModelListing;

use crate::error::ApiResult;
use crate::services::search;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub featured_models: Vec<CarModelListing>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: bool,
}

pub async fn home(State(state): State<Arc<AppState>>) -> ApiResult<Json<HomePage>> {
    Ok(Json(HomePage {
        featured_models: search::featured(&state.db).await?,
    }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthStatus>) {
    let database = state.db.health_check().await;
    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthStatus {
            status: label,
            database,
        }),
    )
}
