//! Admin routes. Every handler takes [`AdminUser`], so a missing session is
//! 401 and a customer session is 403 before any service runs.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use carhire_core::validation::{CarForm, CarModelForm};
use carhire_core::{Car, CarModel};

use crate::error::ApiResult;
use crate::extract::FormJson;
use crate::routes::ActionResponse;
use crate::services::admin::{self as admin_service, AdminDashboard};
use crate::services::catalog::{self, CarFormContext, CarModelFormContext};
use crate::session::AdminUser;
use crate::AppState;

const DASHBOARD: &str = "/admin/dashboard";

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
) -> ApiResult<Json<AdminDashboard>> {
    Ok(Json(admin_service::dashboard(&state.db, &principal).await?))
}

// =============================================================================
// Cars
// =============================================================================

pub async fn add_car_page(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
) -> ApiResult<Json<CarFormContext>> {
    Ok(Json(catalog::car_form(&state.db, &principal, None).await?))
}

pub async fn add_car(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    FormJson(form): FormJson<CarForm>,
) -> ApiResult<(StatusCode, Json<ActionResponse<Car>>)> {
    let car = catalog::add_car(&state.db, &principal, &form).await?;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::new("Car has been added successfully!", DASHBOARD).with_data(car)),
    ))
}

pub async fn edit_car_page(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CarFormContext>> {
    Ok(Json(catalog::car_form(&state.db, &principal, Some(&id)).await?))
}

pub async fn edit_car(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    Path(id): Path<String>,
    FormJson(form): FormJson<CarForm>,
) -> ApiResult<Json<ActionResponse<Car>>> {
    let car = catalog::edit_car(&state.db, &principal, &id, &form).await?;
    Ok(Json(
        ActionResponse::new("Car has been updated!", DASHBOARD).with_data(car),
    ))
}

pub async fn delete_car(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ActionResponse<()>>> {
    catalog::delete_car(&state.db, &principal, &id)
        .await
        .map_err(|e| e.or_redirect(DASHBOARD))?;
    Ok(Json(ActionResponse::new("Car has been deleted!", DASHBOARD)))
}

// =============================================================================
// Car Models
// =============================================================================

pub async fn add_car_model_page(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
) -> ApiResult<Json<CarModelFormContext>> {
    Ok(Json(catalog::car_model_form(&state.db, &principal, None).await?))
}

pub async fn add_car_model(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    FormJson(form): FormJson<CarModelForm>,
) -> ApiResult<(StatusCode, Json<ActionResponse<CarModel>>)> {
    let model = catalog::add_car_model(&state.db, &principal, &form).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ActionResponse::new("Car model has been added successfully!", DASHBOARD)
                .with_data(model),
        ),
    ))
}

pub async fn edit_car_model_page(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CarModelFormContext>> {
    Ok(Json(
        catalog::car_model_form(&state.db, &principal, Some(&id)).await?,
    ))
}

pub async fn edit_car_model(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    Path(id): Path<String>,
    FormJson(form): FormJson<CarModelForm>,
) -> ApiResult<Json<ActionResponse<CarModel>>> {
    let model = catalog::edit_car_model(&state.db, &principal, &id, &form).await?;
    Ok(Json(
        ActionResponse::new("Car model has been updated!", DASHBOARD).with_data(model),
    ))
}

pub async fn delete_car_model(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ActionResponse<()>>> {
    catalog::delete_car_model(&state.db, &principal, &id)
        .await
        .map_err(|e| e.or_redirect(DASHBOARD))?;
    Ok(Json(ActionResponse::new("Car model has been deleted!", DASHBOARD)))
}
