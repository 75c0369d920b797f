//! Customer-facing routes: browsing, search, booking, my rentals.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use carhire_core::{Rental, RentalListing};

use crate::error::ApiResult;
use crate::extract::FormJson;
use crate::routes::ActionResponse;
use crate::services::booking::{self, CarDetail, RentalRequest};
use crate::services::search::{self, BrowseView};
use crate::session::AuthUser;
use crate::AppState;

const MY_RENTALS: &str = "/user/my_rentals";

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    AuthUser(_principal): AuthUser,
) -> ApiResult<Json<BrowseView>> {
    Ok(Json(search::user_dashboard(&state.db).await?))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<BrowseView>> {
    Ok(Json(search::search(&state.db, params.query.as_deref()).await?))
}

pub async fn search_submit(
    State(state): State<Arc<AppState>>,
    FormJson(form): FormJson<SearchQuery>,
) -> ApiResult<Json<BrowseView>> {
    Ok(Json(search::search(&state.db, form.query.as_deref()).await?))
}

pub async fn car_detail(
    State(state): State<Arc<AppState>>,
    AuthUser(_principal): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CarDetail>> {
    Ok(Json(booking::car_detail(&state.db, &id).await?))
}

pub async fn rent_car(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    FormJson(request): FormJson<RentalRequest>,
) -> ApiResult<(StatusCode, Json<ActionResponse<Rental>>)> {
    let rental = booking::create_rental(&state.db, &principal, &id, &request)
        .await
        .map_err(|e| e.or_redirect(format!("/user/car/{id}")))?;

    Ok((
        StatusCode::CREATED,
        Json(
            ActionResponse::new("Car rental confirmed successfully!", MY_RENTALS)
                .with_data(rental),
        ),
    ))
}

pub async fn my_rentals(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<Vec<RentalListing>>> {
    Ok(Json(booking::my_rentals(&state.db, &principal).await?))
}

pub async fn cancel_rental(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ActionResponse<Rental>>> {
    let rental = booking::cancel_rental(&state.db, &principal, &id)
        .await
        .map_err(|e| e.or_redirect(MY_RENTALS))?;

    Ok(Json(
        ActionResponse::new("Rental has been cancelled successfully!", MY_RENTALS)
            .with_data(rental),
    ))
}
