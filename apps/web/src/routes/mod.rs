//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Route                              Auth     Service                   │
//! │  ─────────────────────────────────  ───────  ────────────────────────  │
//! │  GET  /                             none     search::featured          │
//! │  GET  /health                       none     db health check           │
//! │  GET  /login, POST /login           none     identity::authenticate    │
//! │  GET  /register, POST /register     none     identity::register        │
//! │  GET  /logout                       session  clears cookie             │
//! │  GET  /admin/dashboard              admin    admin::dashboard          │
//! │  GET|POST /admin/car/add            admin    catalog::add_car          │
//! │  GET|POST /admin/car/{id}/edit      admin    catalog::edit_car         │
//! │  POST /admin/car/{id}/delete        admin    catalog::delete_car       │
//! │  GET|POST /admin/car_model/add      admin    catalog::add_car_model    │
//! │  GET|POST /admin/car_model/{id}/edit admin   catalog::edit_car_model   │
//! │  POST /admin/car_model/{id}/delete  admin    catalog::delete_car_model │
//! │  GET  /user/dashboard               session  search::user_dashboard    │
//! │  GET|POST /user/search              none     search::search            │
//! │  GET|POST /user/car/{id}            session  booking::create_rental    │
//! │  GET  /user/my_rentals              session  booking::my_rentals       │
//! │  POST /user/rentals/{id}/cancel     session  booking::cancel_rental    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Views answer with plain JSON data. Actions answer with an
//! [`ActionResponse`]: a message to flash, where the browser goes next, and
//! the affected record.

mod admin;
mod auth;
mod pages;
mod user;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::AppState;

/// Body of a successful action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse<T> {
    pub message: String,
    pub redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ActionResponse<T> {
    pub fn new(message: impl Into<String>, redirect: impl Into<String>) -> Self {
        ActionResponse {
            message: message.into(),
            redirect: redirect.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

/// All routes, expecting the shared state.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(pages::home))
        .route("/health", get(pages::health))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/car/add", get(admin::add_car_page).post(admin::add_car))
        .route(
            "/admin/car/{id}/edit",
            get(admin::edit_car_page).post(admin::edit_car),
        )
        .route("/admin/car/{id}/delete", post(admin::delete_car))
        .route(
            "/admin/car_model/add",
            get(admin::add_car_model_page).post(admin::add_car_model),
        )
        .route(
            "/admin/car_model/{id}/edit",
            get(admin::edit_car_model_page).post(admin::edit_car_model),
        )
        .route("/admin/car_model/{id}/delete", post(admin::delete_car_model))
        .route("/user/dashboard", get(user::dashboard))
        .route("/user/search", get(user::search).post(user::search_submit))
        .route("/user/car/{id}", get(user::car_detail).post(user::rent_car))
        .route("/user/my_rentals", get(user::my_rentals))
        .route("/user/rentals/{id}/cancel", post(user::cancel_rental))
}
