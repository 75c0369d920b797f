//! # Car Hire Web
//!
//! HTTP server for the car hire application.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Car Hire Web                                    │
//! │                                                                         │
//! │  Browser ──► axum Router ──► extractors (MaybeUser/AuthUser/AdminUser) │
//! │                   │                      │                              │
//! │                   ▼                      ▼                              │
//! │              routes::* ──────────► services::*                          │
//! │                                          │                              │
//! │                   ┌──────────────────────┼──────────────────┐           │
//! │                   ▼                      ▼                  ▼           │
//! │             carhire-core           carhire-db          SessionManager   │
//! │          (rules, validation)   (SQLite, transactions)   (JWT cookie)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::AppConfig`]; every key can be set as `CARHIRE_<KEY>`:
//! - `CARHIRE_DATABASE_PATH` - SQLite file (default: carhire.db)
//! - `CARHIRE_PORT` - HTTP port (default: 8080)
//! - `CARHIRE_SESSION_SECRET` - Secret for session token signing
//! - `CARHIRE_ADMIN_USERNAME` / `CARHIRE_ADMIN_PASSWORD` - Bootstrap admin

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod services;
pub mod session;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use carhire_db::Database;

// Re-exports
pub use config::AppConfig;
pub use error::{ApiError, ApiResult};

use crate::auth::SessionManager;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        let sessions = SessionManager::new(
            config.session_secret.clone(),
            config.session_lifetime_secs,
            config.remember_lifetime_secs,
        );
        AppState { db, sessions }
    }
}

/// Builds the application router.
pub fn app(state: Arc<AppState>) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
