//! # carhire-db: Database Layer for Car Hire
//!
//! This crate provides database access for Car Hire.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Car Hire Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (POST /rent_car/{id})                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    carhire-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CarRepo        │    │ 001_initial  │  │   │
//! │  │   │ WAL + busy    │    │ CarModelRepo   │    │   _schema    │  │   │
//! │  │   │ timeout       │    │ RentalRepo     │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (users, cars, models, rentals)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use carhire_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("carhire.db")).await?;
//!
//! let featured = db.car_models().featured(6).await?;
//! let rental = db.rentals().create_active(&user_id, &model_id, range).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::car::CarRepository;
pub use repository::car_model::CarModelRepository;
pub use repository::rental::RentalRepository;
pub use repository::user::UserRepository;
