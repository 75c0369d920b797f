//! # carhire-core: Pure Business Logic for Car Hire
//!
//! This crate is the **heart** of Car Hire. It contains the rental rules as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Car Hire Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    carhire-web (axum)                           │   │
//! │  │    routes ──► services (identity, catalog, booking, search)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ carhire-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  booking  │  │   authz   │  │ validation│  │   │
//! │  │   │ Car/Model │  │ DateRange │  │ Principal │  │   rules   │  │   │
//! │  │   │  Rental   │  │  pricing  │  │   Role    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    carhire-db (Database Layer)                  │   │
//! │  │          SQLite queries, migrations, booking transactions       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (User, Car, CarModel, Rental, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`booking`] - Date ranges, the overlap predicate, pricing, status transitions
//! - [`authz`] - Roles, capabilities and the request principal
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use carhire_core::booking::{quote, DateRange};
//! use carhire_core::money::Money;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
//! let range = DateRange::new(start, end).unwrap();
//!
//! let quote = quote(range, Money::from_cents(5000)).unwrap();
//! assert_eq!(quote.days, 3);
//! assert_eq!(quote.total.cents(), 15000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod authz;
pub mod booking;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use authz::{Capability, Principal, Role};
pub use booking::{DateRange, RentalQuote};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Earliest model year accepted for a car.
pub const MIN_CAR_YEAR: i64 = 1900;

/// Latest model year accepted for a car.
pub const MAX_CAR_YEAR: i64 = 2100;

/// Number of available models shown on the home page.
pub const FEATURED_MODELS_LIMIT: u32 = 6;

/// Maximum seat count accepted for a car model.
pub const MAX_SEATS: i64 = 10;
