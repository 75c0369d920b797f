//! # Domain Types
//!
//! Core domain types used throughout Car Hire.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Car        │   │    CarModel     │   │     Rental      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  car_id (FK)    │◄──│  car_model_id   │       │
//! │  │  brand          │   │  name           │   │  user_id (FK)   │       │
//! │  │  year           │   │  price/day      │   │  start..end     │       │
//! │  │                 │   │  is_available   │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │  RentalStatus   │   │ FuelType /      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │ Transmission    │       │
//! │  │  username       │   │  Pending        │   │  fixed choice   │       │
//! │  │  email          │   │  Active         │   │  sets           │       │
//! │  │  role           │   │  Completed      │   │                 │       │
//! │  └─────────────────┘   │  Cancelled      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Relations Without Back-References
//! Entities hold foreign-key ids only. Navigation (model → car, rental →
//! model) happens through explicit joins in the database layer, which
//! returns flattened listing rows such as [`CarModelListing`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::authz::Role;
use crate::money::Money;

// =============================================================================
// User
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub date_joined: DateTime<Utc>,
}

// =============================================================================
// Car
// =============================================================================

/// A brand/year catalog record owning one or more [`CarModel`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Car {
    pub id: String,
    pub brand: String,
    pub year: i64,
    pub description: Option<String>,
    /// Display only; booking never reads it.
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// Label used in model forms, e.g. `Toyota (2022)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.brand, self.year)
    }
}

// =============================================================================
// Fuel Type / Transmission
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
}

impl FuelType {
    pub const ALL: [FuelType; 4] = [
        FuelType::Petrol,
        FuelType::Diesel,
        FuelType::Electric,
        FuelType::Hybrid,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
        }
    }
}

impl FromStr for FuelType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FuelType::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum Transmission {
    Manual,
    Automatic,
}

impl Transmission {
    pub const ALL: [Transmission; 2] = [Transmission::Manual, Transmission::Automatic];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Transmission::Manual => "Manual",
            Transmission::Automatic => "Automatic",
        }
    }
}

impl FromStr for Transmission {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transmission::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

// =============================================================================
// Car Model
// =============================================================================

/// A rentable variant of a [`Car`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CarModel {
    pub id: String,
    pub car_id: String,
    pub name: String,
    /// Daily price in cents.
    pub price_per_day_cents: i64,
    pub mileage: Option<f64>,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub seats: Option<i64>,
    pub air_conditioning: bool,
    pub image_url: Option<String>,
    /// Cached availability: false while an active rental holds the model.
    /// Written only by the booking unit of work.
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CarModel {
    #[inline]
    pub fn price_per_day(&self) -> Money {
        Money::from_cents(self.price_per_day_cents)
    }
}

/// A model joined with its owning car's brand and year.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CarModelListing {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub model: CarModel,
    pub brand: String,
    pub car_year: i64,
}

// =============================================================================
// Rental Status
// =============================================================================

/// The status of a rental.
///
/// Booking creates rentals directly as `Active`; `Pending` is a valid value
/// that nothing assigns yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl RentalStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
            RentalStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for RentalStatus {
    fn default() -> Self {
        RentalStatus::Pending
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Rental
// =============================================================================

/// A booking of one [`CarModel`] by one [`User`] for an inclusive date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Rental {
    pub id: String,
    pub user_id: String,
    pub car_model_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Frozen at creation: days × daily price. Never recomputed.
    pub total_price_cents: i64,
    pub status: RentalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rental {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// A rental joined with the names a listing page shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RentalListing {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub rental: Rental,
    pub model_name: String,
    pub brand: String,
    pub username: String,
}

// =============================================================================
// Validated Drafts
// =============================================================================
// Produced by `validation` from raw form input; the database layer only
// accepts drafts, so unvalidated values never reach an INSERT.

/// Validated fields of a car.
#[derive(Debug, Clone, PartialEq)]
pub struct CarDraft {
    pub brand: String,
    pub year: i64,
    pub description: Option<String>,
}

/// Validated fields of a car model.
#[derive(Debug, Clone, PartialEq)]
pub struct CarModelDraft {
    pub car_id: String,
    pub name: String,
    pub price_per_day: Money,
    pub mileage: Option<f64>,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub seats: Option<i64>,
    pub air_conditioning: bool,
    pub image_url: Option<String>,
}

/// Validated registration fields (password still in clear; hashed by the
/// identity service before it reaches storage).
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationDraft {
    pub username: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
