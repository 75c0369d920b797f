//! # Validation Module
//!
//! Input validation for registration, catalog forms and search.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (axum)                                          │
//! │  └── Type validation (JSON deserialization into *Form structs)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Shape and range rules per field                                   │
//! │  └── Produces validated drafts (CarDraft, CarModelDraft, ...)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE (username, email)                                          │
//! │  └── Foreign keys (model → car, rental → model/user)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use carhire_core::validation::{validate_username, validate_year};
//!
//! assert!(validate_username("alice").is_ok());
//! assert!(validate_year(1899).is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CarDraft, CarModelDraft, FuelType, RegistrationDraft, Transmission};
use crate::{MAX_CAR_YEAR, MAX_SEATS, MIN_CAR_YEAR};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Search queries are cut to this many characters.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;

// =============================================================================
// Form Inputs
// =============================================================================

/// Raw registration input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Raw car input (add and edit).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarForm {
    pub brand: String,
    pub year: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Raw car model input (add and edit).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarModelForm {
    pub car_id: String,
    pub name: String,
    pub price_per_day_cents: i64,
    #[serde(default)]
    pub mileage: Option<f64>,
    pub fuel_type: String,
    pub transmission: String,
    #[serde(default)]
    pub seats: Option<i64>,
    #[serde(default)]
    pub air_conditioning: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

fn required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value.to_string())
}

fn length(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Trims an optional text field, mapping blank to `None`.
fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Identity Validators
// =============================================================================

/// Username: required, 2 to 64 characters.
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = required("username", username)?;
    length("username", &username, 2, 64)?;
    Ok(username)
}

/// Email: required, at most 120 characters, `local@domain.tld` shape.
///
/// ```rust
/// use carhire_core::validation::validate_email;
///
/// assert!(validate_email("a@b.co").is_ok());
/// assert!(validate_email("a@b").is_err());
/// assert!(validate_email("a b@c.de").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = required("email", email)?;
    length("email", &email, 3, 120)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "Invalid email address.".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }

    Ok(email)
}

/// Password: at least 6 characters. Not trimmed.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    if password.chars().count() < 6 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        });
    }
    Ok(())
}

/// Validates a registration form into a [`RegistrationDraft`].
///
/// Uniqueness of username and email is checked later against the store.
pub fn validate_registration(form: &RegistrationForm) -> ValidationResult<RegistrationDraft> {
    let username = validate_username(&form.username)?;
    let email = validate_email(&form.email)?;
    validate_password(&form.password)?;
    if form.confirm_password != form.password {
        return Err(ValidationError::Mismatch {
            field: "confirm_password".to_string(),
            other: "password".to_string(),
        });
    }

    Ok(RegistrationDraft {
        username,
        email,
        password: form.password.clone(),
    })
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Year: within [`MIN_CAR_YEAR`, `MAX_CAR_YEAR`].
pub fn validate_year(year: i64) -> ValidationResult<()> {
    if !(MIN_CAR_YEAR..=MAX_CAR_YEAR).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: MIN_CAR_YEAR,
            max: MAX_CAR_YEAR,
        });
    }
    Ok(())
}

/// Price in cents: zero or more.
pub fn validate_price_cents(cents: i64) -> ValidationResult<Money> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: "price_per_day".to_string(),
        });
    }
    Ok(Money::from_cents(cents))
}

/// Validates a car form into a [`CarDraft`].
pub fn validate_car_form(form: &CarForm) -> ValidationResult<CarDraft> {
    let brand = required("brand", &form.brand)?;
    length("brand", &brand, 1, 100)?;
    validate_year(form.year)?;

    Ok(CarDraft {
        brand,
        year: form.year,
        description: optional(form.description.as_deref()),
    })
}

/// Validates a car model form into a [`CarModelDraft`].
///
/// Whether `car_id` names an existing car is checked by the store.
pub fn validate_car_model_form(form: &CarModelForm) -> ValidationResult<CarModelDraft> {
    let car_id = required("car_id", &form.car_id)?;
    let name = required("name", &form.name)?;
    length("name", &name, 1, 100)?;
    let price_per_day = validate_price_cents(form.price_per_day_cents)?;

    if let Some(mileage) = form.mileage {
        if !mileage.is_finite() || mileage < 0.0 {
            return Err(ValidationError::Negative {
                field: "mileage".to_string(),
            });
        }
    }

    let fuel_type: FuelType =
        form.fuel_type
            .parse()
            .map_err(|_| ValidationError::NotAllowed {
                field: "fuel_type".to_string(),
                allowed: FuelType::ALL.iter().map(|f| f.as_str().to_string()).collect(),
            })?;

    let transmission: Transmission =
        form.transmission
            .parse()
            .map_err(|_| ValidationError::NotAllowed {
                field: "transmission".to_string(),
                allowed: Transmission::ALL
                    .iter()
                    .map(|t| t.as_str().to_string())
                    .collect(),
            })?;

    if let Some(seats) = form.seats {
        if !(1..=MAX_SEATS).contains(&seats) {
            return Err(ValidationError::OutOfRange {
                field: "seats".to_string(),
                min: 1,
                max: MAX_SEATS,
            });
        }
    }

    let image_url = optional(form.image_url.as_deref());
    if let Some(url) = &image_url {
        length("image_url", url, 1, 255)?;
    }

    Ok(CarModelDraft {
        car_id,
        name,
        price_per_day,
        mileage: form.mileage,
        fuel_type,
        transmission,
        seats: form.seats,
        air_conditioning: form.air_conditioning,
        image_url,
    })
}

// =============================================================================
// Search
// =============================================================================

/// Normalizes a search query.
///
/// ## Rules
/// - Surrounding whitespace is trimmed
/// - Empty is fine (returns the default browse list)
/// - Anything past 100 characters is dropped, never rejected
pub fn normalize_search_query(query: &str) -> String {
    query.trim().chars().take(MAX_SEARCH_QUERY_LEN).collect()
}

/// Builds a `LIKE ... ESCAPE '\'` pattern matching `query` as a literal
/// substring.
///
/// ```rust
/// use carhire_core::validation::like_pattern;
///
/// assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
/// ```
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Accepts a post-login `next` target only when it is a local path.
pub fn safe_next_path(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

// =============================================================================
// Unit Tests
// =============================================================================
