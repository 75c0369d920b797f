//! # Error Types
//!
//! Domain-specific error types for carhire-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  carhire-core errors (this file)                                       │
//! │  ├── CoreError        - Domain outcomes (conflict, forbidden, ...)     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  carhire-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  carhire-web errors (in app)                                           │
//! │  └── ApiError         - What the HTTP client sees (serialized)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Taxonomy
//! | Variant                | Meaning                                         |
//! |------------------------|-------------------------------------------------|
//! | `Validation`           | Bad input shape or range                        |
//! | `Conflict`             | Would violate an invariant (overlap, deletion)  |
//! | `Forbidden`            | Role or ownership check failed                  |
//! | `NotFound`             | Referenced id is absent                         |
//! | `InvalidState`         | Operation not valid for the current status      |
//! | `AuthenticationFailed` | Credentials did not verify                      |

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They are translated to user-facing messages by the web layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The operation would violate an invariant.
    ///
    /// ## When This Occurs
    /// - Requested dates overlap an active rental of the same model
    /// - Deleting a car or model that is currently rented
    #[error("{0}")]
    Conflict(String),

    /// The principal lacks the role, capability or ownership required.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Entity is not in a status that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Cancelling a rental that is already cancelled or completed
    /// - Completing a rental that is not active
    #[error("{entity} {id} is {status}, cannot {action}")]
    InvalidState {
        entity: String,
        id: String,
        status: String,
        action: String,
    },

    /// Credentials did not match.
    ///
    /// The message is deliberately identical for an unknown user and a wrong
    /// password.
    #[error("Login unsuccessful. Please check username and password.")]
    AuthenticationFailed,
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        CoreError::Conflict(message.into())
    }

    /// Creates a Forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        CoreError::Forbidden(message.into())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every variant names the offending field so the client can show the
/// message next to it.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid email, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Two fields that must agree do not.
    #[error("{field} must match {other}")]
    Mismatch { field: String, other: String },

    /// Unique value already in use (username, email).
    #[error("{field} taken")]
    Taken { field: String },
}

impl ValidationError {
    /// Name of the field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Mismatch { field, .. }
            | ValidationError::Taken { field } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidState {
            entity: "Rental".to_string(),
            id: "r-1".to_string(),
            status: "cancelled".to_string(),
            action: "cancel".to_string(),
        };
        assert_eq!(err.to_string(), "Rental r-1 is cancelled, cannot cancel");

        let err = CoreError::not_found("Car", "c-9");
        assert_eq!(err.to_string(), "Car not found: c-9");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Taken {
            field: "username".to_string(),
        };
        assert_eq!(err.to_string(), "username taken");

        let err = ValidationError::OutOfRange {
            field: "year".to_string(),
            min: 1900,
            max: 2100,
        };
        assert_eq!(err.to_string(), "year must be between 1900 and 2100");
        assert_eq!(err.field(), "year");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "brand".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_authentication_message_is_generic() {
        let msg = CoreError::AuthenticationFailed.to_string();
        assert!(!msg.contains("unknown"));
        assert!(msg.contains("username and password"));
    }
}
