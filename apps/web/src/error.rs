//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Car Hire                               │
//! │                                                                         │
//! │  Handler → Result<Json<T>, ApiError>                                   │
//! │         │                                                               │
//! │         ├── JsonRejection (bad body) ──────┐                            │
//! │         ├── ValidationError ───────────────┤                            │
//! │         ├── CoreError (conflict, ...) ─────┼──► ApiError ──► status +   │
//! │         └── DbError (incl. Core(..)) ──────┘                JSON body   │
//! │                                                                         │
//! │  Internal failures are logged with their detail and answered with a    │
//! │  generic message; an open transaction is rolled back when dropped.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! {
//!   "code": "CONFLICT",
//!   "message": "Car is already booked for the selected dates.",
//!   "redirect": "/user/car/5b0c..."
//! }
//! ```
//! `field` is set for validation errors so the client can show the message
//! next to the input.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use carhire_core::{CoreError, ValidationError};
use carhire_db::DbError;

/// Generic text shown for unhandled failures.
pub const INTERNAL_MESSAGE: &str = "Something went wrong. Please try again.";

/// API error returned from handlers.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Offending input field (validation errors only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Page the browser should go back to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// No session, or credentials did not verify (401)
    Unauthenticated,

    /// Role or ownership check failed (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Would violate an invariant (409)
    Conflict,

    /// Not valid for the current status (422)
    InvalidState,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InvalidState => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
            redirect: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error for one field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError {
            field: Some(field.into()),
            ..ApiError::new(ErrorCode::ValidationError, message)
        }
    }

    /// Creates an unauthenticated error that sends the browser to login.
    pub fn unauthenticated(next: Option<&str>) -> Self {
        let redirect = match next {
            Some(path) => format!("/login?next={}", path),
            None => "/login".to_string(),
        };
        ApiError::new(ErrorCode::Unauthenticated, "Please log in to access this page.")
            .with_redirect(redirect)
    }

    /// Creates an internal error. The detail is logged, never sent.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Sets the page the client should return to.
    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    /// Sets a redirect unless one is already present.
    pub fn or_redirect(self, redirect: impl Into<String>) -> Self {
        if self.redirect.is_some() || self.code == ErrorCode::Internal {
            return self;
        }
        self.with_redirect(redirect)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.field().to_string(), err.to_string())
    }
}

/// Converts body deserialization failures to API errors.
///
/// The offending field is recovered from the deserializer's message
/// (`end_date: input is out of range ...`, ``missing field `password` ``).
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        let detail = [
            "Failed to deserialize the JSON body into the target type: ",
            "Failed to parse the request body as JSON: ",
        ]
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(&text);

        match rejected_field(detail) {
            Some(field) => ApiError::validation(field, detail),
            None => ApiError::new(ErrorCode::ValidationError, detail),
        }
    }
}

/// Field path named by a serde error message, if any.
fn rejected_field(detail: &str) -> Option<String> {
    if let Some(rest) = detail.strip_prefix("missing field `") {
        return rest.split_once('`').map(|(field, _)| field.to_string());
    }
    let (path, _) = detail.split_once(": ")?;
    if path.is_empty() || path.contains(char::is_whitespace) {
        return None;
    }
    Some(path.to_string())
}

/// Converts domain errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => v.into(),
            CoreError::Conflict(msg) => ApiError::new(ErrorCode::Conflict, msg),
            CoreError::Forbidden(_) => ApiError::new(
                ErrorCode::Forbidden,
                "You do not have permission to do that.",
            ),
            CoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            e @ CoreError::InvalidState { .. } => ApiError::new(ErrorCode::InvalidState, e.to_string()),
            e @ CoreError::AuthenticationFailed => {
                ApiError::new(ErrorCode::Unauthenticated, e.to_string())
            }
        }
    }
}

/// Converts database errors to API errors.
///
/// ## Mapping
/// ```text
/// NotFound            → 404
/// UniqueViolation     → 400 "<column> taken"
/// ForeignKeyViolation → 404 (referenced row vanished)
/// Core(..)            → as CoreError
/// everything else     → 500
/// ```
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            ref e @ DbError::UniqueViolation { .. } => {
                let column = e.duplicate_column().unwrap_or("value").to_string();
                ValidationError::Taken { field: column }.into()
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                ApiError::new(ErrorCode::NotFound, "A referenced record no longer exists.")
            }
            DbError::Core(core) => core.into(),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();

        let body = if self.code == ErrorCode::Internal {
            tracing::error!(detail = %self.message, "Request failed");
            ApiError {
                message: INTERNAL_MESSAGE.to_string(),
                ..self
            }
        } else {
            tracing::debug!(code = ?self.code, message = %self.message, "Request rejected");
            self
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::conflict("Car is already booked").into();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.code.status(), StatusCode::CONFLICT);

        let err: ApiError = CoreError::forbidden("customer may not ManageCatalog").into();
        assert_eq!(err.code.status(), StatusCode::FORBIDDEN);
        assert!(!err.message.contains("ManageCatalog"));

        let err: ApiError = CoreError::AuthenticationFailed.into();
        assert_eq!(err.code.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_unique_violation_becomes_taken() {
        let err: ApiError = DbError::duplicate("users.username", "bob").into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("username"));
        assert_eq!(err.message, "username taken");
    }

    #[test]
    fn test_wrapped_core_error_unwrapped() {
        let err: ApiError = DbError::Core(CoreError::not_found("Rental", "r-1")).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_internal_has_no_default_redirect() {
        let err = ApiError::internal("boom").or_redirect("/");
        assert!(err.redirect.is_none());

        let err = ApiError::new(ErrorCode::Conflict, "x").or_redirect("/back");
        assert_eq!(err.redirect.as_deref(), Some("/back"));
    }

    #[test]
    fn test_rejected_field() {
        assert_eq!(
            rejected_field("end_date: input is out of range at line 1 column 50").as_deref(),
            Some("end_date")
        );
        assert_eq!(
            rejected_field("missing field `password` at line 1 column 20").as_deref(),
            Some("password")
        );
        assert_eq!(
            rejected_field("invalid type: integer `1`, expected a map at line 1 column 1"),
            None
        );
        assert_eq!(rejected_field("EOF while parsing an object at line 1 column 1"), None);
    }

    #[test]
    fn test_unauthenticated_redirect() {
        let err = ApiError::unauthenticated(Some("/user/my_rentals"));
        assert_eq!(err.redirect.as_deref(), Some("/login?next=/user/my_rentals"));
    }
}
