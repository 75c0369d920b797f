//! Request body extractor for form submissions.
//!
//! Works like [`axum::Json`] but rejects with [`ApiError`], so a body that
//! fails to deserialize gets the same 400 `VALIDATION_ERROR` shape as any
//! other invalid input instead of axum's plain-text rejection.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON form body.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormJson<T>(pub T);

impl<S, T> FromRequest<S> for FormJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(FormJson(value))
    }
}
