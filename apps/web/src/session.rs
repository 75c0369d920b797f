//! Request extractors resolving the session principal.
//!
//! ```text
//! Cookie: carhire_session=<jwt>      ─┐
//! Authorization: Bearer <jwt>        ─┴─► SessionManager::validate
//!                                              │ claims.sub
//!                                              ▼
//!                                   db.users().get_by_id ──► Principal
//! ```
//!
//! The role always comes from the stored user, so a demoted or deleted
//! account loses access on its next request even while its token is valid.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use tracing::debug;

use carhire_core::authz::{require_role, Principal, Role};

use crate::auth::{cookie_value, extract_bearer_token, SESSION_COOKIE};
use crate::error::ApiError;
use crate::AppState;

/// The session principal, if any.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Principal>);

/// A logged-in principal. Rejects with 401 and a login redirect.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

/// A logged-in admin. Rejects with 401 without a session, 403 otherwise.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Principal);

fn session_token(parts: &Parts) -> Option<&str> {
    let from_cookie = parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| cookie_value(header, SESSION_COOKIE));

    from_cookie.or_else(|| {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
    })
}

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(parts) else {
            return Ok(MaybeUser(None));
        };
        let Some(claims) = state.sessions.validate(token) else {
            return Ok(MaybeUser(None));
        };

        let user = state.db.users().get_by_id(&claims.sub).await?;
        if user.is_none() {
            debug!(user_id = %claims.sub, "Session refers to a missing user");
        }

        Ok(MaybeUser(user.as_ref().map(Principal::from)))
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(principal) = MaybeUser::from_request_parts(parts, state).await?;

        match principal {
            Some(principal) => Ok(AuthUser(principal)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                Err(ApiError::unauthenticated(Some(next)))
            }
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        require_role(&principal, Role::Admin)?;
        Ok(AdminUser(principal))
    }
}
