//! Login, registration and logout.
//!
//! Both entry pages are no-ops for an authenticated visitor: they answer
//! with a redirect home instead of a form.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use carhire_core::validation::{safe_next_path, RegistrationForm};
use carhire_core::{Principal, User};

use crate::auth::{clear_session_cookie, session_cookie};
use crate::error::ApiResult;
use crate::extract::FormJson;
use crate::routes::ActionResponse;
use crate::services::identity;
use crate::session::MaybeUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

fn already_logged_in() -> Response {
    Json(ActionResponse::<()>::new("You are already logged in.", "/")).into_response()
}

pub async fn login_page(
    MaybeUser(current): MaybeUser,
    Query(query): Query<NextQuery>,
) -> Response {
    if current.is_some() {
        return already_logged_in();
    }

    Json(LoginPage {
        next: safe_next_path(query.next.as_deref()).map(str::to_string),
    })
    .into_response()
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    MaybeUser(current): MaybeUser,
    Query(query): Query<NextQuery>,
    FormJson(form): FormJson<LoginForm>,
) -> ApiResult<Response> {
    if current.is_some() {
        return Ok(already_logged_in());
    }

    let user = identity::authenticate(&state.db, &form.username, &form.password)
        .await
        .map_err(|e| e.or_redirect("/login"))?;
    let session = state.sessions.issue(&user, form.remember)?;

    let principal = Principal::from(&user);
    let redirect = identity::login_redirect(&principal, query.next.as_deref());

    Ok((
        [(SET_COOKIE, session_cookie(&session))],
        Json(ActionResponse::new("Logged in successfully.", redirect).with_data(principal)),
    )
        .into_response())
}

pub async fn register_page(MaybeUser(current): MaybeUser) -> Response {
    if current.is_some() {
        return already_logged_in();
    }
    Json(RegistrationForm::default()).into_response()
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    MaybeUser(current): MaybeUser,
    FormJson(form): FormJson<RegistrationForm>,
) -> ApiResult<Response> {
    if current.is_some() {
        return Ok(already_logged_in());
    }

    let user = identity::register(&state.db, &form).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ActionResponse::<User>::new(
                "Your account has been created! You can now log in.",
                "/login",
            )
            .with_data(user),
        ),
    )
        .into_response())
}

pub async fn logout() -> Response {
    (
        [(SET_COOKIE, clear_session_cookie())],
        Json(ActionResponse::<()>::new("You have been logged out.", "/")),
    )
        .into_response()
}
