//! # Identity Service
//!
//! Registration, credential checks and the startup admin account.
//!
//! ## Login Flow
//! ```text
//! POST /login { username, password, remember, next? }
//!      │
//!      ▼
//! authenticate() ── unknown user ─┐
//!      │        ── bad password ──┴─► 401 "Login unsuccessful..."
//!      ▼
//! SessionManager::issue(user, remember) ──► Set-Cookie: carhire_session
//!      │
//!      ▼
//! login_redirect(principal, next) ──► safe `next` or role dashboard
//! ```

use tracing::{debug, info, warn};

use carhire_core::validation::{safe_next_path, validate_registration, RegistrationForm};
use carhire_core::{CoreError, Principal, Role, User, ValidationError};
use carhire_db::Database;

use crate::auth::{hash_password, verify_password};
use crate::config::AppConfig;
use crate::error::ApiResult;

/// Creates a customer account.
///
/// Username and email are checked up front so the user gets a field error;
/// a concurrent registration that slips past the check hits the UNIQUE
/// constraint and maps to the same error.
pub async fn register(db: &Database, form: &RegistrationForm) -> ApiResult<User> {
    let draft = validate_registration(form)?;

    if db.users().username_exists(&draft.username).await? {
        debug!(username = %draft.username, "Registration rejected: username taken");
        return Err(ValidationError::Taken {
            field: "username".to_string(),
        }
        .into());
    }
    if db.users().email_exists(&draft.email).await? {
        debug!(email = %draft.email, "Registration rejected: email taken");
        return Err(ValidationError::Taken {
            field: "email".to_string(),
        }
        .into());
    }

    let password_hash = hash_password(&draft.password)?;
    let user = db
        .users()
        .insert(&draft.username, &draft.email, &password_hash, Role::Customer)
        .await?;

    info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(user)
}

/// Checks credentials. Unknown user and wrong password fail identically.
pub async fn authenticate(db: &Database, username: &str, password: &str) -> ApiResult<User> {
    let user = db.users().get_by_username(username.trim()).await?;

    match user {
        Some(user) if verify_password(password, &user.password_hash) => {
            info!(user_id = %user.id, "Login succeeded");
            Ok(user)
        }
        _ => {
            debug!(username = %username, "Login failed");
            Err(CoreError::AuthenticationFailed.into())
        }
    }
}

/// Where to send a freshly logged-in principal.
pub fn login_redirect(principal: &Principal, next: Option<&str>) -> String {
    safe_next_path(next)
        .unwrap_or_else(|| principal.home_path())
        .to_string()
}

/// Creates the configured admin account if no user has its username.
///
/// Returns the account when one was created.
pub async fn bootstrap_admin(db: &Database, config: &AppConfig) -> ApiResult<Option<User>> {
    if db.users().username_exists(&config.admin_username).await? {
        debug!(username = %config.admin_username, "Admin account present");
        return Ok(None);
    }

    let password_hash = hash_password(&config.admin_password)?;
    let admin = db
        .users()
        .insert(
            &config.admin_username,
            &config.admin_email,
            &password_hash,
            Role::Admin,
        )
        .await?;

    warn!(username = %admin.username, "Created bootstrap admin account; change its password");
    Ok(Some(admin))
}
