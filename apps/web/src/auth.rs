//! Session and password module.
//!
//! - Session tokens: HS256 JWTs carried in the `carhire_session` cookie
//!   (or an `Authorization: Bearer` header).
//! - Passwords: argon2 PHC strings; plaintext is never stored.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use carhire_core::{Role, User};

use crate::error::ApiError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "carhire_session";

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Username at issue time (informational)
    pub username: String,

    /// Role at issue time. Requests use the stored role, not this one.
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// An issued token plus the cookie lifetime that goes with it.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub max_age_secs: i64,
}

/// Session token manager.
pub struct SessionManager {
    secret: String,
    session_lifetime_secs: i64,
    remember_lifetime_secs: i64,
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new(secret: String, session_lifetime_secs: i64, remember_lifetime_secs: i64) -> Self {
        SessionManager {
            secret,
            session_lifetime_secs,
            remember_lifetime_secs,
        }
    }

    /// Issue a session token for `user`; `remember` selects the long lifetime.
    pub fn issue(&self, user: &User, remember: bool) -> Result<IssuedSession, ApiError> {
        let lifetime = if remember {
            self.remember_lifetime_secs
        } else {
            self.session_lifetime_secs
        };

        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime);

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate session token: {}", e)))?;

        Ok(IssuedSession {
            token,
            max_age_secs: lifetime,
        })
    }

    /// Validate and decode a token. `None` for anything invalid or expired.
    pub fn validate(&self, token: &str) -> Option<Claims> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| tracing::debug!(error = %e, "Rejected session token"))
        .ok()?;

        Some(token_data.claims)
    }
}

// =============================================================================
// Cookies and Headers
// =============================================================================

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Finds a cookie's value in a `Cookie` header.
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a session token.
pub fn session_cookie(session: &IssuedSession) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, session.token, session.max_age_secs
    )
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "user-001".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Customer,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_session_roundtrip() {
        let manager = SessionManager::new("test-secret".to_string(), 3600, 86400);

        let session = manager.issue(&user(), false).unwrap();
        assert_eq!(session.max_age_secs, 3600);

        let claims = manager.validate(&session.token).unwrap();
        assert_eq!(claims.sub, "user-001");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Customer);
    }

    #[test]
    fn test_remember_uses_long_lifetime() {
        let manager = SessionManager::new("test-secret".to_string(), 3600, 86400);
        let session = manager.issue(&user(), true).unwrap();
        assert_eq!(session.max_age_secs, 86400);

        let claims = manager.validate(&session.token).unwrap();
        assert_eq!(claims.exp - claims.iat, 86400);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = SessionManager::new("secret-a".to_string(), 3600, 86400);
        let checker = SessionManager::new("secret-b".to_string(), 3600, 86400);

        let session = issuer.issue(&user(), false).unwrap();
        assert!(checker.validate(&session.token).is_none());
        assert!(checker.validate("not-a-token").is_none());
    }

    #[test]
    fn test_cookie_helpers() {
        let header = "theme=dark; carhire_session=abc.def.ghi; other=1";
        assert_eq!(cookie_value(header, SESSION_COOKIE), Some("abc.def.ghi"));
        assert_eq!(cookie_value("carhire_session=", SESSION_COOKIE), None);
        assert_eq!(cookie_value("theme=dark", SESSION_COOKIE), None);

        assert!(clear_session_cookie().contains("Max-Age=0"));
        assert_eq!(extract_bearer_token("Bearer xyz"), Some("xyz"));
        assert_eq!(extract_bearer_token("Basic xyz"), None);
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
        assert!(!verify_password("secret1", "not-a-hash"));
    }
}
