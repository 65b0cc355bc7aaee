//! Identity resolution and credential primitives.
//!
//! One `IdentityResolver` implementation is active per process, selected by
//! `AUTH_MODE` at startup: `SessionResolver` (cookie or bearer token looked
//! up in the session store) or `GuestResolver` (everything belongs to one
//! startup-provisioned account).

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use tracing::info;

use notewell_core::defaults::SESSION_COOKIE;
use notewell_core::{CreateUserRequest, Error, Result, SessionStore, UserStore};

use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// PASSWORDS (Argon2id)
// =============================================================================

/// Hash a password using Argon2id. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("failed to hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a PHC-format hash string.
///
/// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| Error::Internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

// =============================================================================
// SESSION TOKEN TRANSPORT
// =============================================================================

/// Extract a bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Extract the session token from the Cookie header.
fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

/// Token from either transport; bearer wins when both are present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_token(headers))
}

/// Build the Set-Cookie value for a fresh session.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// Build the Set-Cookie value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

// =============================================================================
// IDENTITY RESOLUTION
// =============================================================================

/// Maps an incoming request to the user id it acts as.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve the request to a user id, or fail with `Unauthenticated`.
    async fn resolve(&self, headers: &HeaderMap) -> Result<i64>;
}

/// Credentialed mode: the session token names the user.
pub struct SessionResolver {
    sessions: Arc<dyn SessionStore>,
}

impl SessionResolver {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl IdentityResolver for SessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Result<i64> {
        let token = session_token(headers)
            .ok_or_else(|| Error::Unauthenticated("missing session token".to_string()))?;

        self.sessions
            .resolve(&token)
            .await?
            .ok_or_else(|| Error::Unauthenticated("invalid or expired session".to_string()))
    }
}

/// Guest mode: every request acts as the one guest account. Never fails.
pub struct GuestResolver {
    user_id: i64,
}

impl GuestResolver {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

#[async_trait]
impl IdentityResolver for GuestResolver {
    async fn resolve(&self, _headers: &HeaderMap) -> Result<i64> {
        Ok(self.user_id)
    }
}

/// Find or create the guest account at startup.
///
/// Any failure here aborts startup; attributing data to a made-up user id
/// would mask a broken database as success.
pub async fn provision_guest(
    users: &Arc<dyn UserStore>,
    email: &str,
    name: &str,
) -> Result<i64> {
    if let Some(existing) = users.get_by_email(email).await? {
        info!(
            subsystem = "auth",
            op = "provision_guest",
            user_id = existing.id,
            "Guest account found"
        );
        return Ok(existing.id);
    }

    let created = users
        .create(CreateUserRequest {
            email: email.to_string(),
            name: name.to_string(),
            password_hash: None,
            external_provider_id: None,
        })
        .await?;
    info!(
        subsystem = "auth",
        op = "provision_guest",
        user_id = created.id,
        "Guest account created"
    );
    Ok(created.id)
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// The authenticated user id for a request.
///
/// Handlers take this as an argument; extraction runs the active resolver
/// and rejects with 401 on failure.
pub struct AuthUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let user_id = state.resolver.resolve(&parts.headers).await?;
        Ok(AuthUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_cookie_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; notewell_session=tok42; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok42"));
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-bearer"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("notewell_session=from-cookie"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("from-bearer"));
    }

    #[test]
    fn test_missing_token() {
        let headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok", 3600);
        assert!(cookie.starts_with("notewell_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=3600"));

        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
