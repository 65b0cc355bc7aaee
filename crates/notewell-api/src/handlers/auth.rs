//! Authentication and current-user endpoints.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::Deserialize;
use tracing::info;

use notewell_core::{defaults, CreateUserRequest, UserProfile};

use crate::auth::{
    self, hash_password, session_cookie, session_token, verify_password, AuthUser,
};
use crate::error::{ApiError, FieldError};
use crate::AppState;

/// GET /api/user and /api/auth/me
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .storage
        .users
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| {
            // A session that points at a vanished account is stale identity,
            // not a missing resource.
            ApiError::Unauthenticated("account no longer exists".to_string())
        })?;

    Ok(Json(user.profile()))
}

/// GET /api/auth/config
///
/// Delegated OAuth is not part of this deployment; the client reads this
/// to decide which login form to render.
pub async fn auth_config() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "googleOAuthEnabled": false }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

fn validate_registration(body: &RegisterBody) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if body.name.trim().is_empty() {
        errors.push(FieldError::new("name", "is required"));
    }
    let email = body.email.trim();
    if email.is_empty() {
        errors.push(FieldError::new("email", "is required"));
    } else if !email.contains('@') {
        errors.push(FieldError::new("email", "must be a valid email address"));
    }
    if body.password.len() < defaults::MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!(
                "must be at least {} characters",
                defaults::MIN_PASSWORD_LEN
            ),
        ));
    }
    if body.confirm_password != body.password {
        errors.push(FieldError::new("confirmPassword", "does not match password"));
    }

    errors
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
    let errors = validate_registration(&body);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let password_hash = hash_password(&body.password)?;
    let user = state
        .storage
        .users
        .create(CreateUserRequest {
            email: body.email.trim().to_string(),
            name: body.name.trim().to_string(),
            password_hash: Some(password_hash),
            external_provider_id: None,
        })
        .await?;

    info!(
        subsystem = "auth",
        op = "register",
        user_id = user.id,
        "User registered"
    );

    let session = state
        .storage
        .sessions
        .create(user.id, state.config.session_ttl)
        .await?;

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(
            header::SET_COOKIE,
            session_cookie(&session.token, state.config.session_ttl.num_seconds()),
        )]),
        Json(serde_json::json!({
            "user": user.profile(),
            "token": session.token,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/login
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
    let invalid = || ApiError::Unauthenticated("Invalid email or password".to_string());

    let user = state
        .storage
        .users
        .get_by_email(body.email.trim())
        .await?
        .ok_or_else(invalid)?;

    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
    if !verify_password(&body.password, hash)? {
        return Err(invalid());
    }

    let session = state
        .storage
        .sessions
        .create(user.id, state.config.session_ttl)
        .await?;

    info!(
        subsystem = "auth",
        op = "login",
        user_id = user.id,
        "User logged in"
    );

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            session_cookie(&session.token, state.config.session_ttl.num_seconds()),
        )]),
        Json(serde_json::json!({
            "user": user.profile(),
            "token": session.token,
        })),
    ))
}

/// POST /api/auth/logout
///
/// Revokes only the presented session; other sessions stay valid.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = session_token(&headers)
        .ok_or_else(|| ApiError::Unauthenticated("missing session token".to_string()))?;

    state.storage.sessions.revoke(&token).await?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, auth::clear_session_cookie())]),
        Json(serde_json::json!({ "message": "Logged out" })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_body() -> RegisterBody {
        RegisterBody {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "longenough".to_string(),
            confirm_password: "longenough".to_string(),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(validate_registration(&valid_body()).is_empty());
    }

    #[test]
    fn test_missing_fields_are_reported_individually() {
        let body = RegisterBody {
            name: "  ".to_string(),
            email: String::new(),
            password: "short".to_string(),
            confirm_password: "different".to_string(),
        };
        let errors = validate_registration(&body);
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "password", "confirmPassword"]);
    }

    #[test]
    fn test_email_must_contain_at_sign() {
        let body = RegisterBody {
            email: "not-an-email".to_string(),
            ..valid_body()
        };
        let errors = validate_registration(&body);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }
}
