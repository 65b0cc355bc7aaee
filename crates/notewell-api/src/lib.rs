//! notewell-api — HTTP API server for notewell.
//!
//! Library surface: router construction and shared application state, so
//! integration tests can start the real router in-process.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use governor::{Quota, RateLimiter};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use notewell_core::defaults;
use notewell_db::Storage;

use auth::IdentityResolver;
use config::{ApiConfig, AuthMode};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically in logs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Global rate limiter type (direct quota, no keyed bucketing for a
/// personal server).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Selected storage backend (PostgreSQL or in-memory).
    pub storage: Storage,
    /// Active identity resolution strategy.
    pub resolver: Arc<dyn IdentityResolver>,
    /// Server configuration resolved at startup.
    pub config: Arc<ApiConfig>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

/// Build the global rate limiter from configuration, if enabled.
pub fn build_rate_limiter(config: &ApiConfig) -> Option<Arc<GlobalRateLimiter>> {
    if !config.rate_limit_enabled {
        return None;
    }
    let quota = Quota::with_period(std::time::Duration::from_secs(
        config.rate_limit_period_secs,
    ))
    .expect("Rate limit period must be non-zero")
    .allow_burst(
        NonZeroU32::new(config.rate_limit_requests as u32).expect("Rate limit must be non-zero"),
    );
    Some(Arc::new(RateLimiter::direct(quota)))
}

/// Reject requests once the global quota is exhausted.
async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            let body = Json(serde_json::json!({ "error": "Too many requests" }));
            return (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        }
    }
    next.run(request).await
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origin = if config.cors_allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(std::time::Duration::from_secs(defaults::CORS_MAX_AGE_SECS))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router with all layers applied.
pub fn build_router(state: AppState) -> Router {
    let mut app = Router::new()
        // Notes CRUD
        .route(
            "/api/notes",
            get(handlers::notes::list_notes).post(handlers::notes::create_note),
        )
        .route(
            "/api/notes/:id",
            get(handlers::notes::get_note)
                .patch(handlers::notes::update_note)
                .put(handlers::notes::update_note)
                .delete(handlers::notes::delete_note),
        )
        .route(
            "/api/notes/:id/favorite",
            patch(handlers::notes::toggle_favorite).post(handlers::notes::toggle_favorite),
        )
        // Current user
        .route("/api/user", get(handlers::auth::current_user))
        .route("/api/auth/me", get(handlers::auth::current_user))
        .route("/api/auth/config", get(handlers::auth::auth_config));

    // Credential endpoints only exist in credentialed deployments; guest
    // mode has nothing to log in to.
    if state.config.auth_mode == AuthMode::Session {
        app = app
            .route("/api/auth/register", post(handlers::auth::register))
            .route("/api/auth/login", post(handlers::auth::login))
            .route("/api/auth/logout", post(handlers::auth::logout));
    }

    app.route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(&state.config))
        .layer(RequestBodyLimitLayer::new(defaults::MAX_BODY_SIZE_BYTES))
        .with_state(state)
}
