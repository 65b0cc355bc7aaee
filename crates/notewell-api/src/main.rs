//! notewell-api - HTTP API server for notewell

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notewell_api::auth::{provision_guest, GuestResolver, IdentityResolver, SessionResolver};
use notewell_api::config::{ApiConfig, AuthMode, StorageBackend};
use notewell_api::{build_rate_limiter, build_router, AppState};
use notewell_core::defaults;
use notewell_db::{create_pool, log_pool_metrics, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "notewell_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notewell_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("notewell-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            // No ANSI in files unless explicitly requested
            layer = layer.with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Resolve configuration from environment
    let config = ApiConfig::from_env()?;

    // Select the storage backend
    let storage = match config.storage_backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&config.database_url).await?;
            info!("Running database migrations...");
            notewell_db::migrate(&pool).await?;
            info!("Database ready");

            // Periodic pool health metrics
            let metrics_pool = pool.clone();
            tokio::spawn(async move {
                let mut tick =
                    tokio::time::interval(std::time::Duration::from_secs(60));
                loop {
                    tick.tick().await;
                    log_pool_metrics(&metrics_pool);
                }
            });

            Storage::postgres(pool)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage (not durable across restarts)");
            Storage::memory()
        }
    };

    // Select the identity resolution strategy
    let resolver: Arc<dyn IdentityResolver> = match config.auth_mode {
        AuthMode::Guest => {
            let guest_id =
                provision_guest(&storage.users, &config.guest_email, &config.guest_name)
                    .await?;
            info!(user_id = guest_id, "Guest mode: all requests act as one account");
            Arc::new(GuestResolver::new(guest_id))
        }
        AuthMode::Session => {
            info!("Credentialed mode: session-cookie authentication");

            // Sweep expired sessions on a fixed interval
            let purge_sessions = storage.sessions.clone();
            tokio::spawn(async move {
                let mut tick = tokio::time::interval(std::time::Duration::from_secs(
                    defaults::SESSION_PURGE_INTERVAL_SECS,
                ));
                loop {
                    tick.tick().await;
                    if let Err(e) = purge_sessions.purge_expired().await {
                        tracing::warn!(error = %e, "Session purge failed");
                    }
                }
            });

            Arc::new(SessionResolver::new(storage.sessions.clone()))
        }
    };

    let rate_limiter = build_rate_limiter(&config);
    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if rate_limiter.is_some() {
            "enabled"
        } else {
            "disabled"
        },
        config.rate_limit_requests,
        config.rate_limit_period_secs
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState {
        storage,
        resolver,
        config: Arc::new(config),
        rate_limiter,
    };

    let app = build_router(state);

    info!(%addr, "notewell-api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
