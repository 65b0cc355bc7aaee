//! Server configuration, resolved once at startup from the environment.

use chrono::Duration;

use notewell_core::{defaults, Error, Result};

/// Which storage backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Which identity resolution strategy is active. Exactly one per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Email+password login with server-side sessions.
    Session,
    /// Every request attributed to one startup-provisioned guest account.
    Guest,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub storage_backend: StorageBackend,
    pub auth_mode: AuthMode,
    pub guest_email: String,
    pub guest_name: String,
    pub session_ttl: Duration,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u64,
    pub rate_limit_period_secs: u64,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            database_url: defaults::DATABASE_URL.to_string(),
            storage_backend: StorageBackend::Postgres,
            auth_mode: AuthMode::Session,
            guest_email: defaults::GUEST_EMAIL.to_string(),
            guest_name: defaults::GUEST_NAME.to_string(),
            session_ttl: Duration::hours(defaults::SESSION_TTL_HOURS),
            rate_limit_enabled: true,
            rate_limit_requests: defaults::RATE_LIMIT_REQUESTS,
            rate_limit_period_secs: defaults::RATE_LIMIT_PERIOD_SECS,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

impl ApiConfig {
    /// Read configuration from the environment, falling back to defaults.
    ///
    /// Unknown values for the enum-like settings (`STORAGE_BACKEND`,
    /// `AUTH_MODE`) are configuration errors, not silent fallbacks.
    pub fn from_env() -> Result<Self> {
        let base = Self::default();

        let storage_backend = match std::env::var("STORAGE_BACKEND").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            Ok("postgres") | Err(_) => StorageBackend::Postgres,
            Ok(other) => {
                return Err(Error::Config(format!(
                    "unknown STORAGE_BACKEND '{other}' (expected 'postgres' or 'memory')"
                )))
            }
        };

        let auth_mode = match std::env::var("AUTH_MODE").as_deref() {
            Ok("guest") => AuthMode::Guest,
            Ok("session") | Err(_) => AuthMode::Session,
            Ok(other) => {
                return Err(Error::Config(format!(
                    "unknown AUTH_MODE '{other}' (expected 'session' or 'guest')"
                )))
            }
        };

        let session_ttl_hours = env_parse("SESSION_TTL_HOURS", defaults::SESSION_TTL_HOURS)?;
        if session_ttl_hours <= 0 {
            return Err(Error::Config(
                "SESSION_TTL_HOURS must be positive".to_string(),
            ));
        }

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| base.cors_allowed_origins.clone());

        Ok(Self {
            host: std::env::var("HOST").unwrap_or(base.host),
            port: env_parse("PORT", base.port)?,
            database_url: std::env::var("DATABASE_URL").unwrap_or(base.database_url),
            storage_backend,
            auth_mode,
            guest_email: std::env::var("GUEST_EMAIL").unwrap_or(base.guest_email),
            guest_name: std::env::var("GUEST_NAME").unwrap_or(base.guest_name),
            session_ttl: Duration::hours(session_ttl_hours),
            rate_limit_enabled: env_bool("RATE_LIMIT_ENABLED", true),
            rate_limit_requests: env_parse("RATE_LIMIT_REQUESTS", base.rate_limit_requests)?,
            rate_limit_period_secs: env_parse(
                "RATE_LIMIT_PERIOD_SECS",
                base.rate_limit_period_secs,
            )?,
            cors_allowed_origins,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{key} has invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.auth_mode, AuthMode::Session);
        assert_eq!(config.storage_backend, StorageBackend::Postgres);
        assert_eq!(config.session_ttl, Duration::hours(720));
    }
}
