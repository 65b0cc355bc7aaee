//! Centralized default constants for the notewell system.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates should reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// NOTES
// =============================================================================

/// Title assigned when a note is created without one.
pub const NOTE_TITLE: &str = "Untitled Note";

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Guest account email in guest-mode deployments.
pub const GUEST_EMAIL: &str = "guest@notewell.local";

/// Guest account display name.
pub const GUEST_NAME: &str = "Guest User";

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "notewell_session";

/// Session lifetime in hours (30 days).
pub const SESSION_TTL_HOURS: i64 = 720;

/// Length of generated session tokens, in characters.
pub const SESSION_TOKEN_LENGTH: usize = 48;

/// Interval between expired-session purge sweeps, in seconds.
pub const SESSION_PURGE_INTERVAL_SECS: u64 = 3600;

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// SERVER
// =============================================================================

/// Default PostgreSQL connection URL.
pub const DATABASE_URL: &str = "postgres://localhost/notewell";

/// Default HTTP bind address.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum request body size in bytes. Notes are short text; 1 MB is
/// generous.
pub const MAX_BODY_SIZE_BYTES: usize = 1024 * 1024;
