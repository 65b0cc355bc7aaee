//! PostgreSQL session store.
//!
//! Sessions are opaque tokens handed to the client once; only the SHA-256
//! hash of a token is persisted, so a leaked table does not leak usable
//! credentials.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use notewell_core::defaults::SESSION_TOKEN_LENGTH;
use notewell_core::{Error, NewSession, Result, SessionStore};

/// Generate a cryptographically random alphanumeric token.
pub(crate) fn generate_token(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hash a token using SHA-256, hex-encoded.
pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// PostgreSQL implementation of SessionStore. Sessions survive restarts.
pub struct PgSessionStore {
    pool: Pool<Postgres>,
}

impl PgSessionStore {
    /// Create a new PgSessionStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, user_id: i64, ttl: Duration) -> Result<NewSession> {
        let token = generate_token(SESSION_TOKEN_LENGTH);
        let now = Utc::now();
        let expires_at = now + ttl;

        sqlx::query(
            "INSERT INTO session (token_hash, user_id, created_at, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(hash_token(&token))
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(NewSession {
            token,
            user_id,
            expires_at,
        })
    }

    async fn resolve(&self, token: &str) -> Result<Option<i64>> {
        let row = sqlx::query(
            "SELECT user_id FROM session WHERE token_hash = $1 AND expires_at > $2",
        )
        .bind(hash_token(token))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| r.get("user_id")))
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM session WHERE token_hash = $1")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        let purged = result.rows_affected();
        if purged > 0 {
            debug!(
                subsystem = "database",
                component = "sessions",
                op = "purge_expired",
                result_count = purged,
                "Purged expired sessions"
            );
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_length_and_charset() {
        let token = generate_token(48);
        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_token_unique() {
        assert_ne!(generate_token(48), generate_token(48));
    }

    #[test]
    fn test_hash_token_deterministic() {
        let a = hash_token("secret");
        let b = hash_token("secret");
        assert_eq!(a, b);
        // SHA-256 hex digest
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_token("Secret"));
    }
}
