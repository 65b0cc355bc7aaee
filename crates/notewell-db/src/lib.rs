//! # notewell-db
//!
//! Storage layer for notewell.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL implementations of the core store traits
//! - An in-memory implementation for tests and dev deployments
//! - Session token generation and hashing
//!
//! ## Example
//!
//! ```rust,ignore
//! use notewell_core::CreateNoteRequest;
//! use notewell_db::Storage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Storage::connect("postgres://localhost/notewell").await?;
//!
//!     let note = storage
//!         .notes
//!         .create(
//!             1,
//!             CreateNoteRequest {
//!                 title: "Hello".to_string(),
//!                 content: "world".to_string(),
//!                 tags: None,
//!             },
//!         )
//!         .await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod notes;
pub mod pool;
pub mod sessions;
pub mod users;

use std::sync::Arc;

use notewell_core::{NoteStore, Result, SessionStore, UserStore};

// Re-export core types
pub use notewell_core::{Error, Note, User};

// Re-export store implementations
pub use memory::MemoryStorage;
pub use notes::PgNoteStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use sessions::PgSessionStore;
pub use users::PgUserStore;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined storage context: one handle per store trait.
///
/// Backends are interchangeable behind the trait objects; deployments pick
/// one via configuration.
#[derive(Clone)]
pub struct Storage {
    /// Note store for owner-scoped CRUD and search.
    pub notes: Arc<dyn NoteStore>,
    /// User store for account lookup and creation.
    pub users: Arc<dyn UserStore>,
    /// Session store for opaque-token sessions.
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    /// Storage backed by PostgreSQL through the given pool.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            notes: Arc::new(PgNoteStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
            sessions: Arc::new(PgSessionStore::new(pool)),
        }
    }

    /// Connect to PostgreSQL with default pool configuration.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::postgres(pool))
    }

    /// Process-lifetime in-memory storage. Not durable across restarts.
    pub fn memory() -> Self {
        let mem = MemoryStorage::new();
        Self {
            notes: Arc::new(mem.clone()),
            users: Arc::new(mem.clone()),
            sessions: Arc::new(mem),
        }
    }
}

/// Run pending migrations against a PostgreSQL pool.
#[cfg(feature = "migrations")]
pub async fn migrate(pool: &sqlx::PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("under_score"), "under\\_score");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
