//! Core traits for notewell storage abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends (PostgreSQL, in-memory)
//! and testability.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::models::{Note, User};

// =============================================================================
// NOTE STORE
// =============================================================================

/// Fields for creating a note. The owner comes from the resolved identity,
/// never from a client-supplied field.
#[derive(Debug, Clone, Default)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub tags: Option<Vec<String>>,
}

/// Partial update of a note. Only supplied fields change; `updated_at`
/// refreshes regardless, even for an empty patch.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
}

impl UpdateNoteRequest {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.is_favorite.is_none()
    }
}

/// Repository for owner-scoped note CRUD.
///
/// Every operation takes an explicit owner id. Lookups that miss because the
/// note belongs to someone else report not-found, never a permission error.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// List all notes for an owner, newest `updated_at` first.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Note>>;

    /// Fetch a single note. `None` when absent or owned by someone else.
    async fn get(&self, id: i64, owner_id: i64) -> Result<Option<Note>>;

    /// Create a note with generated id and timestamps; favorites start false.
    async fn create(&self, owner_id: i64, req: CreateNoteRequest) -> Result<Note>;

    /// Apply a partial update. `None` when absent or not owned.
    async fn update(&self, id: i64, owner_id: i64, req: UpdateNoteRequest)
        -> Result<Option<Note>>;

    /// Delete a note. False when absent or not owned.
    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool>;

    /// Case-insensitive substring search over title OR content,
    /// newest-first. Wildcard characters in the query match literally.
    async fn search(&self, owner_id: i64, query: &str) -> Result<Vec<Note>>;

    /// List favorite notes, newest-first.
    async fn list_favorites(&self, owner_id: i64) -> Result<Vec<Note>>;

    /// Flip the favorite flag. `None` when absent or not owned.
    async fn toggle_favorite(&self, id: i64, owner_id: i64) -> Result<Option<Note>>;
}

// =============================================================================
// USER STORE
// =============================================================================

/// Fields for creating a user record.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub external_provider_id: Option<String>,
}

/// Repository for user lookup and creation.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get_by_provider_id(&self, provider_id: &str) -> Result<Option<User>>;

    /// Create a user. A duplicate email yields `Error::Conflict` and must
    /// not alter the existing record.
    async fn create(&self, req: CreateUserRequest) -> Result<User>;

    /// Attach an external provider id to an existing account. `None` when
    /// the user does not exist.
    async fn link_provider(&self, id: i64, provider_id: &str) -> Result<Option<User>>;
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// A freshly created session. The raw token is only available here; stores
/// persist its hash.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Server-side session records keyed by opaque token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for a user, valid for `ttl` from now.
    async fn create(&self, user_id: i64, ttl: Duration) -> Result<NewSession>;

    /// Resolve a presented token to a user id. Unknown and expired tokens
    /// both resolve to `None`.
    async fn resolve(&self, token: &str) -> Result<Option<i64>>;

    /// Revoke a single session; revoking an unknown token is a no-op.
    async fn revoke(&self, token: &str) -> Result<()>;

    /// Remove expired sessions, returning how many were dropped.
    async fn purge_expired(&self) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_is_empty() {
        assert!(UpdateNoteRequest::default().is_empty());

        let patch = UpdateNoteRequest {
            is_favorite: Some(true),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
