//! In-memory storage backend.
//!
//! Process-lifetime maps keyed by auto-incrementing integer ids. One
//! `MemoryStorage` implements all three store traits, so a single instance
//! backs a whole `Storage`. Used by the test suite and by dev deployments
//! that do not want a database; nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use notewell_core::defaults::SESSION_TOKEN_LENGTH;
use notewell_core::{
    CreateNoteRequest, CreateUserRequest, Error, NewSession, Note, NoteStore, Result,
    SessionStore, UpdateNoteRequest, User, UserStore,
};

use crate::sessions::{generate_token, hash_token};

struct MemorySession {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

struct MemoryState {
    users: HashMap<i64, User>,
    notes: HashMap<i64, Note>,
    /// Keyed by token hash, same as the relational store.
    sessions: HashMap<String, MemorySession>,
    next_user_id: i64,
    next_note_id: i64,
}

/// In-memory implementation of all store traits.
#[derive(Clone)]
pub struct MemoryStorage {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState {
                users: HashMap::new(),
                notes: HashMap::new(),
                sessions: HashMap::new(),
                next_user_id: 1,
                next_note_id: 1,
            })),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

#[async_trait]
impl NoteStore for MemoryStorage {
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Note>> {
        let state = self.state.read().await;
        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|n| n.owner_user_id == owner_id)
            .cloned()
            .collect();
        sort_newest_first(&mut notes);
        Ok(notes)
    }

    async fn get(&self, id: i64, owner_id: i64) -> Result<Option<Note>> {
        let state = self.state.read().await;
        Ok(state
            .notes
            .get(&id)
            .filter(|n| n.owner_user_id == owner_id)
            .cloned())
    }

    async fn create(&self, owner_id: i64, req: CreateNoteRequest) -> Result<Note> {
        let mut state = self.state.write().await;
        let id = state.next_note_id;
        state.next_note_id += 1;

        let now = Utc::now();
        let note = Note {
            id,
            owner_user_id: owner_id,
            title: req.title,
            content: req.content,
            tags: req.tags,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        };
        state.notes.insert(id, note.clone());
        Ok(note)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        req: UpdateNoteRequest,
    ) -> Result<Option<Note>> {
        let mut state = self.state.write().await;
        let Some(note) = state
            .notes
            .get_mut(&id)
            .filter(|n| n.owner_user_id == owner_id)
        else {
            return Ok(None);
        };

        if let Some(title) = req.title {
            note.title = title;
        }
        if let Some(content) = req.content {
            note.content = content;
        }
        if let Some(tags) = req.tags {
            note.tags = Some(tags);
        }
        if let Some(is_favorite) = req.is_favorite {
            note.is_favorite = is_favorite;
        }
        note.updated_at = Utc::now();
        Ok(Some(note.clone()))
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        let owned = state
            .notes
            .get(&id)
            .is_some_and(|n| n.owner_user_id == owner_id);
        if owned {
            state.notes.remove(&id);
        }
        Ok(owned)
    }

    async fn search(&self, owner_id: i64, query: &str) -> Result<Vec<Note>> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|n| {
                n.owner_user_id == owner_id
                    && (n.title.to_lowercase().contains(&needle)
                        || n.content.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        sort_newest_first(&mut notes);
        Ok(notes)
    }

    async fn list_favorites(&self, owner_id: i64) -> Result<Vec<Note>> {
        let state = self.state.read().await;
        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|n| n.owner_user_id == owner_id && n.is_favorite)
            .cloned()
            .collect();
        sort_newest_first(&mut notes);
        Ok(notes)
    }

    async fn toggle_favorite(&self, id: i64, owner_id: i64) -> Result<Option<Note>> {
        let mut state = self.state.write().await;
        let Some(note) = state
            .notes
            .get_mut(&id)
            .filter(|n| n.owner_user_id == owner_id)
        else {
            return Ok(None);
        };

        note.is_favorite = !note.is_favorite;
        note.updated_at = Utc::now();
        Ok(Some(note.clone()))
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_by_provider_id(&self, provider_id: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.external_provider_id.as_deref() == Some(provider_id))
            .cloned())
    }

    async fn create(&self, req: CreateUserRequest) -> Result<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == req.email) {
            return Err(Error::Conflict("email already registered".to_string()));
        }
        if let Some(pid) = &req.external_provider_id {
            if state
                .users
                .values()
                .any(|u| u.external_provider_id.as_deref() == Some(pid.as_str()))
            {
                return Err(Error::Conflict("provider id already linked".to_string()));
            }
        }

        let id = state.next_user_id;
        state.next_user_id += 1;

        let now = Utc::now();
        let user = User {
            id,
            email: req.email,
            name: req.name,
            password_hash: req.password_hash,
            external_provider_id: req.external_provider_id,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn link_provider(&self, id: i64, provider_id: &str) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        user.external_provider_id = Some(provider_id.to_string());
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl SessionStore for MemoryStorage {
    async fn create(&self, user_id: i64, ttl: Duration) -> Result<NewSession> {
        let token = generate_token(SESSION_TOKEN_LENGTH);
        let expires_at = Utc::now() + ttl;

        let mut state = self.state.write().await;
        state.sessions.insert(
            hash_token(&token),
            MemorySession {
                user_id,
                expires_at,
            },
        );

        Ok(NewSession {
            token,
            user_id,
            expires_at,
        })
    }

    async fn resolve(&self, token: &str) -> Result<Option<i64>> {
        let state = self.state.read().await;
        Ok(state
            .sessions
            .get(&hash_token(token))
            .filter(|s| s.expires_at > Utc::now())
            .map(|s| s.user_id))
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.sessions.remove(&hash_token(token));
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let now = Utc::now();
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - state.sessions.len()) as u64)
    }
}
