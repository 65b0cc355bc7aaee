//! PostgreSQL note store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;

use notewell_core::{
    CreateNoteRequest, Error, Note, NoteStore, Result, UpdateNoteRequest,
};

use crate::escape_like;

const NOTE_COLUMNS: &str =
    "id, owner_user_id, title, content, tags, is_favorite, created_at, updated_at";

/// PostgreSQL implementation of NoteStore.
pub struct PgNoteStore {
    pool: Pool<Postgres>,
}

impl PgNoteStore {
    /// Create a new PgNoteStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_note_row(row: PgRow) -> Note {
    Note {
        id: row.get("id"),
        owner_user_id: row.get("owner_user_id"),
        title: row.get("title"),
        content: row.get("content"),
        tags: row.get("tags"),
        is_favorite: row.get("is_favorite"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note WHERE owner_user_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_note_row).collect())
    }

    async fn get(&self, id: i64, owner_id: i64) -> Result<Option<Note>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note WHERE id = $1 AND owner_user_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_note_row))
    }

    async fn create(&self, owner_id: i64, req: CreateNoteRequest) -> Result<Note> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO note (owner_user_id, title, content, tags, is_favorite, created_at, updated_at)
             VALUES ($1, $2, $3, $4, FALSE, $5, $5)
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(&req.tags)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let note = map_note_row(row);
        debug!(
            subsystem = "database",
            op = "create_note",
            note_id = note.id,
            user_id = owner_id,
            "Note created"
        );
        Ok(note)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        req: UpdateNoteRequest,
    ) -> Result<Option<Note>> {
        // $1 = now, $2 = id, $3 = owner; dynamic params start at $4
        let mut updates: Vec<String> = vec!["updated_at = $1".to_string()];
        let mut param_idx = 4;

        if req.title.is_some() {
            updates.push(format!("title = ${param_idx}"));
            param_idx += 1;
        }
        if req.content.is_some() {
            updates.push(format!("content = ${param_idx}"));
            param_idx += 1;
        }
        if req.tags.is_some() {
            updates.push(format!("tags = ${param_idx}"));
            param_idx += 1;
        }
        if req.is_favorite.is_some() {
            updates.push(format!("is_favorite = ${param_idx}"));
        }

        let query = format!(
            "UPDATE note SET {} WHERE id = $2 AND owner_user_id = $3 RETURNING {NOTE_COLUMNS}",
            updates.join(", ")
        );

        let mut q = sqlx::query(&query).bind(Utc::now()).bind(id).bind(owner_id);
        if let Some(title) = &req.title {
            q = q.bind(title);
        }
        if let Some(content) = &req.content {
            q = q.bind(content);
        }
        if let Some(tags) = &req.tags {
            q = q.bind(tags);
        }
        if let Some(is_favorite) = req.is_favorite {
            q = q.bind(is_favorite);
        }

        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_note_row))
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1 AND owner_user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, owner_id: i64, query: &str) -> Result<Vec<Note>> {
        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note
             WHERE owner_user_id = $1
               AND (title ILIKE $2 ESCAPE '\\' OR content ILIKE $2 ESCAPE '\\')
             ORDER BY updated_at DESC"
        ))
        .bind(owner_id)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            op = "search_notes",
            user_id = owner_id,
            result_count = rows.len(),
            "Search complete"
        );
        Ok(rows.into_iter().map(map_note_row).collect())
    }

    async fn list_favorites(&self, owner_id: i64) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note
             WHERE owner_user_id = $1 AND is_favorite = TRUE
             ORDER BY updated_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_note_row).collect())
    }

    async fn toggle_favorite(&self, id: i64, owner_id: i64) -> Result<Option<Note>> {
        // Single statement: the flip and the timestamp refresh are atomic.
        let row = sqlx::query(&format!(
            "UPDATE note SET is_favorite = NOT is_favorite, updated_at = $1
             WHERE id = $2 AND owner_user_id = $3
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_note_row))
    }
}
