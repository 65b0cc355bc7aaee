//! Note endpoints.
//!
//! Every handler resolves identity through the `AuthUser` extractor, makes
//! exactly one store call scoped by the resolved user id, and maps the
//! result to a status code. No handler trusts a client-supplied owner.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use notewell_core::{defaults, CreateNoteRequest, Note, UpdateNoteRequest};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NotesQuery {
    /// Substring to search for in title or content.
    pub search: Option<String>,
    /// "true" restricts the listing to favorites.
    pub favorites: Option<String>,
}

/// GET /api/notes — list, search, or list favorites.
///
/// `search` takes precedence over `favorites` when both are supplied.
pub async fn list_notes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<NotesQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        state.storage.notes.search(user_id, search).await?
    } else if query.favorites.as_deref() == Some("true") {
        state.storage.notes.list_favorites(user_id).await?
    } else {
        state.storage.notes.list_by_owner(user_id).await?
    };

    Ok(Json(notes))
}

/// GET /api/notes/:id
pub async fn get_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Note>, ApiError> {
    let note = state
        .storage
        .notes
        .get(id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(note))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateNoteBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// POST /api/notes
pub async fn create_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let req = CreateNoteRequest {
        title: body
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| defaults::NOTE_TITLE.to_string()),
        content: body.content.unwrap_or_default(),
        tags: body.tags,
    };

    let note = state.storage.notes.create(user_id, req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateNoteBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
}

/// PATCH/PUT /api/notes/:id
pub async fn update_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateNoteBody>,
) -> Result<Json<Note>, ApiError> {
    let req = UpdateNoteRequest {
        title: body.title,
        content: body.content,
        tags: body.tags,
        is_favorite: body.is_favorite,
    };

    let note = state
        .storage
        .notes
        .update(id, user_id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(note))
}

/// DELETE /api/notes/:id
pub async fn delete_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state.storage.notes.delete(id, user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Note not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "message": "Note deleted successfully"
    })))
}

/// PATCH/POST /api/notes/:id/favorite
pub async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Note>, ApiError> {
    let note = state
        .storage
        .notes
        .toggle_favorite(id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(note))
}
