//! services/api/src/web/reader.rs
//!
//! Endpoints that act on behalf of the signed-in reader. Every handler here
//! sits behind `require_auth` and receives the caller's `AuthSession`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use flame_core::domain::{AuthSession, ReaderSettings};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::web::protocol::*;
use crate::web::rest::port_failure;
use crate::web::state::AppState;

/// Record how far the reader got in a chapter.
#[utoipa::path(
    put,
    path = "/progress",
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "The reader's entry for this story", body = ReadingEntryResponse),
        (status = 400, description = "Progress outside [0, 1]"),
        (status = 404, description = "Unknown story"),
        (status = 422, description = "Chapter does not belong to the story")
    )
)]
pub async fn record_progress_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<ProgressRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entry = state
        .reading
        .record_progress(session.user_id, req.story_id, req.chapter_id, req.progress)
        .await
        .map_err(port_failure)?;
    Ok(Json(ReadingEntryResponse::from(entry)))
}

/// Flip the bookmark on a story.
#[utoipa::path(
    post,
    path = "/stories/{story_id}/bookmark",
    params(("story_id" = Uuid, Path, description = "Story identifier")),
    responses(
        (status = 200, description = "The new bookmark state", body = BookmarkResponse),
        (status = 404, description = "Unknown story")
    )
)]
pub async fn toggle_bookmark_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(story_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let bookmarked = state
        .reading
        .toggle_bookmark(session.user_id, story_id)
        .await
        .map_err(port_failure)?;
    info!(user_id = %session.user_id, %story_id, bookmarked, "Bookmark toggled");
    Ok(Json(BookmarkResponse {
        story_id,
        bookmarked,
    }))
}

/// The signed-in reader's profile.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = UserResponse))
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = state
        .reading
        .get_user(session.user_id)
        .await
        .map_err(port_failure)?;
    Ok(Json(UserResponse::from(user)))
}

/// Bookmarked stories still in the catalog.
#[utoipa::path(
    get,
    path = "/me/bookmarks",
    responses((status = 200, description = "Bookmarked stories", body = [StorySummary]))
)]
pub async fn bookmarks_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let ids = state
        .reading
        .bookmarks(session.user_id)
        .await
        .map_err(port_failure)?;
    let stories = state.catalog.resolve(&ids).await.map_err(port_failure)?;
    let body: Vec<StorySummary> = stories.iter().map(StorySummary::from).collect();
    Ok(Json(body))
}

/// One entry per story, most recently read first.
#[utoipa::path(
    get,
    path = "/me/continue-reading",
    responses((status = 200, description = "Reading entries", body = [ReadingEntryResponse]))
)]
pub async fn continue_reading_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entries = state
        .reading
        .continue_reading(session.user_id)
        .await
        .map_err(port_failure)?;
    let body: Vec<ReadingEntryResponse> = entries.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/me/settings",
    responses((status = 200, description = "Reader settings", body = SettingsBody))
)]
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let settings = state
        .reading
        .reader_settings(session.user_id)
        .await
        .map_err(port_failure)?;
    Ok(Json(SettingsBody::from(settings)))
}

#[utoipa::path(
    put,
    path = "/me/settings",
    request_body = SettingsBody,
    responses(
        (status = 200, description = "Updated settings", body = SettingsBody),
        (status = 400, description = "Font size outside 12..=24")
    )
)]
pub async fn put_settings_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<SettingsBody>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let settings = ReaderSettings::new(req.font_size).map_err(port_failure)?;
    let saved = state
        .reading
        .update_reader_settings(session.user_id, settings)
        .await
        .map_err(port_failure)?;
    Ok(Json(SettingsBody::from(saved)))
}
