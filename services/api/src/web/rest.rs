//! services/api/src/web/rest.rs
//!
//! Contains the public catalog endpoints and the master definition for the
//! OpenAPI specification.

use crate::web::{auth, middleware::current_session, protocol::*, reader, state::AppState};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use flame_core::ports::PortError;
use flame_core::query::LibraryFilter;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signin_handler,
        auth::signout_handler,
        list_stories_handler,
        get_story_handler,
        get_chapter_handler,
        next_chapter_handler,
        previous_chapter_handler,
        reader::record_progress_handler,
        reader::toggle_bookmark_handler,
        reader::me_handler,
        reader::bookmarks_handler,
        reader::continue_reading_handler,
        reader::get_settings_handler,
        reader::put_settings_handler,
    ),
    components(
        schemas(
            auth::SignInRequest,
            auth::AuthResponse,
            StorySummary,
            StoryDetail,
            ChapterSummary,
            ChapterView,
            NavigationResponse,
            ProgressRequest,
            ReadingEntryResponse,
            BookmarkResponse,
            UserResponse,
            SettingsBody,
        )
    ),
    tags(
        (name = "Flame API", description = "Browse, search and read user-submitted fiction.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

pub fn port_status(e: &PortError) -> StatusCode {
    match e {
        PortError::NotFound(_) | PortError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
        PortError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        PortError::InvalidReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PortError::Conflict(_) => StatusCode::CONFLICT,
        PortError::Unauthorized => StatusCode::UNAUTHORIZED,
    }
}

/// Converts a port error into the `(status, message)` pair handlers return.
pub fn port_failure(e: PortError) -> (StatusCode, String) {
    let status = port_status(&e);
    debug!(%status, "Request rejected: {}", e);
    (status, e.to_string())
}

//=========================================================================================
// Catalog Handlers
//=========================================================================================

/// List stories, optionally searched and filtered.
///
/// The `bookmarked` filter needs a signed-in reader.
#[utoipa::path(
    get,
    path = "/stories",
    params(StoriesQuery),
    responses(
        (status = 200, description = "Matching stories in catalog order", body = [StorySummary]),
        (status = 400, description = "Unknown filter"),
        (status = 401, description = "Bookmarked filter without a session")
    )
)]
pub async fn list_stories_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<StoriesQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let filter = match params.filter.as_deref() {
        Some(raw) => raw.parse::<LibraryFilter>().map_err(port_failure)?,
        None => LibraryFilter::All,
    };

    let bookmarks = if filter == LibraryFilter::Bookmarked {
        let session = current_session(&state, &headers).await.ok_or((
            StatusCode::UNAUTHORIZED,
            "Sign in to see bookmarked stories".to_string(),
        ))?;
        state
            .reading
            .bookmarks(session.user_id)
            .await
            .map_err(port_failure)?
    } else {
        BTreeSet::new()
    };

    let query = params.q.unwrap_or_default();
    let stories = state
        .catalog
        .browse(&query, filter, &bookmarks)
        .await
        .map_err(port_failure)?;
    let body: Vec<StorySummary> = stories.iter().map(StorySummary::from).collect();
    Ok(Json(body))
}

/// Fetch one story with its chapter list.
#[utoipa::path(
    get,
    path = "/stories/{story_id}",
    params(("story_id" = Uuid, Path, description = "Story identifier")),
    responses(
        (status = 200, description = "The story", body = StoryDetail),
        (status = 404, description = "Unknown story")
    )
)]
pub async fn get_story_handler(
    State(state): State<Arc<AppState>>,
    Path(story_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let story = state.catalog.get_by_id(story_id).await.map_err(port_failure)?;
    Ok(Json(StoryDetail::from(&story)))
}

/// Fetch one chapter for the reader.
#[utoipa::path(
    get,
    path = "/stories/{story_id}/chapters/{index}",
    params(
        ("story_id" = Uuid, Path, description = "Story identifier"),
        ("index" = usize, Path, description = "Zero-based chapter index")
    ),
    responses(
        (status = 200, description = "The chapter", body = ChapterView),
        (status = 404, description = "Unknown story or chapter index out of range")
    )
)]
pub async fn get_chapter_handler(
    State(state): State<Arc<AppState>>,
    Path((story_id, index)): Path<(Uuid, usize)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let story = state.catalog.get_by_id(story_id).await.map_err(port_failure)?;
    let chapter = state
        .catalog
        .get_chapter(story_id, index)
        .await
        .map_err(port_failure)?;
    Ok(Json(ChapterView::new(story_id, index, story.chapter_count(), chapter)))
}

/// Index of the chapter after `index`, or `end_of_story`.
#[utoipa::path(
    get,
    path = "/stories/{story_id}/chapters/{index}/next",
    params(
        ("story_id" = Uuid, Path, description = "Story identifier"),
        ("index" = usize, Path, description = "Current chapter index")
    ),
    responses(
        (status = 200, description = "Where to go next", body = NavigationResponse),
        (status = 404, description = "Unknown story or chapter index out of range")
    )
)]
pub async fn next_chapter_handler(
    State(state): State<Arc<AppState>>,
    Path((story_id, index)): Path<(Uuid, usize)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let step = state
        .reading
        .next_chapter(story_id, index)
        .await
        .map_err(port_failure)?;
    Ok(Json(NavigationResponse::from(step)))
}

/// Index of the chapter before `index`, or `start_of_story`.
#[utoipa::path(
    get,
    path = "/stories/{story_id}/chapters/{index}/previous",
    params(
        ("story_id" = Uuid, Path, description = "Story identifier"),
        ("index" = usize, Path, description = "Current chapter index")
    ),
    responses(
        (status = 200, description = "Where to go back to", body = NavigationResponse),
        (status = 404, description = "Unknown story or chapter index out of range")
    )
)]
pub async fn previous_chapter_handler(
    State(state): State<Arc<AppState>>,
    Path((story_id, index)): Path<(Uuid, usize)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let step = state
        .reading
        .previous_chapter(story_id, index)
        .await
        .map_err(port_failure)?;
    Ok(Json(NavigationResponse::from(step)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_status_codes() {
        assert_eq!(port_status(&PortError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            port_status(&PortError::IndexOutOfRange { index: 3, len: 2 }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(port_status(&PortError::InvalidArgument("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            port_status(&PortError::InvalidReference("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(port_status(&PortError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(port_status(&PortError::Unauthorized), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn openapi_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/signin",
            "/stories",
            "/stories/{story_id}/chapters/{index}/next",
            "/progress",
            "/me/settings",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
