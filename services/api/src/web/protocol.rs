//! services/api/src/web/protocol.rs
//!
//! Request and response payloads exchanged between the reader app and the API.
//! Domain types stay serialization-free; everything on the wire lives here.

use chrono::{DateTime, Utc};
use flame_core::domain::{Chapter, ChapterStep, ReaderSettings, ReadingEntry, Story, User};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Payloads Sent FROM the Client TO the Server
//=========================================================================================

/// Query string of `GET /stories`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StoriesQuery {
    /// Case-insensitive text matched against title, author and tags.
    pub q: Option<String>,
    /// One of `all`, `reading`, `completed`, `bookmarked`.
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProgressRequest {
    pub story_id: Uuid,
    pub chapter_id: Uuid,
    /// Fraction of the chapter read, in `[0.0, 1.0]`.
    pub progress: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingsBody {
    pub font_size: u8,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct StorySummary {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub cover_image_url: Option<String>,
    pub summary: String,
    pub tags: Vec<String>,
    pub chapter_count: usize,
    pub word_count: u64,
    pub language: String,
    pub is_completed: bool,
    pub last_updated: DateTime<Utc>,
    pub kudos: u64,
    pub comments: u64,
    pub bookmarks: u64,
}

impl From<&Story> for StorySummary {
    fn from(story: &Story) -> Self {
        Self {
            id: story.id,
            title: story.title.clone(),
            author: story.author.clone(),
            cover_image_url: story.cover_image_url.clone(),
            summary: story.summary.clone(),
            tags: story.tags.clone(),
            chapter_count: story.chapter_count(),
            word_count: story.word_count,
            language: story.language.clone(),
            is_completed: story.is_completed,
            last_updated: story.last_updated,
            kudos: story.kudos,
            comments: story.comments,
            bookmarks: story.bookmarks,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChapterSummary {
    pub index: usize,
    pub id: Uuid,
    pub title: String,
    pub word_count: u32,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoryDetail {
    #[serde(flatten)]
    pub story: StorySummary,
    pub chapters: Vec<ChapterSummary>,
}

impl From<&Story> for StoryDetail {
    fn from(story: &Story) -> Self {
        let chapters = story
            .chapters
            .iter()
            .enumerate()
            .map(|(index, c)| ChapterSummary {
                index,
                id: c.id,
                title: c.title.clone(),
                word_count: c.word_count,
                published_at: c.published_at,
            })
            .collect();
        Self {
            story: story.into(),
            chapters,
        }
    }
}

/// A chapter as shown in the reader, with the state of its navigation buttons.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChapterView {
    pub story_id: Uuid,
    pub index: usize,
    pub chapter_count: usize,
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub word_count: u32,
    pub published_at: DateTime<Utc>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl ChapterView {
    pub fn new(story_id: Uuid, index: usize, chapter_count: usize, chapter: Chapter) -> Self {
        Self {
            story_id,
            index,
            chapter_count,
            id: chapter.id,
            title: chapter.title,
            content: chapter.content,
            word_count: chapter.word_count,
            published_at: chapter.published_at,
            has_previous: index > 0,
            has_next: index + 1 < chapter_count,
        }
    }
}

/// Result of a next/previous request; the boundary variants are not errors.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum NavigationResponse {
    Chapter { index: usize },
    EndOfStory,
    StartOfStory,
}

impl From<ChapterStep> for NavigationResponse {
    fn from(step: ChapterStep) -> Self {
        match step {
            ChapterStep::Chapter(index) => NavigationResponse::Chapter { index },
            ChapterStep::EndOfStory => NavigationResponse::EndOfStory,
            ChapterStep::StartOfStory => NavigationResponse::StartOfStory,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadingEntryResponse {
    pub id: Uuid,
    pub story_id: Uuid,
    pub chapter_id: Uuid,
    pub last_read_at: DateTime<Utc>,
    pub progress: f64,
}

impl From<ReadingEntry> for ReadingEntryResponse {
    fn from(entry: ReadingEntry) -> Self {
        Self {
            id: entry.id,
            story_id: entry.story_id,
            chapter_id: entry.chapter_id,
            last_read_at: entry.last_read_at,
            progress: entry.progress,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookmarkResponse {
    pub story_id: Uuid,
    pub bookmarked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub bookmark_count: usize,
    pub stories_started: usize,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            profile_image_url: user.profile_image_url,
            joined_at: user.joined_at,
            bookmark_count: user.favorite_stories.len(),
            stories_started: user.reading_history.len(),
        }
    }
}

impl From<ReaderSettings> for SettingsBody {
    fn from(settings: ReaderSettings) -> Self {
        Self {
            font_size: settings.font_size,
        }
    }
}
