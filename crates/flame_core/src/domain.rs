//! crates/flame_core/src/domain.rs
//!
//! Defines the pure, core data structures for the reader.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::ports::{PortError, PortResult};

/// Namespace used to derive deterministic identifiers.
pub const FLAME_NAMESPACE: Uuid = Uuid::from_u128(0x6f1a_3c2e_9b4d_5e70_8a21_c4d3_f09e_b7a5);

/// Smallest and largest font size accepted by the reader.
pub const MIN_FONT_SIZE: u8 = 12;
pub const MAX_FONT_SIZE: u8 = 24;
pub const DEFAULT_FONT_SIZE: u8 = 16;

//=========================================================================================
// Deterministic Identifiers
//=========================================================================================

pub fn story_id(slug: &str) -> Uuid {
    Uuid::new_v5(&FLAME_NAMESPACE, format!("story:{slug}").as_bytes())
}

pub fn chapter_id(story_id: Uuid, position: usize) -> Uuid {
    Uuid::new_v5(&FLAME_NAMESPACE, format!("chapter:{story_id}:{position}").as_bytes())
}

/// Users are keyed by their normalized email.
pub fn user_id(email: &str) -> Uuid {
    Uuid::new_v5(&FLAME_NAMESPACE, format!("user:{email}").as_bytes())
}

pub fn reading_entry_id(user_id: Uuid, story_id: Uuid) -> Uuid {
    Uuid::new_v5(&FLAME_NAMESPACE, format!("reading:{user_id}:{story_id}").as_bytes())
}

/// Turns a title into a lowercase, dash-separated slug.
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Counts words as maximal runs of non-whitespace characters.
pub fn count_words(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

/// Trims tags, drops empty ones and removes exact duplicates, keeping first occurrence.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

//=========================================================================================
// Catalog Entities
//=========================================================================================

/// A titled unit of story content.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub word_count: u32,
    pub published_at: DateTime<Utc>,
}

impl Chapter {
    /// Builds a chapter, deriving its word count from the body text.
    pub fn new(
        id: Uuid,
        title: impl Into<String>,
        content: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        let content = content.into();
        Self {
            id,
            title: title.into(),
            word_count: count_words(&content),
            content,
            published_at,
        }
    }

    pub fn check_invariants(&self) -> PortResult<()> {
        let expected = count_words(&self.content);
        if self.word_count != expected {
            return Err(PortError::InvalidArgument(format!(
                "Chapter {} declares {} words but its body has {}",
                self.id, self.word_count, expected
            )));
        }
        Ok(())
    }
}

/// Everything needed to assemble a `Story`; derived fields are computed by `Story::from_draft`.
#[derive(Debug, Clone)]
pub struct StoryDraft {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub cover_image_url: Option<String>,
    pub summary: String,
    pub tags: Vec<String>,
    pub chapters: Vec<Chapter>,
    pub language: String,
    pub is_completed: bool,
    pub last_updated: DateTime<Utc>,
    pub kudos: u64,
    pub comments: u64,
    pub bookmarks: u64,
}

/// A fiction work composed of ordered chapters.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub cover_image_url: Option<String>,
    pub summary: String,
    pub tags: Vec<String>,
    pub chapters: Vec<Chapter>,
    /// Always the sum of the chapter word counts.
    pub word_count: u64,
    pub language: String,
    pub is_completed: bool,
    pub last_updated: DateTime<Utc>,
    pub kudos: u64,
    pub comments: u64,
    pub bookmarks: u64,
}

impl Story {
    pub fn from_draft(draft: StoryDraft) -> Self {
        let word_count = draft.chapters.iter().map(|c| u64::from(c.word_count)).sum();
        Self {
            id: draft.id,
            title: draft.title,
            author: draft.author,
            cover_image_url: draft.cover_image_url,
            summary: draft.summary,
            tags: normalize_tags(&draft.tags),
            chapters: draft.chapters,
            word_count,
            language: draft.language,
            is_completed: draft.is_completed,
            last_updated: draft.last_updated,
            kudos: draft.kudos,
            comments: draft.comments,
            bookmarks: draft.bookmarks,
        }
    }

    pub fn check_invariants(&self) -> PortResult<()> {
        for chapter in &self.chapters {
            chapter.check_invariants()?;
        }
        let total: u64 = self.chapters.iter().map(|c| u64::from(c.word_count)).sum();
        if self.word_count != total {
            return Err(PortError::InvalidArgument(format!(
                "Story {} declares {} words but its chapters sum to {}",
                self.id, self.word_count, total
            )));
        }
        if normalize_tags(&self.tags) != self.tags {
            return Err(PortError::InvalidArgument(format!(
                "Story {} has blank or duplicate tags",
                self.id
            )));
        }
        Ok(())
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn position_of(&self, chapter_id: Uuid) -> Option<usize> {
        self.chapters.iter().position(|c| c.id == chapter_id)
    }
}

//=========================================================================================
// Reader State
//=========================================================================================

/// A user's last-read position within a story.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingEntry {
    pub id: Uuid,
    pub story_id: Uuid,
    pub chapter_id: Uuid,
    pub last_read_at: DateTime<Utc>,
    /// Fraction of the chapter read, in `[0.0, 1.0]`.
    pub progress: f64,
    /// Upsert order, breaks timestamp ties.
    pub sequence: u64,
}

/// Per-user reader preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderSettings {
    pub font_size: u8,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl ReaderSettings {
    pub fn new(font_size: u8) -> PortResult<Self> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&font_size) {
            return Err(PortError::InvalidArgument(format!(
                "Font size {} is outside {}..={}",
                font_size, MIN_FONT_SIZE, MAX_FONT_SIZE
            )));
        }
        Ok(Self { font_size })
    }
}

// Represents a reader - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub joined_at: DateTime<Utc>,
    /// Bookmarked stories. Weak references: ids may outlive their story.
    pub favorite_stories: BTreeSet<Uuid>,
    pub reading_history: Vec<ReadingEntry>,
    pub settings: ReaderSettings,
}

// Represents a signed-in reader (auth cookie)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a chapter navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterStep {
    Chapter(usize),
    EndOfStory,
    StartOfStory,
}
