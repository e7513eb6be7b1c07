//! services/api/src/adapters/seed.rs
//!
//! Loads the catalog from a JSON seed file. This stands in for the external
//! ingestion process: records are parsed with `serde` and converted into
//! domain stories, with every derived field (word counts, tag set) recomputed.

use chrono::{DateTime, Utc};
use flame_core::domain::{chapter_id, slugify, story_id, Chapter, Story, StoryDraft};
use flame_core::ports::PortError;
use flame_core::CatalogStore;
use serde::Deserialize;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed seed file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Rejected story: {0}")]
    Rejected(#[from] PortError),
}

//=========================================================================================
// "Impure" Seed Record Structs
//=========================================================================================

#[derive(Debug, Deserialize)]
struct ChapterRecord {
    id: Option<Uuid>,
    title: String,
    content: String,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct StoryRecord {
    id: Option<Uuid>,
    title: String,
    author: String,
    cover_image_url: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    chapters: Vec<ChapterRecord>,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default)]
    is_completed: bool,
    last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    kudos: u64,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    bookmarks: u64,
}

fn default_language() -> String {
    "en".to_string()
}

impl StoryRecord {
    fn to_domain(self, now: DateTime<Utc>) -> Story {
        let id = self.id.unwrap_or_else(|| story_id(&slugify(&self.title)));
        let chapters = self
            .chapters
            .into_iter()
            .enumerate()
            .map(|(pos, c)| {
                Chapter::new(
                    c.id.unwrap_or_else(|| chapter_id(id, pos)),
                    c.title,
                    c.content,
                    c.published_at.unwrap_or(now),
                )
            })
            .collect();
        Story::from_draft(StoryDraft {
            id,
            title: self.title,
            author: self.author,
            cover_image_url: self.cover_image_url,
            summary: self.summary,
            tags: self.tags,
            chapters,
            language: self.language,
            is_completed: self.is_completed,
            last_updated: self.last_updated.unwrap_or(now),
            kudos: self.kudos,
            comments: self.comments,
            bookmarks: self.bookmarks,
        })
    }
}

//=========================================================================================
// Loading
//=========================================================================================

/// Parses a JSON array of story records into a catalog, keeping file order.
pub fn parse_catalog(json: &str, now: DateTime<Utc>) -> Result<CatalogStore, SeedError> {
    let records: Vec<StoryRecord> = serde_json::from_str(json)?;
    let catalog = CatalogStore::from_stories(records.into_iter().map(|r| r.to_domain(now)))?;
    Ok(catalog)
}

pub fn load_catalog(path: &Path) -> Result<CatalogStore, SeedError> {
    let json = std::fs::read_to_string(path)?;
    let catalog = parse_catalog(&json, Utc::now())?;
    info!("Loaded {} stories from {}", catalog.len(), path.display());
    Ok(catalog)
}
