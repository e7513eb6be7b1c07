//! crates/flame_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the reader's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of where stories and reader state actually live.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::domain::{
    AuthSession, Chapter, ChapterStep, ReaderSettings, ReadingEntry, Story, User,
};
use crate::query::LibraryFilter;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// Every variant is local and recoverable; none is fatal to the process.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Chapter index {index} is out of range for a story with {len} chapters")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Clock
//=========================================================================================

/// Source of the current time, injectable so timestamps are reproducible in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// All stories in insertion order.
    async fn list_all(&self) -> PortResult<Vec<Story>>;

    async fn get_by_id(&self, story_id: Uuid) -> PortResult<Story>;

    async fn get_chapter(&self, story_id: Uuid, chapter_index: usize) -> PortResult<Chapter>;

    /// Search then filter, as used by the Discover and Library screens.
    async fn browse(
        &self,
        query: &str,
        filter: LibraryFilter,
        bookmarks: &BTreeSet<Uuid>,
    ) -> PortResult<Vec<Story>>;

    /// Stories still present for the given ids; dangling ids are skipped.
    async fn resolve(&self, story_ids: &BTreeSet<Uuid>) -> PortResult<Vec<Story>>;
}

#[async_trait]
pub trait ReadingService: Send + Sync {
    // --- Sessions ---
    async fn sign_in(&self, username: &str, email: &str) -> PortResult<(User, AuthSession)>;

    async fn validate_session(&self, session_id: &str) -> PortResult<AuthSession>;

    async fn sign_out(&self, session_id: &str) -> PortResult<()>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    // --- Progress ---
    async fn record_progress(
        &self,
        user_id: Uuid,
        story_id: Uuid,
        chapter_id: Uuid,
        progress: f64,
    ) -> PortResult<ReadingEntry>;

    async fn continue_reading(&self, user_id: Uuid) -> PortResult<Vec<ReadingEntry>>;

    // --- Navigation ---
    async fn next_chapter(&self, story_id: Uuid, current_index: usize) -> PortResult<ChapterStep>;

    async fn previous_chapter(
        &self,
        story_id: Uuid,
        current_index: usize,
    ) -> PortResult<ChapterStep>;

    // --- Bookmarks and Settings ---
    async fn toggle_bookmark(&self, user_id: Uuid, story_id: Uuid) -> PortResult<bool>;

    async fn bookmarks(&self, user_id: Uuid) -> PortResult<BTreeSet<Uuid>>;

    async fn reader_settings(&self, user_id: Uuid) -> PortResult<ReaderSettings>;

    async fn update_reader_settings(
        &self,
        user_id: Uuid,
        settings: ReaderSettings,
    ) -> PortResult<ReaderSettings>;
}
