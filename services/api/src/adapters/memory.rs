//! services/api/src/adapters/memory.rs
//!
//! The in-memory adapter: concrete implementation of the `CatalogService` and
//! `ReadingService` ports from the `core` crate, backed by the core stores.
//!
//! Locks are always taken in the order catalog, tracker, sessions.

use async_trait::async_trait;
use chrono::Duration;
use flame_core::domain::{
    AuthSession, Chapter, ChapterStep, ReaderSettings, ReadingEntry, Story, User,
};
use flame_core::ports::{CatalogService, Clock, PortError, PortResult, ReadingService};
use flame_core::query::{self, LibraryFilter};
use flame_core::{progress, CatalogStore, ProgressTracker, SessionRegistry};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Holds the catalog and every reader's state for the lifetime of the process.
pub struct MemoryLibrary {
    catalog: RwLock<CatalogStore>,
    tracker: RwLock<ProgressTracker>,
    sessions: Mutex<SessionRegistry>,
    session_ttl: Duration,
}

impl MemoryLibrary {
    pub fn new(catalog: CatalogStore, clock: Arc<dyn Clock>, session_ttl: Duration) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            tracker: RwLock::new(ProgressTracker::new(clock.clone())),
            sessions: Mutex::new(SessionRegistry::new(clock)),
            session_ttl,
        }
    }
}

//=========================================================================================
// `CatalogService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogService for MemoryLibrary {
    async fn list_all(&self) -> PortResult<Vec<Story>> {
        Ok(self.catalog.read().await.list_all().to_vec())
    }

    async fn get_by_id(&self, story_id: Uuid) -> PortResult<Story> {
        self.catalog.read().await.get_by_id(story_id).cloned()
    }

    async fn get_chapter(&self, story_id: Uuid, chapter_index: usize) -> PortResult<Chapter> {
        self.catalog
            .read()
            .await
            .get_chapter(story_id, chapter_index)
            .cloned()
    }

    async fn browse(
        &self,
        query: &str,
        filter: LibraryFilter,
        bookmarks: &BTreeSet<Uuid>,
    ) -> PortResult<Vec<Story>> {
        let catalog = self.catalog.read().await;
        let stories = query::browse(catalog.list_all(), query, filter, bookmarks)
            .into_iter()
            .cloned()
            .collect();
        Ok(stories)
    }

    async fn resolve(&self, story_ids: &BTreeSet<Uuid>) -> PortResult<Vec<Story>> {
        let catalog = self.catalog.read().await;
        let stories = catalog.resolve(story_ids).into_iter().cloned().collect();
        Ok(stories)
    }
}

//=========================================================================================
// `ReadingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReadingService for MemoryLibrary {
    async fn sign_in(&self, username: &str, email: &str) -> PortResult<(User, AuthSession)> {
        let user = self.tracker.write().await.ensure_user(username, email)?;
        let session = self.sessions.lock().await.open(user.id, self.session_ttl);
        info!(user_id = %user.id, "Reader signed in");
        Ok((user, session))
    }

    async fn validate_session(&self, session_id: &str) -> PortResult<AuthSession> {
        self.sessions.lock().await.validate(session_id)
    }

    async fn sign_out(&self, session_id: &str) -> PortResult<()> {
        self.sessions.lock().await.close(session_id)
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        self.tracker.read().await.user(user_id).cloned()
    }

    async fn record_progress(
        &self,
        user_id: Uuid,
        story_id: Uuid,
        chapter_id: Uuid,
        progress: f64,
    ) -> PortResult<ReadingEntry> {
        let catalog = self.catalog.read().await;
        self.tracker
            .write()
            .await
            .record_progress(&catalog, user_id, story_id, chapter_id, progress)
    }

    async fn continue_reading(&self, user_id: Uuid) -> PortResult<Vec<ReadingEntry>> {
        self.tracker.read().await.continue_reading(user_id)
    }

    async fn next_chapter(&self, story_id: Uuid, current_index: usize) -> PortResult<ChapterStep> {
        progress::next_chapter(&*self.catalog.read().await, story_id, current_index)
    }

    async fn previous_chapter(
        &self,
        story_id: Uuid,
        current_index: usize,
    ) -> PortResult<ChapterStep> {
        progress::previous_chapter(&*self.catalog.read().await, story_id, current_index)
    }

    /// Adding a bookmark needs the story to exist; removing one never does, so
    /// bookmarks left behind by deleted stories can still be cleared.
    async fn toggle_bookmark(&self, user_id: Uuid, story_id: Uuid) -> PortResult<bool> {
        let mut catalog = self.catalog.write().await;
        let mut tracker = self.tracker.write().await;
        let exists = catalog.get_by_id(story_id).is_ok();
        if !exists && !tracker.is_bookmarked(user_id, story_id)? {
            return Err(PortError::NotFound(format!("Story {} not found", story_id)));
        }
        let bookmarked = tracker.toggle_bookmark(user_id, story_id)?;
        if exists {
            catalog.adjust_bookmarks(story_id, bookmarked)?;
        }
        Ok(bookmarked)
    }

    async fn bookmarks(&self, user_id: Uuid) -> PortResult<BTreeSet<Uuid>> {
        self.tracker.read().await.bookmarks(user_id).cloned()
    }

    async fn reader_settings(&self, user_id: Uuid) -> PortResult<ReaderSettings> {
        self.tracker.read().await.settings(user_id)
    }

    async fn update_reader_settings(
        &self,
        user_id: Uuid,
        settings: ReaderSettings,
    ) -> PortResult<ReaderSettings> {
        self.tracker.write().await.update_settings(user_id, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flame_core::domain::{chapter_id, story_id};
    use flame_core::sample::{sample_catalog, HALF_BLOOD_PRINCE, WINTER_IS_COMING};
    use flame_core::SystemClock;

    fn library() -> MemoryLibrary {
        let catalog = sample_catalog(Utc::now()).unwrap();
        MemoryLibrary::new(catalog, Arc::new(SystemClock), Duration::days(1))
    }

    #[tokio::test]
    async fn browse_combines_search_and_filter() {
        let lib = library();
        let none = BTreeSet::new();
        let found = lib.browse("winter", LibraryFilter::All, &none).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Winter Is Coming");

        let completed = lib.browse("", LibraryFilter::Completed, &none).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].title, "The Half-Blood Prince");
    }

    #[tokio::test]
    async fn sign_in_then_validate_and_sign_out() {
        let lib = library();
        let (user, session) = lib.sign_in("ana", "ana@example.com").await.unwrap();
        assert_eq!(lib.validate_session(&session.id).await.unwrap().user_id, user.id);
        lib.sign_out(&session.id).await.unwrap();
        assert_eq!(lib.validate_session(&session.id).await, Err(PortError::Unauthorized));
    }

    #[tokio::test]
    async fn toggling_a_bookmark_moves_the_story_counter() {
        let lib = library();
        let (user, _) = lib.sign_in("ana", "ana@example.com").await.unwrap();
        let wic = story_id(WINTER_IS_COMING);
        let before = lib.get_by_id(wic).await.unwrap().bookmarks;

        assert!(lib.toggle_bookmark(user.id, wic).await.unwrap());
        assert_eq!(lib.get_by_id(wic).await.unwrap().bookmarks, before + 1);
        assert!(lib.bookmarks(user.id).await.unwrap().contains(&wic));

        assert!(!lib.toggle_bookmark(user.id, wic).await.unwrap());
        assert_eq!(lib.get_by_id(wic).await.unwrap().bookmarks, before);
        assert!(lib.bookmarks(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bookmarking_an_unknown_story_is_not_found() {
        let lib = library();
        let (user, _) = lib.sign_in("ana", "ana@example.com").await.unwrap();
        assert!(matches!(
            lib.toggle_bookmark(user.id, Uuid::new_v4()).await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn progress_and_navigation_go_through_the_catalog() {
        let lib = library();
        let (user, _) = lib.sign_in("ana", "ana@example.com").await.unwrap();
        let hbp = story_id(HALF_BLOOD_PRINCE);
        let wic = story_id(WINTER_IS_COMING);

        let entry = lib.record_progress(user.id, hbp, chapter_id(hbp, 1), 0.4).await.unwrap();
        assert_eq!(entry.story_id, hbp);
        assert!(matches!(
            lib.record_progress(user.id, hbp, chapter_id(wic, 0), 0.4).await,
            Err(PortError::InvalidReference(_))
        ));
        assert_eq!(lib.continue_reading(user.id).await.unwrap(), vec![entry]);

        assert_eq!(lib.next_chapter(wic, 0).await, Ok(ChapterStep::Chapter(1)));
        assert_eq!(lib.next_chapter(wic, 1).await, Ok(ChapterStep::EndOfStory));
        assert_eq!(lib.previous_chapter(wic, 0).await, Ok(ChapterStep::StartOfStory));
    }
}
