//! crates/flame_core/src/progress.rs
//!
//! Per-user reader state: the user records themselves, one reading entry per
//! story, bookmarks, reader settings, and chapter navigation bounds.
//!
//! The tracker never owns catalog data. It references stories and chapters by
//! id and asks the `CatalogStore` whenever it needs to validate one.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::domain::{reading_entry_id, user_id, ChapterStep, ReaderSettings, ReadingEntry, User};
use crate::ports::{Clock, PortError, PortResult};

pub struct ProgressTracker {
    users: HashMap<Uuid, User>,
    clock: Arc<dyn Clock>,
    next_sequence: u64,
}

impl ProgressTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: HashMap::new(),
            clock,
            next_sequence: 0,
        }
    }

    //=====================================================================================
    // Users
    //=====================================================================================

    /// Returns the user owning `email`, creating them on first sight.
    pub fn ensure_user(&mut self, username: &str, email: &str) -> PortResult<User> {
        let email = email.trim().to_lowercase();
        let local_part = match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => local.to_string(),
            _ => {
                return Err(PortError::InvalidArgument(format!(
                    "'{}' is not a valid email address",
                    email
                )))
            }
        };

        let id = user_id(&email);
        if let Some(existing) = self.users.get(&id) {
            return Ok(existing.clone());
        }

        let username = match username.trim() {
            "" => local_part,
            name => name.to_string(),
        };
        let user = User {
            id,
            username,
            email,
            profile_image_url: None,
            joined_at: self.clock.now(),
            favorite_stories: BTreeSet::new(),
            reading_history: Vec::new(),
            settings: ReaderSettings::default(),
        };
        info!(user_id = %user.id, username = %user.username, "Registered new reader");
        self.users.insert(id, user.clone());
        Ok(user)
    }

    pub fn user(&self, user_id: Uuid) -> PortResult<&User> {
        self.users
            .get(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    fn user_mut(&mut self, user_id: Uuid) -> PortResult<&mut User> {
        self.users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    //=====================================================================================
    // Reading Progress
    //=====================================================================================

    /// Upserts the user's entry for `story_id`, pointing it at `chapter_id`.
    pub fn record_progress(
        &mut self,
        catalog: &CatalogStore,
        user_id: Uuid,
        story_id: Uuid,
        chapter_id: Uuid,
        progress: f64,
    ) -> PortResult<ReadingEntry> {
        if !(0.0..=1.0).contains(&progress) {
            return Err(PortError::InvalidArgument(format!(
                "Progress {} is outside [0, 1]",
                progress
            )));
        }
        self.user(user_id)?;
        catalog.chapter_position(story_id, chapter_id)?;

        let now = self.clock.now();
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let user = self.user_mut(user_id)?;
        let last_read_at = match user.reading_history.iter().map(|e| e.last_read_at).max() {
            Some(latest) if latest > now => latest,
            _ => now,
        };

        let entry = match user.reading_history.iter_mut().find(|e| e.story_id == story_id) {
            Some(entry) => {
                entry.chapter_id = chapter_id;
                entry.progress = progress;
                entry.last_read_at = last_read_at;
                entry.sequence = sequence;
                entry.clone()
            }
            None => {
                let entry = ReadingEntry {
                    id: reading_entry_id(user_id, story_id),
                    story_id,
                    chapter_id,
                    last_read_at,
                    progress,
                    sequence,
                };
                user.reading_history.push(entry.clone());
                entry
            }
        };
        debug!(%user_id, %story_id, %chapter_id, progress, "Recorded reading progress");
        Ok(entry)
    }

    /// One entry per story, most recently read first.
    pub fn continue_reading(&self, user_id: Uuid) -> PortResult<Vec<ReadingEntry>> {
        let user = self.user(user_id)?;
        let mut latest: HashMap<Uuid, &ReadingEntry> = HashMap::new();
        for entry in &user.reading_history {
            latest
                .entry(entry.story_id)
                .and_modify(|current| {
                    if recency(entry) > recency(*current) {
                        *current = entry;
                    }
                })
                .or_insert(entry);
        }
        let mut entries: Vec<ReadingEntry> = latest.into_values().cloned().collect();
        entries.sort_by(|a, b| recency(b).cmp(&recency(a)));
        Ok(entries)
    }

    pub fn latest_entry(&self, user_id: Uuid, story_id: Uuid) -> PortResult<Option<ReadingEntry>> {
        Ok(self
            .user(user_id)?
            .reading_history
            .iter()
            .filter(|e| e.story_id == story_id)
            .max_by_key(|e| recency(e))
            .cloned())
    }

    //=====================================================================================
    // Bookmarks and Settings
    //=====================================================================================

    /// Flips membership of `story_id` in the user's bookmarks and returns the new state.
    pub fn toggle_bookmark(&mut self, user_id: Uuid, story_id: Uuid) -> PortResult<bool> {
        let user = self.user_mut(user_id)?;
        let bookmarked = if user.favorite_stories.remove(&story_id) {
            false
        } else {
            user.favorite_stories.insert(story_id)
        };
        debug!(%user_id, %story_id, bookmarked, "Toggled bookmark");
        Ok(bookmarked)
    }

    pub fn bookmarks(&self, user_id: Uuid) -> PortResult<&BTreeSet<Uuid>> {
        Ok(&self.user(user_id)?.favorite_stories)
    }

    pub fn is_bookmarked(&self, user_id: Uuid, story_id: Uuid) -> PortResult<bool> {
        Ok(self.bookmarks(user_id)?.contains(&story_id))
    }

    pub fn settings(&self, user_id: Uuid) -> PortResult<ReaderSettings> {
        Ok(self.user(user_id)?.settings)
    }

    pub fn update_settings(
        &mut self,
        user_id: Uuid,
        settings: ReaderSettings,
    ) -> PortResult<ReaderSettings> {
        // Re-validate in case the value was assembled by hand.
        let settings = ReaderSettings::new(settings.font_size)?;
        self.user_mut(user_id)?.settings = settings;
        Ok(settings)
    }
}

fn recency(entry: &ReadingEntry) -> (chrono::DateTime<chrono::Utc>, u64) {
    (entry.last_read_at, entry.sequence)
}

//=========================================================================================
// Chapter Navigation
//=========================================================================================

fn checked_len(catalog: &CatalogStore, story_id: Uuid, current_index: usize) -> PortResult<usize> {
    let len = catalog.get_by_id(story_id)?.chapter_count();
    if current_index >= len {
        return Err(PortError::IndexOutOfRange {
            index: current_index,
            len,
        });
    }
    Ok(len)
}

/// The chapter after `current_index`, or `EndOfStory` at the last chapter.
pub fn next_chapter(
    catalog: &CatalogStore,
    story_id: Uuid,
    current_index: usize,
) -> PortResult<ChapterStep> {
    let len = checked_len(catalog, story_id, current_index)?;
    Ok(if current_index + 1 < len {
        ChapterStep::Chapter(current_index + 1)
    } else {
        ChapterStep::EndOfStory
    })
}

/// The chapter before `current_index`, or `StartOfStory` at the first chapter.
pub fn previous_chapter(
    catalog: &CatalogStore,
    story_id: Uuid,
    current_index: usize,
) -> PortResult<ChapterStep> {
    checked_len(catalog, story_id, current_index)?;
    Ok(match current_index {
        0 => ChapterStep::StartOfStory,
        i => ChapterStep::Chapter(i - 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{chapter_id, story_id};
    use crate::sample::{sample_catalog, HALF_BLOOD_PRINCE, WINTER_IS_COMING};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Mutex;

    /// A clock tests can move by hand.
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn at(t: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(t)))
        }

        fn set(&self, t: DateTime<Utc>) {
            *self.0.lock().unwrap() = t;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn setup() -> (CatalogStore, ProgressTracker, Arc<ManualClock>, Uuid) {
        let clock = ManualClock::at(t0());
        let mut tracker = ProgressTracker::new(clock.clone());
        let user = tracker.ensure_user("reader", "Reader@Example.com").unwrap();
        (sample_catalog(t0()).unwrap(), tracker, clock, user.id)
    }

    #[test]
    fn ensure_user_is_keyed_by_normalized_email() {
        let (_, mut tracker, _, id) = setup();
        let again = tracker.ensure_user("someone else", " reader@example.COM ").unwrap();
        assert_eq!(again.id, id);
        assert_eq!(again.username, "reader");

        let anon = tracker.ensure_user("", "anon@example.com").unwrap();
        assert_eq!(anon.username, "anon");
        assert!(matches!(tracker.ensure_user("x", "not-an-email"), Err(PortError::InvalidArgument(_))));
        assert!(matches!(tracker.ensure_user("x", "@example.com"), Err(PortError::InvalidArgument(_))));
    }

    #[test]
    fn record_progress_validates_arguments() {
        let (catalog, mut tracker, _, user) = setup();
        let wic = story_id(WINTER_IS_COMING);
        let hbp = story_id(HALF_BLOOD_PRINCE);

        for bad in [1.5, -0.1, f64::NAN] {
            assert!(matches!(
                tracker.record_progress(&catalog, user, wic, chapter_id(wic, 0), bad),
                Err(PortError::InvalidArgument(_))
            ));
        }
        assert!(matches!(
            tracker.record_progress(&catalog, user, wic, chapter_id(hbp, 0), 0.5),
            Err(PortError::InvalidReference(_))
        ));
        assert!(matches!(
            tracker.record_progress(&catalog, user, Uuid::nil(), chapter_id(wic, 0), 0.5),
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(
            tracker.record_progress(&catalog, Uuid::nil(), wic, chapter_id(wic, 0), 0.5),
            Err(PortError::NotFound(_))
        ));
        assert!(tracker.user(user).unwrap().reading_history.is_empty());
    }

    #[test]
    fn record_progress_upserts_one_entry_per_story() {
        let (catalog, mut tracker, clock, user) = setup();
        let wic = story_id(WINTER_IS_COMING);

        let first = tracker.record_progress(&catalog, user, wic, chapter_id(wic, 0), 0.25).unwrap();
        clock.set(t0() + Duration::minutes(5));
        let second = tracker.record_progress(&catalog, user, wic, chapter_id(wic, 1), 1.0).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.chapter_id, chapter_id(wic, 1));
        assert_eq!(second.last_read_at, t0() + Duration::minutes(5));
        let history = &tracker.user(user).unwrap().reading_history;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], second);
    }

    #[test]
    fn timestamps_never_go_backwards() {
        let (catalog, mut tracker, clock, user) = setup();
        let wic = story_id(WINTER_IS_COMING);
        let hbp = story_id(HALF_BLOOD_PRINCE);

        clock.set(t0() + Duration::hours(1));
        tracker.record_progress(&catalog, user, wic, chapter_id(wic, 0), 0.1).unwrap();
        clock.set(t0());
        let later = tracker.record_progress(&catalog, user, hbp, chapter_id(hbp, 0), 0.1).unwrap();
        assert_eq!(later.last_read_at, t0() + Duration::hours(1));
    }

    #[test]
    fn continue_reading_orders_by_recency_then_insertion() {
        let (catalog, mut tracker, _, user) = setup();
        let wic = story_id(WINTER_IS_COMING);
        let hbp = story_id(HALF_BLOOD_PRINCE);

        // Same clock reading: the later write wins the tie.
        tracker.record_progress(&catalog, user, wic, chapter_id(wic, 0), 0.3).unwrap();
        tracker.record_progress(&catalog, user, hbp, chapter_id(hbp, 1), 0.6).unwrap();
        let order: Vec<Uuid> = tracker.continue_reading(user).unwrap().iter().map(|e| e.story_id).collect();
        assert_eq!(order, vec![hbp, wic]);

        tracker.record_progress(&catalog, user, wic, chapter_id(wic, 1), 0.9).unwrap();
        let order: Vec<Uuid> = tracker.continue_reading(user).unwrap().iter().map(|e| e.story_id).collect();
        assert_eq!(order, vec![wic, hbp]);

        let latest = tracker.latest_entry(user, hbp).unwrap().unwrap();
        assert_eq!(latest.progress, 0.6);
        assert_eq!(tracker.latest_entry(user, Uuid::nil()).unwrap(), None);
    }

    #[test]
    fn toggle_bookmark_twice_restores_membership() {
        let (_, mut tracker, _, user) = setup();
        let wic = story_id(WINTER_IS_COMING);
        assert!(!tracker.is_bookmarked(user, wic).unwrap());
        assert!(tracker.toggle_bookmark(user, wic).unwrap());
        assert!(tracker.is_bookmarked(user, wic).unwrap());
        assert!(!tracker.toggle_bookmark(user, wic).unwrap());
        assert!(!tracker.is_bookmarked(user, wic).unwrap());
        assert!(matches!(tracker.toggle_bookmark(Uuid::nil(), wic), Err(PortError::NotFound(_))));
    }

    #[test]
    fn dangling_bookmarks_are_tolerated() {
        let (catalog, mut tracker, _, user) = setup();
        let gone = Uuid::new_v4();
        tracker.toggle_bookmark(user, gone).unwrap();
        tracker.toggle_bookmark(user, story_id(WINTER_IS_COMING)).unwrap();
        let resolved = catalog.resolve(tracker.bookmarks(user).unwrap());
        assert_eq!(resolved.len(), 1);
        assert!(matches!(catalog.get_by_id(gone), Err(PortError::NotFound(_))));
    }

    #[test]
    fn settings_round_trip_and_reject_out_of_range() {
        let (_, mut tracker, _, user) = setup();
        assert_eq!(tracker.settings(user).unwrap().font_size, 16);
        tracker.update_settings(user, ReaderSettings::new(20).unwrap()).unwrap();
        assert_eq!(tracker.settings(user).unwrap().font_size, 20);
        assert!(matches!(
            tracker.update_settings(user, ReaderSettings { font_size: 40 }),
            Err(PortError::InvalidArgument(_))
        ));
        assert_eq!(tracker.settings(user).unwrap().font_size, 20);
    }

    #[test]
    fn navigation_signals_story_boundaries() {
        let catalog = sample_catalog(t0()).unwrap();
        let wic = story_id(WINTER_IS_COMING);
        assert_eq!(next_chapter(&catalog, wic, 0), Ok(ChapterStep::Chapter(1)));
        assert_eq!(next_chapter(&catalog, wic, 1), Ok(ChapterStep::EndOfStory));
        assert_eq!(previous_chapter(&catalog, wic, 1), Ok(ChapterStep::Chapter(0)));
        assert_eq!(previous_chapter(&catalog, wic, 0), Ok(ChapterStep::StartOfStory));
        assert_eq!(
            next_chapter(&catalog, wic, 7),
            Err(PortError::IndexOutOfRange { index: 7, len: 2 })
        );
        assert!(matches!(previous_chapter(&catalog, Uuid::nil(), 0), Err(PortError::NotFound(_))));
    }
}
