//! crates/flame_core/src/catalog.rs
//!
//! The catalog store: sole owner of every `Story` and `Chapter` for the
//! lifetime of the process. Reads never mutate; ingestion goes through `insert`.

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Chapter, Story};
use crate::ports::{PortError, PortResult};

#[derive(Debug, Default, Clone)]
pub struct CatalogStore {
    stories: Vec<Story>,
    by_id: HashMap<Uuid, usize>,
    chapter_owner: HashMap<Uuid, Uuid>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog by inserting every story in order.
    pub fn from_stories<I>(stories: I) -> PortResult<Self>
    where
        I: IntoIterator<Item = Story>,
    {
        let mut catalog = Self::new();
        for story in stories {
            catalog.insert(story)?;
        }
        Ok(catalog)
    }

    /// Adds a story at the end of the listing order.
    pub fn insert(&mut self, story: Story) -> PortResult<()> {
        story.check_invariants()?;
        if self.by_id.contains_key(&story.id) {
            return Err(PortError::Conflict(format!("Story {} already exists", story.id)));
        }
        let mut seen = BTreeSet::new();
        for chapter in &story.chapters {
            if !seen.insert(chapter.id) {
                return Err(PortError::Conflict(format!(
                    "Chapter {} appears twice in story {}",
                    chapter.id, story.id
                )));
            }
            if let Some(owner) = self.chapter_owner.get(&chapter.id) {
                return Err(PortError::Conflict(format!(
                    "Chapter {} already belongs to story {}",
                    chapter.id, owner
                )));
            }
        }

        for chapter in &story.chapters {
            self.chapter_owner.insert(chapter.id, story.id);
        }
        self.by_id.insert(story.id, self.stories.len());
        info!(story_id = %story.id, title = %story.title, chapters = story.chapters.len(), "Story added to catalog");
        self.stories.push(story);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn list_all(&self) -> &[Story] {
        &self.stories
    }

    pub fn get_by_id(&self, story_id: Uuid) -> PortResult<&Story> {
        self.by_id
            .get(&story_id)
            .map(|&idx| &self.stories[idx])
            .ok_or_else(|| PortError::NotFound(format!("Story {} not found", story_id)))
    }

    pub fn get_chapter(&self, story_id: Uuid, chapter_index: usize) -> PortResult<&Chapter> {
        let story = self.get_by_id(story_id)?;
        story.chapters.get(chapter_index).ok_or(PortError::IndexOutOfRange {
            index: chapter_index,
            len: story.chapters.len(),
        })
    }

    /// Position of `chapter_id` within `story_id`.
    pub fn chapter_position(&self, story_id: Uuid, chapter_id: Uuid) -> PortResult<usize> {
        let story = self.get_by_id(story_id)?;
        story.position_of(chapter_id).ok_or_else(|| {
            PortError::InvalidReference(format!(
                "Chapter {} does not belong to story {}",
                chapter_id, story_id
            ))
        })
    }

    /// Stories still in the catalog for the given ids, in catalog order.
    pub fn resolve(&self, story_ids: &BTreeSet<Uuid>) -> Vec<&Story> {
        for missing in story_ids.iter().filter(|id| !self.by_id.contains_key(id)) {
            debug!(story_id = %missing, "Skipping dangling story reference");
        }
        self.stories
            .iter()
            .filter(|s| story_ids.contains(&s.id))
            .collect()
    }

    /// Moves the public bookmark counter of a story by one, never below zero.
    pub fn adjust_bookmarks(&mut self, story_id: Uuid, added: bool) -> PortResult<u64> {
        let idx = *self
            .by_id
            .get(&story_id)
            .ok_or_else(|| PortError::NotFound(format!("Story {} not found", story_id)))?;
        let story = &mut self.stories[idx];
        story.bookmarks = if added {
            story.bookmarks.saturating_add(1)
        } else {
            story.bookmarks.saturating_sub(1)
        };
        Ok(story.bookmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{chapter_id, story_id, StoryDraft};
    use crate::sample::{sample_catalog, HALF_BLOOD_PRINCE, WINTER_IS_COMING};
    use chrono::Utc;

    fn one_chapter_story(slug: &str, chapter: Uuid) -> Story {
        let now = Utc::now();
        Story::from_draft(StoryDraft {
            id: story_id(slug),
            title: slug.to_string(),
            author: "Anon".into(),
            cover_image_url: None,
            summary: String::new(),
            tags: vec![],
            chapters: vec![Chapter::new(chapter, "Only", "just a few words", now)],
            language: "en".into(),
            is_completed: true,
            last_updated: now,
            kudos: 0,
            comments: 0,
            bookmarks: 0,
        })
    }

    #[test]
    fn list_all_keeps_insertion_order() {
        let catalog = sample_catalog(Utc::now()).unwrap();
        let titles: Vec<_> = catalog.list_all().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["The Half-Blood Prince", "Winter Is Coming"]);
        assert_eq!(catalog.list_all(), catalog.list_all());
    }

    #[test]
    fn every_story_word_count_matches_its_chapters() {
        let catalog = sample_catalog(Utc::now()).unwrap();
        for story in catalog.list_all() {
            let sum: u64 = story.chapters.iter().map(|c| u64::from(c.word_count)).sum();
            assert_eq!(story.word_count, sum);
        }
    }

    #[test]
    fn get_by_id_reports_not_found() {
        let catalog = sample_catalog(Utc::now()).unwrap();
        let story = catalog.get_by_id(story_id(WINTER_IS_COMING)).unwrap();
        assert_eq!(story.title, "Winter Is Coming");
        assert!(matches!(catalog.get_by_id(Uuid::nil()), Err(PortError::NotFound(_))));
    }

    #[test]
    fn get_chapter_checks_bounds() {
        let catalog = sample_catalog(Utc::now()).unwrap();
        let id = story_id(HALF_BLOOD_PRINCE);
        assert_eq!(catalog.get_chapter(id, 1).unwrap().title, "Spinner's End");
        assert_eq!(
            catalog.get_chapter(id, 2),
            Err(PortError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert!(matches!(catalog.get_chapter(Uuid::nil(), 0), Err(PortError::NotFound(_))));
    }

    #[test]
    fn chapter_position_rejects_foreign_chapters() {
        let catalog = sample_catalog(Utc::now()).unwrap();
        let hbp = story_id(HALF_BLOOD_PRINCE);
        let wic = story_id(WINTER_IS_COMING);
        assert_eq!(catalog.chapter_position(wic, chapter_id(wic, 1)), Ok(1));
        assert!(matches!(
            catalog.chapter_position(hbp, chapter_id(wic, 0)),
            Err(PortError::InvalidReference(_))
        ));
    }

    #[test]
    fn insert_rejects_duplicates_and_shared_chapters() {
        let mut catalog = CatalogStore::new();
        let shared = Uuid::new_v4();
        catalog.insert(one_chapter_story("first", shared)).unwrap();
        assert!(matches!(
            catalog.insert(one_chapter_story("first", Uuid::new_v4())),
            Err(PortError::Conflict(_))
        ));
        assert!(matches!(
            catalog.insert(one_chapter_story("second", shared)),
            Err(PortError::Conflict(_))
        ));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn insert_rejects_inconsistent_word_counts() {
        let mut story = one_chapter_story("broken", Uuid::new_v4());
        story.word_count += 1;
        assert!(matches!(
            CatalogStore::new().insert(story),
            Err(PortError::InvalidArgument(_))
        ));
    }

    #[test]
    fn resolve_skips_dangling_ids() {
        let catalog = sample_catalog(Utc::now()).unwrap();
        let ids: BTreeSet<Uuid> = [story_id(WINTER_IS_COMING), Uuid::new_v4()].into_iter().collect();
        let found = catalog.resolve(&ids);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Winter Is Coming");
    }

    #[test]
    fn bookmark_counter_saturates_at_zero() {
        let mut catalog = CatalogStore::from_stories([one_chapter_story("quiet", Uuid::new_v4())]).unwrap();
        let id = story_id("quiet");
        assert_eq!(catalog.adjust_bookmarks(id, false), Ok(0));
        assert_eq!(catalog.adjust_bookmarks(id, true), Ok(1));
        assert!(matches!(catalog.adjust_bookmarks(Uuid::nil(), true), Err(PortError::NotFound(_))));
    }
}
