//! crates/flame_core/src/sample.rs
//!
//! The built-in sample catalog served when no seed file is configured.

use chrono::{DateTime, Utc};

use crate::catalog::CatalogStore;
use crate::domain::{chapter_id, story_id, Chapter, Story, StoryDraft};
use crate::ports::PortResult;

pub const HALF_BLOOD_PRINCE: &str = "the-half-blood-prince";
pub const WINTER_IS_COMING: &str = "winter-is-coming";

struct SampleStory {
    slug: &'static str,
    title: &'static str,
    author: &'static str,
    summary: &'static str,
    tags: [&'static str; 4],
    chapters: [(&'static str, &'static str); 2],
    is_completed: bool,
    counters: (u64, u64, u64),
}

const SAMPLES: [SampleStory; 2] = [
    SampleStory {
        slug: HALF_BLOOD_PRINCE,
        title: "The Half-Blood Prince",
        author: "J.K. Rowling",
        summary: "Harry Potter returns for his sixth year at Hogwarts...",
        tags: ["Harry Potter", "Adventure", "Magic", "Friendship"],
        chapters: [
            (
                "The Other Minister",
                "It was nearing midnight and the Prime Minister was sitting alone in his office.",
            ),
            (
                "Spinner's End",
                "Many miles away the chilly mist that had pressed against the windows drifted over a dirty river.",
            ),
        ],
        is_completed: true,
        counters: (2847, 892, 1205),
    },
    SampleStory {
        slug: WINTER_IS_COMING,
        title: "Winter Is Coming",
        author: "George R.R. Martin",
        summary: "In the frozen lands beyond the Wall...",
        tags: ["Game of Thrones", "Fantasy", "Drama", "Politics"],
        chapters: [
            (
                "Bran",
                "The morning had dawned clear and cold, with a crispness that hinted at the end of summer.",
            ),
            (
                "Catelyn",
                "Catelyn had never liked this godswood.",
            ),
        ],
        is_completed: false,
        counters: (5692, 1547, 2893),
    },
];

/// Builds the two-story sample catalog; every chapter is stamped with `published_at`.
pub fn sample_catalog(published_at: DateTime<Utc>) -> PortResult<CatalogStore> {
    let mut catalog = CatalogStore::new();
    for sample in &SAMPLES {
        let id = story_id(sample.slug);
        let chapters = sample
            .chapters
            .iter()
            .enumerate()
            .map(|(pos, (title, body))| Chapter::new(chapter_id(id, pos), *title, *body, published_at))
            .collect();
        let (kudos, comments, bookmarks) = sample.counters;
        let story = Story::from_draft(StoryDraft {
            id,
            title: sample.title.to_string(),
            author: sample.author.to_string(),
            cover_image_url: None,
            summary: sample.summary.to_string(),
            tags: sample.tags.iter().map(|t| t.to_string()).collect(),
            chapters,
            language: "en".to_string(),
            is_completed: sample.is_completed,
            last_updated: published_at,
            kudos,
            comments,
            bookmarks,
        });
        catalog.insert(story)?;
    }
    Ok(catalog)
}
