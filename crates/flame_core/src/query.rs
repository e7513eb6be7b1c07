//! crates/flame_core/src/query.rs
//!
//! Pure, order-preserving filters over story sequences. Nothing here mutates
//! its input; the output is always a subsequence of the input.

use caseless::default_case_fold_str;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::Story;
use crate::ports::PortError;

/// The Library screen's filter chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LibraryFilter {
    #[default]
    All,
    Reading,
    Completed,
    Bookmarked,
}

impl LibraryFilter {
    pub const ALL: [LibraryFilter; 4] = [
        LibraryFilter::All,
        LibraryFilter::Reading,
        LibraryFilter::Completed,
        LibraryFilter::Bookmarked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LibraryFilter::All => "all",
            LibraryFilter::Reading => "reading",
            LibraryFilter::Completed => "completed",
            LibraryFilter::Bookmarked => "bookmarked",
        }
    }
}

impl fmt::Display for LibraryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LibraryFilter {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LibraryFilter::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PortError::InvalidArgument(format!("Unknown library filter '{}'", s)))
    }
}

/// Stories whose title, author or any tag contains `query` after Unicode
/// default case folding on both sides. An empty query returns the input unchanged.
pub fn search<'a, I>(stories: I, query: &str) -> Vec<&'a Story>
where
    I: IntoIterator<Item = &'a Story>,
{
    if query.is_empty() {
        return stories.into_iter().collect();
    }
    let needle = default_case_fold_str(query);
    let contains = |haystack: &str| default_case_fold_str(haystack).contains(&needle);
    stories
        .into_iter()
        .filter(|s| contains(&s.title) || contains(&s.author) || s.tags.iter().any(|t| contains(t)))
        .collect()
}

/// Applies a library filter; `Bookmarked` keeps stories present in `bookmarks`.
pub fn filter_by_status<'a, I>(
    stories: I,
    filter: LibraryFilter,
    bookmarks: &BTreeSet<Uuid>,
) -> Vec<&'a Story>
where
    I: IntoIterator<Item = &'a Story>,
{
    let stories = stories.into_iter();
    match filter {
        LibraryFilter::All => stories.collect(),
        LibraryFilter::Reading => stories.filter(|s| !s.is_completed).collect(),
        LibraryFilter::Completed => stories.filter(|s| s.is_completed).collect(),
        LibraryFilter::Bookmarked => stories.filter(|s| bookmarks.contains(&s.id)).collect(),
    }
}

pub fn browse<'a, I>(
    stories: I,
    query: &str,
    filter: LibraryFilter,
    bookmarks: &BTreeSet<Uuid>,
) -> Vec<&'a Story>
where
    I: IntoIterator<Item = &'a Story>,
{
    filter_by_status(search(stories, query), filter, bookmarks)
}
