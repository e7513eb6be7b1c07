pub mod catalog;
pub mod domain;
pub mod ports;
pub mod progress;
pub mod query;
pub mod sample;
pub mod session;

pub use catalog::CatalogStore;
pub use domain::{AuthSession, Chapter, ChapterStep, ReaderSettings, ReadingEntry, Story, StoryDraft, User};
pub use ports::{CatalogService, Clock, PortError, PortResult, ReadingService, SystemClock};
pub use progress::{next_chapter, previous_chapter, ProgressTracker};
pub use query::{browse, filter_by_status, search, LibraryFilter};
pub use session::SessionRegistry;
