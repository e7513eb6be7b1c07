pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod reader;
pub mod rest;
pub mod state;

// Re-export the handlers so the router can be assembled in one place.
pub use auth::{signin_handler, signout_handler};
pub use middleware::require_auth;
pub use reader::{
    bookmarks_handler, continue_reading_handler, get_settings_handler, me_handler,
    put_settings_handler, record_progress_handler, toggle_bookmark_handler,
};
pub use rest::{
    get_chapter_handler, get_story_handler, list_stories_handler, next_chapter_handler,
    previous_chapter_handler,
};
