//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use flame_core::ports::{CatalogService, ReadingService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogService>,
    pub reading: Arc<dyn ReadingService>,
    pub config: Arc<Config>,
}
