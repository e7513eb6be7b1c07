//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::adapters::seed::SeedError;
use crate::config::ConfigError;
use flame_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a failure to load the catalog seed file.
    #[error("Catalog seed error: {0}")]
    Seed(#[from] SeedError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
