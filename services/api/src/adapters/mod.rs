pub mod memory;
pub mod seed;

pub use memory::MemoryLibrary;
pub use seed::{load_catalog, parse_catalog, SeedError};
