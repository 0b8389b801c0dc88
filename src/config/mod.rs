//! Configuration loading and management for the statistics engine.
//!
//! This module provides functionality to load engine configuration from YAML
//! files: cache and comparison settings, shift counting rule eras, and the
//! per-region holiday tables.
//!
//! # Example
//!
//! ```no_run
//! use workforce_stats::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config").unwrap();
//! println!("Loaded {} holiday tables", loader.config().holidays.len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CacheSettings, ComparisonSettings, EngineConfig, EngineSettings, HolidayTable,
};
