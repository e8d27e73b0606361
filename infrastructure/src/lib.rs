//! Infrastructure layer for decider
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: session storage, the candidate catalog, event logging
//! and configuration file loading.

pub mod catalog;
pub mod config;
pub mod logging;
pub mod persistence;

// Re-export commonly used types
pub use catalog::{ActivityRecord, CatalogFile, FileCatalog};
pub use config::{
    ConfigLoader, FileConfig, FileLoggingConfig, FileStorageConfig, FilterFileError,
    load_filter_configuration,
};
pub use logging::JsonlSessionEventLogger;
pub use persistence::{InMemorySessionRepository, JsonFileSessionRepository};
