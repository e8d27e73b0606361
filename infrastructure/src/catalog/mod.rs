//! Candidate catalog adapters

mod file_catalog;

pub use file_catalog::{ActivityRecord, CatalogFile, FileCatalog};
