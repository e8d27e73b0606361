//! Candidate item provider port
//!
//! Read-only snapshot of the items behind a session's source lists.

use async_trait::async_trait;
use decider_domain::{CandidateItem, ItemId};
use thiserror::Error;

/// Errors that can occur when reading the candidate catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CandidateProvider: Send + Sync {
    /// Look up items by id.
    ///
    /// Ids the catalog does not know are left out of the result; callers
    /// decide whether that is an error. Order follows `ids`.
    async fn items(&self, ids: &[ItemId]) -> Result<Vec<CandidateItem>, CatalogError>;
}
