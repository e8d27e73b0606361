//! Use case errors

use crate::ports::activity_provider::ActivityError;
use crate::ports::candidate_provider::CatalogError;
use crate::ports::session_repository::RepositoryError;
use decider_domain::{DomainError, SessionId};
use thiserror::Error;

/// Errors returned by the session use cases
#[derive(Error, Debug)]
pub enum SessionServiceError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Activity error: {0}")]
    Activity(#[from] ActivityError),
}

impl SessionServiceError {
    /// The domain error behind this failure, if any.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            SessionServiceError::Domain(e) => Some(e),
            _ => None,
        }
    }
}
