//! Session repository port
//!
//! Persistence of [`DecisionSession`] aggregates. Each use case loads a
//! session, applies one operation and saves it back while holding that
//! session's lock, so implementations only need atomic single-record writes.

use async_trait::async_trait;
use decider_domain::{DecisionSession, SessionId};
use thiserror::Error;

/// Errors that can occur during session persistence
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        RepositoryError::Serialization(e.to_string())
    }
}

/// Storage for decision sessions.
///
/// Failures are reported as-is; retrying is up to the implementation.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load a session, or `None` if it does not exist
    async fn load(&self, id: &SessionId) -> Result<Option<DecisionSession>, RepositoryError>;

    /// Insert or replace a session
    async fn save(&self, session: &DecisionSession) -> Result<(), RepositoryError>;

    /// All stored sessions, in no particular order
    async fn list(&self) -> Result<Vec<DecisionSession>, RepositoryError>;
}
