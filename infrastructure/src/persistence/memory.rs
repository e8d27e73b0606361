//! In-memory session repository

use async_trait::async_trait;
use decider_application::ports::session_repository::{RepositoryError, SessionRepository};
use decider_domain::{DecisionSession, SessionId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Session storage that lives as long as the process.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, DecisionSession>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn load(&self, id: &SessionId) -> Result<Option<DecisionSession>, RepositoryError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn save(&self, session: &DecisionSession) -> Result<(), RepositoryError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DecisionSession>, RepositoryError> {
        Ok(self.sessions.read().await.values().cloned().collect())
    }
}
