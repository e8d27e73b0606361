//! JSON file session repository
//!
//! One `<session-id>.json` file per session under `<data_dir>/sessions/`.
//! Saves write a sibling temp file and rename it into place, so a reader
//! never sees a half-written session.

use async_trait::async_trait;
use decider_application::ports::session_repository::{RepositoryError, SessionRepository};
use decider_domain::{DecisionSession, SessionId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct JsonFileSessionRepository {
    dir: PathBuf,
}

impl JsonFileSessionRepository {
    /// Repository rooted at `<data_dir>/sessions`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("sessions"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &SessionId) -> Result<PathBuf, RepositoryError> {
        let valid = !id.as_str().is_empty()
            && id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RepositoryError::Other(format!("invalid session id: {}", id)));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

#[async_trait]
impl SessionRepository for JsonFileSessionRepository {
    async fn load(&self, id: &SessionId) -> Result<Option<DecisionSession>, RepositoryError> {
        let path = self.path_for(id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn save(&self, session: &DecisionSession) -> Result<(), RepositoryError> {
        let path = self.path_for(&session.id)?;
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(session)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DecisionSession>, RepositoryError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut sessions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<DecisionSession>(&content) {
                Ok(session) => sessions.push(session),
                Err(e) => warn!("Skipping unreadable session file {}: {}", path.display(), e),
            }
        }
        Ok(sessions)
    }
}
