//! Shared plumbing for the session use cases.
//!
//! Every operation on a session runs the same way: take the session's lock,
//! load it, apply one domain operation at the clock's current instant, save
//! it back if anything changed and emit events for the new history.

use super::error::SessionServiceError;
use crate::ports::clock::Clock;
use crate::ports::session_event_logger::{SessionEvent, SessionEventLogger};
use crate::ports::session_repository::SessionRepository;
use chrono::{DateTime, Utc};
use decider_domain::{DecisionSession, DomainResult, SessionId, SessionStatus};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// One async lock per session id.
///
/// Operations on the same session are serialized; different sessions never
/// contend.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: &SessionId) -> OwnedMutexGuard<()> {
        let lock = match self.locks.lock() {
            Ok(mut map) => map.entry(id.clone()).or_default().clone(),
            Err(poisoned) => poisoned.into_inner().entry(id.clone()).or_default().clone(),
        };
        lock.lock_owned().await
    }
}

/// What a session looked like before an operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Snapshot {
    revision: u64,
    status: SessionStatus,
    history_len: usize,
}

impl Snapshot {
    pub(crate) fn of(session: &DecisionSession) -> Self {
        Self {
            revision: session.revision,
            status: session.status,
            history_len: session.elimination_history.len(),
        }
    }
}

/// Collaborators every session use case needs.
#[derive(Clone)]
pub struct SessionServices {
    pub repository: Arc<dyn SessionRepository>,
    pub clock: Arc<dyn Clock>,
    pub events: Arc<dyn SessionEventLogger>,
    pub locks: Arc<SessionLocks>,
    rng: Arc<Mutex<StdRng>>,
}

impl SessionServices {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn SessionEventLogger>,
    ) -> Self {
        Self {
            repository,
            clock,
            events,
            locks: Arc::new(SessionLocks::new()),
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Use a deterministic random source (elimination order, final draw).
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub(crate) fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        match self.rng.lock() {
            Ok(mut rng) => f(&mut rng),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    /// Load a session and check it for corruption.
    pub(crate) async fn load(&self, id: &SessionId) -> Result<DecisionSession, SessionServiceError> {
        let session = self
            .repository
            .load(id)
            .await?
            .ok_or_else(|| SessionServiceError::SessionNotFound(id.clone()))?;
        session.validate_integrity()?;
        Ok(session)
    }

    /// Persist the session if it changed since `before`, then log what happened.
    pub(crate) async fn commit(
        &self,
        session: &DecisionSession,
        before: Snapshot,
        now: DateTime<Utc>,
    ) -> Result<(), SessionServiceError> {
        if session.revision == before.revision {
            return Ok(());
        }
        self.repository.save(session).await?;
        debug!(
            "Saved session {} at revision {} ({})",
            session.id, session.revision, session.status
        );

        for entry in session.elimination_history.iter().skip(before.history_len) {
            self.events
                .log(SessionEvent::from_history(session.id.clone(), entry));
        }
        if session.status != before.status {
            self.events.log(SessionEvent::status_changed(
                session.id.clone(),
                before.status,
                session.status,
                now,
            ));
        }
        Ok(())
    }

    /// Run one domain operation on a session under its lock.
    ///
    /// Changes made before the operation fails (a lazily applied timeout, say)
    /// are still saved; the operation's own error is returned afterwards.
    pub(crate) async fn mutate<T>(
        &self,
        id: &SessionId,
        op: impl FnOnce(&mut DecisionSession, DateTime<Utc>, &mut StdRng) -> DomainResult<T>,
    ) -> Result<(DecisionSession, T), SessionServiceError> {
        let _guard = self.locks.acquire(id).await;
        let mut session = self.load(id).await?;
        let before = Snapshot::of(&session);
        let now = self.clock.now();

        let result = self.with_rng(|rng| op(&mut session, now, rng));
        self.commit(&session, before, now).await?;
        let value = result?;
        Ok((session, value))
    }
}
