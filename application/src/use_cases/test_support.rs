//! Hand-written port doubles shared by the use case tests.

use crate::ports::activity_provider::{ActivityError, ActivityProvider};
use crate::ports::candidate_provider::{CandidateProvider, CatalogError};
use crate::ports::clock::Clock;
use crate::ports::session_event_logger::{SessionEvent, SessionEventLogger};
use crate::ports::session_repository::{RepositoryError, SessionRepository};
use crate::use_cases::shared::SessionServices;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use decider_domain::{ActivitySubject, CandidateItem, DecisionSession, ItemId, SessionId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
}

pub(crate) struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(crate) fn advance(&self, secs: i64) {
        *self.now.lock().unwrap() += TimeDelta::seconds(secs);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
pub(crate) struct MemoryRepository {
    sessions: Mutex<HashMap<SessionId, DecisionSession>>,
    pub(crate) saves: Mutex<usize>,
}

impl MemoryRepository {
    pub(crate) fn get(&self, id: &SessionId) -> Option<DecisionSession> {
        self.sessions.lock().unwrap().get(id).cloned()
    }

    pub(crate) fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl SessionRepository for MemoryRepository {
    async fn load(&self, id: &SessionId) -> Result<Option<DecisionSession>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn save(&self, session: &DecisionSession) -> Result<(), RepositoryError> {
        *self.saves.lock().unwrap() += 1;
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DecisionSession>, RepositoryError> {
        Ok(self.sessions.lock().unwrap().values().cloned().collect())
    }
}

pub(crate) struct MockCatalog {
    items: Vec<CandidateItem>,
    visited: HashSet<(ItemId, ActivitySubject)>,
}

impl MockCatalog {
    pub(crate) fn new(items: Vec<CandidateItem>) -> Self {
        Self {
            items,
            visited: HashSet::new(),
        }
    }

    /// `n` plain items named `i0`.. in category `food`.
    pub(crate) fn numbered(n: usize) -> Self {
        Self::new(
            (0..n)
                .map(|i| CandidateItem::new(format!("i{i}"), "food"))
                .collect(),
        )
    }

    pub(crate) fn with_visit(mut self, item: &str, subject: ActivitySubject) -> Self {
        self.visited.insert((ItemId::new(item), subject));
        self
    }
}

#[async_trait]
impl CandidateProvider for MockCatalog {
    async fn items(&self, ids: &[ItemId]) -> Result<Vec<CandidateItem>, CatalogError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.items.iter().find(|i| &i.id == id).cloned())
            .collect())
    }
}

#[async_trait]
impl ActivityProvider for MockCatalog {
    async fn has_recent_activity(
        &self,
        item: &ItemId,
        subject: &ActivitySubject,
        _since_days: u32,
    ) -> Result<bool, ActivityError> {
        Ok(self.visited.contains(&(item.clone(), subject.clone())))
    }
}

#[derive(Default)]
pub(crate) struct RecordingEvents {
    pub(crate) types: Mutex<Vec<&'static str>>,
}

impl RecordingEvents {
    pub(crate) fn types(&self) -> Vec<&'static str> {
        self.types.lock().unwrap().clone()
    }
}

impl SessionEventLogger for RecordingEvents {
    fn log(&self, event: SessionEvent) {
        self.types.lock().unwrap().push(event.event_type);
    }
}

/// Everything a use case test needs, wired together.
pub(crate) struct Harness {
    pub(crate) repository: Arc<MemoryRepository>,
    pub(crate) clock: Arc<FixedClock>,
    pub(crate) events: Arc<RecordingEvents>,
    pub(crate) services: SessionServices,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let repository = Arc::new(MemoryRepository::default());
        let clock = Arc::new(FixedClock::new(t0()));
        let events = Arc::new(RecordingEvents::default());
        let services = SessionServices::new(repository.clone(), clock.clone(), events.clone())
            .with_rng_seed(42);
        Self {
            repository,
            clock,
            events,
            services,
        }
    }
}
