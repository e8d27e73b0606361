//! Get status use case
//!
//! A status read is also an access: elapsed timeouts are applied and saved
//! before the view is built.

use super::error::SessionServiceError;
use super::shared::SessionServices;
use crate::ports::candidate_provider::CandidateProvider;
use decider_domain::{
    AlgorithmParameters, CandidateItem, DecisionSession, ItemId, ParticipantId, SessionId,
    SessionStatus, TurnPhase,
};
use serde::Serialize;
use std::sync::Arc;

/// Display data for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub id: ItemId,
    pub name: String,
    pub category: String,
}

impl CandidateSummary {
    fn from_item(item: &CandidateItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
        }
    }

    /// Summary for an item the catalog no longer knows.
    fn unknown(id: &ItemId) -> Self {
        Self {
            id: id.clone(),
            name: id.to_string(),
            category: String::new(),
        }
    }
}

/// Everything a participant needs to see about a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusView {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub params: Option<AlgorithmParameters>,
    pub candidates: Vec<CandidateSummary>,
    pub current_holder: Option<ParticipantId>,
    pub time_remaining_secs: Option<u64>,
    pub round: Option<u32>,
    pub phase: Option<TurnPhase>,
    pub is_your_turn: bool,
    pub skip_quota_used: u32,
    pub skip_quota_total: u32,
    pub pending_catch_up: usize,
    pub eliminated_count: usize,
    pub final_selection: Option<CandidateSummary>,
    pub runners_up: Vec<CandidateSummary>,
    pub is_pinned: bool,
}

pub struct GetStatusUseCase {
    services: SessionServices,
    catalog: Arc<dyn CandidateProvider>,
}

impl GetStatusUseCase {
    pub fn new(services: SessionServices, catalog: Arc<dyn CandidateProvider>) -> Self {
        Self { services, catalog }
    }

    /// Status as seen by `participant`, or by an observer when `None`.
    pub async fn execute(
        &self,
        id: &SessionId,
        participant: Option<&ParticipantId>,
    ) -> Result<SessionStatusView, SessionServiceError> {
        let (session, ()) = self
            .services
            .mutate(id, |session, now, rng| session.refresh(now, rng))
            .await?;
        let now = self.services.clock.now();

        let mut wanted: Vec<ItemId> = session.candidate_set.clone();
        wanted.extend(session.final_selection.iter().cloned());
        wanted.extend(session.runners_up.iter().cloned());
        let items = self.catalog.items(&wanted).await?;
        let summary = |id: &ItemId| {
            items
                .iter()
                .find(|item| &item.id == id)
                .map_or_else(|| CandidateSummary::unknown(id), CandidateSummary::from_item)
        };

        let slot = session.current_slot()?;
        let current_holder = slot.map(|s| s.participant);
        let is_your_turn = participant.is_some() && current_holder.as_ref() == participant;

        Ok(SessionStatusView {
            session_id: session.id.clone(),
            status: session.status,
            params: session.params,
            candidates: session.candidate_set.iter().map(summary).collect(),
            time_remaining_secs: session.time_remaining(now).map(|d| d.as_secs()),
            round: active_round(&session),
            phase: session.status.is_active().then(|| session.phase()).flatten(),
            is_your_turn,
            skip_quota_used: participant.map_or(0, |p| session.skip_quota_used(p)),
            skip_quota_total: session.params.map_or(0, |p| p.k),
            pending_catch_up: session.pending_catch_up_count(),
            eliminated_count: session
                .elimination_history
                .iter()
                .filter(|e| e.eliminated_item().is_some())
                .count(),
            final_selection: session.final_selection.as_ref().map(summary),
            runners_up: session.runners_up.iter().map(summary).collect(),
            is_pinned: session.is_pinned,
            current_holder,
        })
    }
}

/// The round shown to users: capped at K once regular turns are over.
fn active_round(session: &DecisionSession) -> Option<u32> {
    let round = session.current_round()?;
    let k = session.params.map_or(round, |p| p.k);
    Some(round.min(k.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::use_cases::create_session::{CreateSessionInput, CreateSessionUseCase};
    use crate::use_cases::start_session::StartSessionUseCase;
    use crate::use_cases::take_turn::TakeTurnUseCase;
    use crate::use_cases::test_support::{Harness, MockCatalog};

    fn catalog() -> Arc<MockCatalog> {
        Arc::new(MockCatalog::new(vec![
            CandidateItem::new("sushi", "japanese").with_name("Sushi Bar"),
            CandidateItem::new("tacos", "mexican").with_name("Taco Stand"),
            CandidateItem::new("pho", "vietnamese").with_name("Pho House"),
        ]))
    }

    async fn started(harness: &Harness) -> DecisionSession {
        let catalog = catalog();
        let config = EngineConfig::default().with_turn_timeout_secs(600);
        let created = CreateSessionUseCase::new(harness.services.clone(), catalog.clone(), config.clone())
            .execute(
                CreateSessionInput::new(
                    vec!["sushi".into(), "tacos".into(), "pho".into()],
                    vec!["ann".into(), "bob".into()],
                )
                .with_parameters(1, 1),
            )
            .await
            .unwrap();
        StartSessionUseCase::new(harness.services.clone(), catalog.clone(), catalog, config)
            .execute(&created.id)
            .await
            .unwrap()
    }

    fn holder(session: &DecisionSession) -> ParticipantId {
        session.current_slot().unwrap().unwrap().participant
    }

    #[tokio::test]
    async fn test_status_for_holder_and_observer() {
        let harness = Harness::new();
        let session = started(&harness).await;
        let first = holder(&session);
        harness.clock.advance(100);
        let use_case = GetStatusUseCase::new(harness.services.clone(), catalog());

        let view = use_case.execute(&session.id, Some(&first)).await.unwrap();
        assert_eq!(view.status, SessionStatus::Eliminating);
        assert!(view.is_your_turn);
        assert_eq!(view.current_holder.as_ref(), Some(&first));
        assert_eq!(view.time_remaining_secs, Some(500));
        assert_eq!(view.round, Some(1));
        assert_eq!(view.phase, Some(TurnPhase::Regular));
        assert_eq!((view.skip_quota_used, view.skip_quota_total), (0, 1));
        assert_eq!(view.candidates.len(), 3);
        assert!(view.candidates.iter().any(|c| c.name == "Taco Stand"));

        let observer = use_case.execute(&session.id, None).await.unwrap();
        assert!(!observer.is_your_turn);
    }

    #[tokio::test]
    async fn test_status_applies_timeouts() {
        let harness = Harness::new();
        let session = started(&harness).await;
        let first = holder(&session);
        harness.clock.advance(650);

        let view = GetStatusUseCase::new(harness.services.clone(), catalog())
            .execute(&session.id, Some(&first))
            .await
            .unwrap();
        assert!(!view.is_your_turn);
        assert_eq!(view.time_remaining_secs, Some(550));

        let stored = harness.repository.get(&session.id).unwrap();
        assert_ne!(holder(&stored), first);
    }

    #[tokio::test]
    async fn test_completed_status_lists_selection() {
        let harness = Harness::new();
        let session = started(&harness).await;
        let take_turn = TakeTurnUseCase::new(harness.services.clone());

        let first = holder(&session);
        let after = take_turn
            .eliminate(&session.id, &first, &ItemId::new("sushi"))
            .await
            .unwrap();
        take_turn
            .eliminate(&session.id, &holder(&after), &ItemId::new("pho"))
            .await
            .unwrap();

        let view = GetStatusUseCase::new(harness.services.clone(), catalog())
            .execute(&session.id, None)
            .await
            .unwrap();
        assert_eq!(view.status, SessionStatus::Completed);
        assert_eq!(view.final_selection.unwrap().name, "Taco Stand");
        assert!(view.current_holder.is_none());
        assert!(view.time_remaining_secs.is_none());
        assert_eq!(view.eliminated_count, 2);
    }
}
