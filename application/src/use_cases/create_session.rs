//! Create session use case
//!
//! Registers a new session in `Configuring` from source items, a filter
//! configuration, the requested (K, M) and the participant snapshot.

use super::error::SessionServiceError;
use super::shared::SessionServices;
use crate::config::EngineConfig;
use crate::ports::candidate_provider::{CandidateProvider, CatalogError};
use crate::ports::session_event_logger::SessionEvent;
use decider_domain::{
    DecisionSession, FilterConfiguration, ItemId, ParticipantId, SessionId, SessionSetup,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Input for the CreateSession use case
#[derive(Debug, Clone)]
pub struct CreateSessionInput {
    pub source_item_ids: Vec<ItemId>,
    /// `None` means no criteria, evaluated in the configured requester timezone
    pub filters: Option<FilterConfiguration>,
    /// Falls back to `EngineConfig::default_k`
    pub requested_k: Option<u32>,
    /// Falls back to `EngineConfig::default_m`
    pub requested_m: Option<u32>,
    pub participants: Vec<ParticipantId>,
}

impl CreateSessionInput {
    pub fn new(source_item_ids: Vec<ItemId>, participants: Vec<ParticipantId>) -> Self {
        Self {
            source_item_ids,
            filters: None,
            requested_k: None,
            requested_m: None,
            participants,
        }
    }

    pub fn with_filters(mut self, filters: FilterConfiguration) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_parameters(mut self, k: u32, m: u32) -> Self {
        self.requested_k = Some(k);
        self.requested_m = Some(m);
        self
    }
}

pub struct CreateSessionUseCase {
    services: SessionServices,
    catalog: Arc<dyn CandidateProvider>,
    config: EngineConfig,
}

impl CreateSessionUseCase {
    pub fn new(
        services: SessionServices,
        catalog: Arc<dyn CandidateProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            services,
            catalog,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: CreateSessionInput,
    ) -> Result<DecisionSession, SessionServiceError> {
        let mut seen = HashSet::new();
        let source_item_ids: Vec<ItemId> = input
            .source_item_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let known = self.catalog.items(&source_item_ids).await?;
        if let Some(missing) = source_item_ids
            .iter()
            .find(|id| !known.iter().any(|item| &item.id == *id))
        {
            return Err(CatalogError::UnknownItem(missing.clone()).into());
        }

        let filters = input.filters.unwrap_or_else(|| {
            FilterConfiguration::default()
                .with_requester_timezone(self.config.requester_timezone.clone())
        });
        let setup = SessionSetup {
            source_item_ids,
            filters,
            requested_k: input.requested_k.unwrap_or(self.config.default_k),
            requested_m: input.requested_m.unwrap_or(self.config.default_m),
            participants: input.participants,
        };

        let now = self.services.clock.now();
        let session = DecisionSession::create(
            SessionId::generate(),
            setup,
            self.config.turn_timeout_secs,
            self.config.session_timeout_secs,
            now,
        )?;
        self.services.repository.save(&session).await?;

        info!(
            "Created session {} with {} participants over {} items",
            session.id,
            session.setup.participants.len(),
            session.setup.source_item_ids.len()
        );
        self.services.events.log(SessionEvent::new(
            "session_created",
            session.id.clone(),
            now,
            json!({
                "participants": session.setup.participants,
                "source_items": session.setup.source_item_ids.len(),
                "requested_k": session.setup.requested_k,
                "requested_m": session.setup.requested_m,
                "criteria": session.setup.filters.criteria.len(),
            }),
        ));
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{Harness, MockCatalog};
    use decider_domain::{DomainError, SessionStatus};

    fn ids(names: &[&str]) -> Vec<ItemId> {
        names.iter().map(|n| ItemId::new(*n)).collect()
    }

    fn people(names: &[&str]) -> Vec<ParticipantId> {
        names.iter().map(|n| ParticipantId::new(*n)).collect()
    }

    #[tokio::test]
    async fn test_create_applies_defaults_and_saves() {
        let harness = Harness::new();
        let use_case = CreateSessionUseCase::new(
            harness.services.clone(),
            Arc::new(MockCatalog::numbered(5)),
            EngineConfig::default().with_requester_timezone("Asia/Tokyo"),
        );

        let session = use_case
            .execute(CreateSessionInput::new(
                ids(&["i0", "i1", "i1", "i2"]),
                people(&["ann", "bob"]),
            ))
            .await
            .unwrap();

        assert_eq!(session.status, SessionStatus::Configuring);
        assert_eq!(session.setup.source_item_ids, ids(&["i0", "i1", "i2"]));
        assert_eq!((session.setup.requested_k, session.setup.requested_m), (2, 3));
        assert_eq!(session.setup.filters.requester_timezone, "Asia/Tokyo");
        assert_eq!(session.turn_timeout_secs, 3600);
        assert!(harness.repository.get(&session.id).is_some());
        assert_eq!(harness.events.types(), vec!["session_created"]);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_items() {
        let harness = Harness::new();
        let use_case = CreateSessionUseCase::new(
            harness.services.clone(),
            Arc::new(MockCatalog::numbered(2)),
            EngineConfig::default(),
        );

        let err = use_case
            .execute(CreateSessionInput::new(ids(&["i0", "zz"]), people(&["ann"])))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionServiceError::Catalog(CatalogError::UnknownItem(ref id)) if id.as_str() == "zz"
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_setup() {
        let harness = Harness::new();
        let use_case = CreateSessionUseCase::new(
            harness.services.clone(),
            Arc::new(MockCatalog::numbered(3)),
            EngineConfig::default(),
        );

        let err = use_case
            .execute(
                CreateSessionInput::new(ids(&["i0"]), people(&["ann", "ann"])).with_parameters(1, 1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::Validation(_))));
        assert_eq!(harness.repository.save_count(), 0);
    }
}
