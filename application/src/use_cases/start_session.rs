//! Apply filters and start use case
//!
//! Runs the filter engine over the session's source items, resolves (K, N, M)
//! against the survivors and starts elimination.
//!
//! # Flow
//!
//! 1. **Snapshot** - fetch items and pre-fetch every RecentActivity answer
//! 2. **Filter** - hard criteria exclude, soft criteria rank
//! 3. **Resolve** - reduce (K, M) or refuse with suggestions, per policy
//! 4. **Start** - seed the candidate set and the random elimination order

use super::error::SessionServiceError;
use super::shared::{SessionServices, Snapshot};
use crate::config::{EngineConfig, ParameterPolicy};
use crate::ports::activity_provider::ActivityProvider;
use crate::ports::candidate_provider::CandidateProvider;
use chrono::{DateTime, Utc};
use decider_domain::params::{resolve, suggest};
use decider_domain::{
    AlgorithmParameters, CandidateItem, DecisionSession, DomainError, DomainResult,
    EvaluationContext, FilterKind, ItemId, RecentActivitySnapshot, SessionId, SessionStatus,
    evaluate,
};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartSessionUseCase {
    services: SessionServices,
    catalog: Arc<dyn CandidateProvider>,
    activity: Arc<dyn ActivityProvider>,
    config: EngineConfig,
}

impl StartSessionUseCase {
    pub fn new(
        services: SessionServices,
        catalog: Arc<dyn CandidateProvider>,
        activity: Arc<dyn ActivityProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            services,
            catalog,
            activity,
            config,
        }
    }

    pub async fn execute(&self, id: &SessionId) -> Result<DecisionSession, SessionServiceError> {
        let _guard = self.services.locks.acquire(id).await;
        let mut session = self.services.load(id).await?;
        let before = Snapshot::of(&session);
        let now = self.services.clock.now();

        let ranked = if session.status == SessionStatus::Configuring {
            self.rank_candidates(&session, now).await?
        } else {
            Vec::new()
        };

        let result = self.services.with_rng(|rng| {
            let params = self.parameters(&session, ranked.len())?;
            session.start(ranked, params, now, rng)
        });
        self.services.commit(&session, before, now).await?;
        result?;

        if let Some(params) = session.params {
            info!(
                "Started session {} with {} ({} candidates)",
                session.id,
                params,
                session.candidate_set.len()
            );
        }
        Ok(session)
    }

    /// Filter survivors, best first.
    async fn rank_candidates(
        &self,
        session: &DecisionSession,
        now: DateTime<Utc>,
    ) -> Result<Vec<ItemId>, SessionServiceError> {
        let items = self.catalog.items(&session.setup.source_item_ids).await?;
        if items.len() < session.setup.source_item_ids.len() {
            warn!(
                "Session {}: {} source items are no longer in the catalog",
                session.id,
                session.setup.source_item_ids.len() - items.len()
            );
        }

        let activity = self.prefetch_activity(session, &items).await?;
        let verdicts = evaluate(
            &items,
            &session.setup.filters,
            &EvaluationContext::new(now, &activity),
        );
        debug!(
            "Session {}: {} of {} items passed the hard filters",
            session.id,
            verdicts.len(),
            items.len()
        );
        Ok(verdicts.into_iter().map(|v| v.item_id).collect())
    }

    /// Ask the activity provider every question the filters will ask.
    async fn prefetch_activity(
        &self,
        session: &DecisionSession,
        items: &[CandidateItem],
    ) -> Result<RecentActivitySnapshot, SessionServiceError> {
        let queries: Vec<_> = session
            .setup
            .filters
            .criteria
            .iter()
            .filter_map(|c| match &c.kind {
                FilterKind::RecentActivity {
                    subject,
                    within_days,
                } => Some((subject, *within_days)),
                _ => None,
            })
            .flat_map(|(subject, days)| items.iter().map(move |item| (&item.id, subject, days)))
            .collect();

        let answers = try_join_all(queries.iter().map(|&(item, subject, days)| {
            let activity = self.activity.clone();
            async move { activity.has_recent_activity(item, subject, days).await }
        }))
        .await?;

        let mut snapshot = RecentActivitySnapshot::new();
        for (&(item, subject, days), hit) in queries.iter().zip(answers) {
            if hit {
                snapshot.record(item.clone(), subject.clone(), days);
            }
        }
        Ok(snapshot)
    }

    /// Resolve (K, N, M) for `available` survivors under the configured policy.
    fn parameters(
        &self,
        session: &DecisionSession,
        available: usize,
    ) -> DomainResult<AlgorithmParameters> {
        let setup = &session.setup;
        let n = u32::try_from(setup.participants.len())
            .map_err(|_| DomainError::validation("too many participants"))?;
        let requested = AlgorithmParameters::new(setup.requested_k, n, setup.requested_m);

        // Nothing to resolve: start() reports the status or NoCandidates
        if session.status != SessionStatus::Configuring || available == 0 {
            return Ok(requested);
        }
        if requested.initial_count() <= available {
            return Ok(requested);
        }

        match self.config.parameter_policy {
            ParameterPolicy::AutoReduce => {
                let resolved = resolve(setup.requested_k, setup.requested_m, n, available)?;
                info!(
                    "Session {}: reduced {} to {} for {} candidates",
                    session.id, requested, resolved, available
                );
                Ok(resolved)
            }
            ParameterPolicy::Suggest => Err(DomainError::InsufficientCandidates {
                available,
                suggestions: suggest(setup.requested_k, setup.requested_m, n, available),
            }),
        }
    }
}
