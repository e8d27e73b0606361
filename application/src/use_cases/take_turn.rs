//! Take turn use case
//!
//! Eliminate an item or quick-skip on behalf of a participant. Any timeouts
//! that elapsed while the session was idle are applied first.

use super::error::SessionServiceError;
use super::shared::SessionServices;
use decider_domain::{DecisionSession, ItemId, ParticipantId, SessionId, SkipRecord};
use tracing::{debug, info};

pub struct TakeTurnUseCase {
    services: SessionServices,
}

impl TakeTurnUseCase {
    pub fn new(services: SessionServices) -> Self {
        Self { services }
    }

    pub async fn eliminate(
        &self,
        id: &SessionId,
        participant: &ParticipantId,
        item: &ItemId,
    ) -> Result<DecisionSession, SessionServiceError> {
        let (session, ()) = self
            .services
            .mutate(id, |session, now, rng| {
                session.eliminate(participant, item, now, rng)
            })
            .await?;

        debug!(
            "Session {}: {} eliminated {} ({} left)",
            id,
            participant,
            item,
            session.candidate_set.len()
        );
        if let Some(winner) = &session.final_selection {
            info!("Session {} completed: {} selected", id, winner);
        }
        Ok(session)
    }

    pub async fn quick_skip(
        &self,
        id: &SessionId,
        participant: &ParticipantId,
    ) -> Result<(DecisionSession, SkipRecord), SessionServiceError> {
        let (session, record) = self
            .services
            .mutate(id, |session, now, rng| session.quick_skip(participant, now, rng))
            .await?;

        debug!(
            "Session {}: {} skipped round {} turn {} ({} of {} skips used)",
            id,
            participant,
            record.round,
            record.turn_index,
            session.skip_quota_used(participant),
            session.params.map_or(0, |p| p.k)
        );
        Ok((session, record))
    }
}
