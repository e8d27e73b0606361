//! Manage session use case
//!
//! Cancellation, pinning and listing. Authorization is decided by the caller.

use super::error::SessionServiceError;
use super::shared::SessionServices;
use decider_domain::{DecisionSession, SessionId};
use std::cmp::Reverse;
use tracing::info;

pub struct ManageSessionUseCase {
    services: SessionServices,
}

impl ManageSessionUseCase {
    pub fn new(services: SessionServices) -> Self {
        Self { services }
    }

    /// Cancel a session. Returns `false` if it had already ended.
    pub async fn cancel(
        &self,
        id: &SessionId,
    ) -> Result<(DecisionSession, bool), SessionServiceError> {
        let (session, cancelled) = self
            .services
            .mutate(id, |session, now, rng| {
                session.refresh(now, rng)?;
                Ok(session.cancel(now))
            })
            .await?;
        if cancelled {
            info!("Cancelled session {}", id);
        }
        Ok((session, cancelled))
    }

    /// Pin a session. Returns `false` if it was already pinned.
    pub async fn pin(&self, id: &SessionId) -> Result<(DecisionSession, bool), SessionServiceError> {
        self.services
            .mutate(id, |session, now, rng| {
                session.refresh(now, rng)?;
                Ok(session.pin())
            })
            .await
    }

    /// Unpin a session. Returns `false` if it was not pinned.
    pub async fn unpin(
        &self,
        id: &SessionId,
    ) -> Result<(DecisionSession, bool), SessionServiceError> {
        self.services
            .mutate(id, |session, now, rng| {
                session.refresh(now, rng)?;
                Ok(session.unpin())
            })
            .await
    }

    /// Stored sessions, pinned first, then newest first.
    pub async fn list(&self) -> Result<Vec<DecisionSession>, SessionServiceError> {
        let mut sessions = self.services.repository.list().await?;
        sessions.sort_by_key(|s| (Reverse(s.is_pinned), Reverse(s.created_at)));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::session_repository::SessionRepository;
    use crate::use_cases::test_support::{Harness, t0};
    use chrono::TimeDelta;
    use decider_domain::{
        FilterConfiguration, ItemId, ParticipantId, SessionSetup, SessionStatus,
    };

    async fn stored(harness: &Harness, id: &str, minutes: i64) -> SessionId {
        let session = DecisionSession::create(
            SessionId::new(id),
            SessionSetup {
                source_item_ids: vec![ItemId::new("a"), ItemId::new("b")],
                filters: FilterConfiguration::default(),
                requested_k: 1,
                requested_m: 1,
                participants: vec![ParticipantId::new("ann")],
            },
            600,
            3600,
            t0() + TimeDelta::minutes(minutes),
        )
        .unwrap();
        harness.repository.save(&session).await.unwrap();
        session.id
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let harness = Harness::new();
        let id = stored(&harness, "s1", 0).await;
        let use_case = ManageSessionUseCase::new(harness.services.clone());

        let (session, cancelled) = use_case.cancel(&id).await.unwrap();
        assert!(cancelled);
        assert_eq!(session.status, SessionStatus::Cancelled);
        let saves = harness.repository.save_count();

        let (again, cancelled) = use_case.cancel(&id).await.unwrap();
        assert!(!cancelled);
        assert_eq!(again.status, SessionStatus::Cancelled);
        assert_eq!(harness.repository.save_count(), saves);
    }

    #[tokio::test]
    async fn test_cancel_after_inactivity_reports_expired() {
        let harness = Harness::new();
        let id = stored(&harness, "s1", 0).await;
        harness.clock.advance(3600);

        let (session, cancelled) = ManageSessionUseCase::new(harness.services.clone())
            .cancel(&id)
            .await
            .unwrap();
        assert!(!cancelled);
        assert_eq!(session.status, SessionStatus::Expired);
    }

    #[tokio::test]
    async fn test_pin_unpin_and_list_order() {
        let harness = Harness::new();
        let old = stored(&harness, "old", 0).await;
        let new = stored(&harness, "new", 5).await;
        let use_case = ManageSessionUseCase::new(harness.services.clone());

        let listed: Vec<_> = use_case.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(listed, vec![new.clone(), old.clone()]);

        assert!(use_case.pin(&old).await.unwrap().1);
        assert!(!use_case.pin(&old).await.unwrap().1);
        let listed: Vec<_> = use_case.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(listed, vec![old.clone(), new]);

        let (session, changed) = use_case.unpin(&old).await.unwrap();
        assert!(changed);
        assert!(!session.is_pinned);
    }
}
