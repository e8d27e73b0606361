//! Decision session aggregate
//!
//! [`DecisionSession`] owns the session status and the candidate set, and
//! composes the [`TurnScheduler`]. Every public operation first runs a lazy
//! timeout sweep against the caller-supplied `now`; nothing here depends on
//! background timers, so a session loaded from storage can always be brought
//! up to date from its timestamps alone.

use super::history::{HistoryAction, HistoryEntry};
use super::scheduler::{TimeoutOutcome, TurnPhase, TurnScheduler, TurnSlot, seconds};
use super::selection::select_final;
use super::skip::{SkipRecord, SkipType};
use super::status::SessionStatus;
use crate::core::error::{DomainError, DomainResult, TurnViolation};
use crate::core::ids::{ItemId, ParticipantId, SessionId};
use crate::filter::FilterConfiguration;
use crate::params::AlgorithmParameters;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upper bound for configurable timeouts (ten years).
const MAX_TIMEOUT_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// What the group asked for when creating the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSetup {
    pub source_item_ids: Vec<ItemId>,
    pub filters: FilterConfiguration,
    pub requested_k: u32,
    pub requested_m: u32,
    /// Snapshot of the participant set; later membership changes are ignored
    pub participants: Vec<ParticipantId>,
}

impl SessionSetup {
    pub fn validate(&self) -> DomainResult<()> {
        if self.participants.is_empty() {
            return Err(DomainError::validation("at least one participant is required"));
        }
        let distinct: HashSet<_> = self.participants.iter().collect();
        if distinct.len() != self.participants.len() {
            return Err(DomainError::validation("participants must be distinct"));
        }
        if self.requested_m == 0 {
            return Err(DomainError::validation("final set size M must be at least 1"));
        }
        if self.source_item_ids.is_empty() {
            return Err(DomainError::validation("no source items supplied"));
        }
        self.filters.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSession {
    pub id: SessionId,
    pub status: SessionStatus,
    pub setup: SessionSetup,
    /// Resolved (K, N, M); set when elimination starts
    pub params: Option<AlgorithmParameters>,
    /// Turn state; set when elimination starts
    pub scheduler: Option<TurnScheduler>,
    pub turn_timeout_secs: u64,
    pub session_timeout_secs: u64,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    /// Ranked best first; only ever shrinks
    pub candidate_set: Vec<ItemId>,
    pub elimination_history: Vec<HistoryEntry>,
    pub final_selection: Option<ItemId>,
    pub runners_up: Vec<ItemId>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_pinned: bool,
    /// Bumped on every state change
    pub revision: u64,
}

impl DecisionSession {
    /// Create a session in `Configuring`.
    pub fn create(
        id: SessionId,
        setup: SessionSetup,
        turn_timeout_secs: u64,
        session_timeout_secs: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        setup.validate()?;
        for (name, value) in [
            ("turn timeout", turn_timeout_secs),
            ("session timeout", session_timeout_secs),
        ] {
            if value == 0 || value > MAX_TIMEOUT_SECS {
                return Err(DomainError::validation(format!(
                    "{name} must be between 1 and {MAX_TIMEOUT_SECS} seconds"
                )));
            }
        }

        Ok(Self {
            id,
            status: SessionStatus::Configuring,
            setup,
            params: None,
            scheduler: None,
            turn_timeout_secs,
            session_timeout_secs,
            created_at: now,
            last_activity_at: now,
            candidate_set: Vec::new(),
            elimination_history: Vec::new(),
            final_selection: None,
            runners_up: Vec::new(),
            completed_at: None,
            is_pinned: false,
            revision: 0,
        })
    }

    // ==================== Queries ====================

    pub fn params(&self) -> DomainResult<AlgorithmParameters> {
        self.params
            .ok_or_else(|| DomainError::integrity("started session without parameters"))
    }

    fn scheduler(&self) -> DomainResult<&TurnScheduler> {
        self.scheduler
            .as_ref()
            .ok_or_else(|| DomainError::integrity("started session without turn state"))
    }

    fn scheduler_mut(&mut self) -> DomainResult<&mut TurnScheduler> {
        self.scheduler
            .as_mut()
            .ok_or_else(|| DomainError::integrity("started session without turn state"))
    }

    pub fn is_participant(&self, participant: &ParticipantId) -> bool {
        self.setup.participants.contains(participant)
    }

    /// The open turn while the session is active.
    pub fn current_slot(&self) -> DomainResult<Option<TurnSlot>> {
        if !self.status.is_active() {
            return Ok(None);
        }
        self.scheduler()?.current_slot()
    }

    pub fn current_round(&self) -> Option<u32> {
        self.scheduler.as_ref().map(|s| s.current_round)
    }

    pub fn phase(&self) -> Option<TurnPhase> {
        self.scheduler.as_ref().map(TurnScheduler::phase)
    }

    /// Time left in the open turn, if there is one.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        if !self.status.is_active() {
            return None;
        }
        self.scheduler.as_ref().map(|s| s.time_remaining(now))
    }

    pub fn skip_quota_used(&self, participant: &ParticipantId) -> u32 {
        self.scheduler
            .as_ref()
            .map_or(0, |s| s.skip_quota_used(participant))
    }

    pub fn skip_records(&self) -> &[SkipRecord] {
        self.scheduler
            .as_ref()
            .map_or(&[], |s| s.skip_records.as_slice())
    }

    pub fn pending_catch_up_count(&self) -> usize {
        self.scheduler.as_ref().map_or(0, |s| s.pending_count())
    }

    pub fn is_eliminated(&self, item: &ItemId) -> bool {
        self.elimination_history
            .iter()
            .any(|e| e.eliminated_item() == Some(item))
    }

    // ==================== Lifecycle ====================

    /// Seed the candidate set and the turn schedule and enter `Eliminating`.
    ///
    /// `ranked` are the filter survivors, best first. Only the top
    /// `K·N + M` are kept. With K = 0 the session completes immediately.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        ranked: Vec<ItemId>,
        params: AlgorithmParameters,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> DomainResult<()> {
        self.sweep(now, rng)?;
        if self.status != SessionStatus::Configuring {
            return Err(self.state_error("start"));
        }
        if ranked.is_empty() {
            return Err(DomainError::NoCandidates);
        }
        if params.n as usize != self.setup.participants.len() {
            return Err(DomainError::validation(format!(
                "parameters are for {} participants, session has {}",
                params.n,
                self.setup.participants.len()
            )));
        }
        let mut seen = HashSet::new();
        let mut candidates: Vec<ItemId> = ranked
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let initial_count = params.initial_count();
        if candidates.len() < initial_count {
            return Err(DomainError::InsufficientCandidates {
                available: candidates.len(),
                suggestions: Vec::new(),
            });
        }
        candidates.truncate(initial_count);

        self.scheduler = Some(TurnScheduler::start(
            &self.setup.participants,
            params.k,
            self.turn_timeout_secs,
            now,
            rng,
        )?);
        self.params = Some(params);
        self.candidate_set = candidates;
        self.status = SessionStatus::Eliminating;
        self.last_activity_at = now;
        self.touch();

        self.update_progress(now, rng)
    }

    /// Bring the session up to date without acting (used by status reads).
    pub fn refresh<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> DomainResult<()> {
        self.sweep(now, rng)
    }

    /// Lazy timeout sweep.
    ///
    /// An idle session expires as a whole. Otherwise every turn whose deadline
    /// has passed is timed out in order.
    fn sweep<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Ok(());
        }
        if now - self.last_activity_at >= seconds(self.session_timeout_secs) {
            self.expire(now);
            return Ok(());
        }

        while self.status.is_active() {
            let outcome = {
                let scheduler = self.scheduler_mut()?;
                if !scheduler.is_turn_expired(now) {
                    break;
                }
                scheduler.timeout_skip()?
            };
            match outcome {
                None => {}
                Some(TimeoutOutcome::Deferred(record)) => {
                    let timestamp = record.timestamp;
                    self.record_skip(&record, timestamp);
                }
                Some(TimeoutOutcome::Forfeited(records)) => {
                    for record in &records {
                        self.record_forfeit(record, now);
                    }
                }
            }
            self.touch();
            self.update_progress(now, rng)?;
        }
        Ok(())
    }

    /// Remove `item` on behalf of the participant holding the open turn.
    pub fn eliminate<R: Rng + ?Sized>(
        &mut self,
        participant: &ParticipantId,
        item: &ItemId,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> DomainResult<()> {
        self.sweep(now, rng)?;
        let slot = self.open_slot_for(participant, "eliminate")?;

        if self.is_eliminated(item) {
            return Err(TurnViolation::ItemAlreadyEliminated(item.clone()).into());
        }
        let position = self
            .candidate_set
            .iter()
            .position(|c| c == item)
            .ok_or_else(|| TurnViolation::InvalidItem(item.clone()))?;

        self.candidate_set.remove(position);
        {
            let scheduler = self.scheduler_mut()?;
            if slot.catch_up {
                scheduler.resolve_catch_up(now)?;
            } else {
                scheduler.advance_turn(now);
            }
        }
        self.elimination_history.push(HistoryEntry {
            participant: participant.clone(),
            round: slot.round,
            turn_index: slot.turn_index,
            catch_up: slot.catch_up,
            action: HistoryAction::Eliminated {
                item_id: item.clone(),
            },
            timestamp: now,
        });
        self.last_activity_at = now;
        self.touch();

        self.update_progress(now, rng)
    }

    /// Voluntarily pass on the open regular turn.
    pub fn quick_skip<R: Rng + ?Sized>(
        &mut self,
        participant: &ParticipantId,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> DomainResult<SkipRecord> {
        self.sweep(now, rng)?;
        if !self.status.is_active() {
            return Err(self.state_error("skip"));
        }

        let record = self.scheduler_mut()?.quick_skip(participant, now)?;
        self.record_skip(&record, now);
        self.last_activity_at = now;
        self.touch();

        self.update_progress(now, rng)?;
        Ok(record)
    }

    /// Cancel from any non-terminal status. Returns `false` if already terminal.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.forfeit_pending(now);
        self.status = SessionStatus::Cancelled;
        self.completed_at = Some(now);
        self.touch();
        true
    }

    /// Returns `false` if the session was already pinned.
    pub fn pin(&mut self) -> bool {
        self.set_pinned(true)
    }

    /// Returns `false` if the session was not pinned.
    pub fn unpin(&mut self) -> bool {
        self.set_pinned(false)
    }

    fn set_pinned(&mut self, pinned: bool) -> bool {
        if self.is_pinned == pinned {
            return false;
        }
        self.is_pinned = pinned;
        self.touch();
        true
    }

    // ==================== Internals ====================

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn state_error(&self, operation: &'static str) -> DomainError {
        DomainError::SessionState {
            operation,
            status: self.status,
        }
    }

    fn open_slot_for(
        &self,
        participant: &ParticipantId,
        operation: &'static str,
    ) -> DomainResult<TurnSlot> {
        if !self.status.is_active() {
            return Err(self.state_error(operation));
        }
        match self.scheduler()?.current_slot()? {
            Some(slot) if &slot.participant == participant => Ok(slot),
            Some(_) => Err(TurnViolation::NotYourTurn.into()),
            None => Err(self.state_error(operation)),
        }
    }

    fn record_skip(&mut self, record: &SkipRecord, timestamp: DateTime<Utc>) {
        self.elimination_history.push(HistoryEntry {
            participant: record.participant.clone(),
            round: record.round,
            turn_index: record.turn_index,
            catch_up: false,
            action: HistoryAction::Skipped {
                skip_type: record.skip_type,
            },
            timestamp,
        });
    }

    fn record_forfeit(&mut self, record: &SkipRecord, now: DateTime<Utc>) {
        self.elimination_history.push(HistoryEntry {
            participant: record.participant.clone(),
            round: record.round,
            turn_index: record.turn_index,
            catch_up: true,
            action: HistoryAction::Forfeited,
            timestamp: record.resolved_at.unwrap_or(now),
        });
    }

    fn forfeit_pending(&mut self, now: DateTime<Utc>) {
        let forfeited = match self.scheduler.as_mut() {
            Some(scheduler) => scheduler.forfeit_all_pending(now),
            None => return,
        };
        for record in &forfeited {
            self.record_forfeit(record, now);
        }
    }

    fn expire(&mut self, now: DateTime<Utc>) {
        self.forfeit_pending(now);
        self.status = SessionStatus::Expired;
        self.completed_at = Some(now);
        self.touch();
    }

    /// Derive the status from the turn state, completing when converged.
    fn update_progress<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> DomainResult<()> {
        if !self.status.is_active() {
            return Ok(());
        }
        let params = self.params()?;
        if self.candidate_set.len() <= params.m as usize {
            return self.complete(now, rng);
        }
        match self.scheduler()?.phase() {
            TurnPhase::Regular => self.status = SessionStatus::Eliminating,
            TurnPhase::CatchUp => self.status = SessionStatus::CatchUp,
            TurnPhase::Exhausted => return self.complete(now, rng),
        }
        Ok(())
    }

    fn complete<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> DomainResult<()> {
        if self.final_selection.is_none() {
            let params = self.params()?;
            let selection = select_final(&self.candidate_set, params.m, rng)
                .ok_or_else(|| DomainError::integrity("no candidates left at completion"))?;
            self.forfeit_pending(now);
            self.final_selection = Some(selection.final_selection);
            self.runners_up = selection.runners_up;
            self.completed_at = Some(now);
        }
        self.status = SessionStatus::Completed;
        self.touch();
        Ok(())
    }

    /// Check loaded state for contradictions that indicate corruption.
    pub fn validate_integrity(&self) -> DomainResult<()> {
        let distinct: HashSet<_> = self.candidate_set.iter().collect();
        if distinct.len() != self.candidate_set.len() {
            return Err(DomainError::integrity("duplicate item in candidate set"));
        }
        if let Some(item) = self.candidate_set.iter().find(|c| self.is_eliminated(c)) {
            return Err(DomainError::integrity(format!(
                "eliminated item {} is still a candidate",
                item
            )));
        }

        if self.status == SessionStatus::Configuring {
            return Ok(());
        }
        if let Some(scheduler) = &self.scheduler {
            scheduler.validate_integrity(&self.setup.participants)?;
        } else if self.status.is_active() {
            return Err(DomainError::integrity("started session without turn state"));
        }
        if let Some(params) = self.params
            && params.n as usize != self.setup.participants.len()
        {
            return Err(DomainError::integrity("parameter N does not match participants"));
        }

        match (&self.final_selection, self.status) {
            (Some(winner), _) if self.runners_up.contains(winner) => Err(DomainError::integrity(
                "final selection also listed as runner-up",
            )),
            (None, SessionStatus::Completed) => {
                Err(DomainError::integrity("completed session without final selection"))
            }
            (Some(_), status) if status != SessionStatus::Completed => Err(
                DomainError::integrity("final selection on a session that is not completed"),
            ),
            _ => Ok(()),
        }
    }

    /// Deferred turns that are still waiting for replay.
    pub fn pending_skips(&self) -> Vec<&SkipRecord> {
        self.scheduler
            .as_ref()
            .map(|s| s.pending_records().collect())
            .unwrap_or_default()
    }

    /// Skip records of a given type, in recorded order.
    pub fn skips_of_type(&self, skip_type: SkipType) -> impl Iterator<Item = &SkipRecord> {
        self.skip_records()
            .iter()
            .filter(move |r| r.skip_type == skip_type)
    }
}
