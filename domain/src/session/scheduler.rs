//! Turn scheduler
//!
//! Owns the elimination order, round and turn indices, turn timing, skip
//! quotas and the catch-up backlog. Every field is plain persisted data: the
//! current phase, the turn holder and whether the turn has timed out are all
//! derived from it, so a scheduler reloaded from storage behaves exactly like
//! the one that was saved.
//!
//! # Turn sequence
//!
//! ```text
//! round 1:  order[0] → order[1] → … → order[N-1]
//! round 2:  order[0] → …
//! …
//! round K:  … → order[N-1]
//! catch-up: pending skip records in (round, turn_index) order
//! ```

use super::skip::{SkipRecord, SkipType};
use crate::core::error::{DomainError, DomainResult, TurnViolation};
use crate::core::ids::ParticipantId;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Where the turn sequence currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Regular,
    CatchUp,
    /// Regular rounds done and no deferred turns left
    Exhausted,
}

/// The turn that is currently open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSlot {
    pub participant: ParticipantId,
    pub round: u32,
    pub turn_index: usize,
    /// A replay of a deferred turn
    pub catch_up: bool,
}

/// What a lazily detected timeout did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutOutcome {
    /// A regular turn was deferred to catch-up
    Deferred(SkipRecord),
    /// A catch-up holder lost every remaining deferred turn
    Forfeited(Vec<SkipRecord>),
}

pub(crate) fn seconds(secs: u64) -> TimeDelta {
    TimeDelta::try_seconds(i64::try_from(secs).unwrap_or(i64::MAX)).unwrap_or(TimeDelta::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnScheduler {
    pub elimination_order: Vec<ParticipantId>,
    /// K
    pub rounds: u32,
    /// 1-based; exceeds `rounds` once the regular phase is over
    pub current_round: u32,
    pub current_turn_index: usize,
    pub turn_started_at: DateTime<Utc>,
    pub turn_timeout_secs: u64,
    #[serde(default)]
    pub skip_records: Vec<SkipRecord>,
    #[serde(default)]
    pub skip_count_by_participant: BTreeMap<ParticipantId, u32>,
}

impl TurnScheduler {
    /// Start a schedule with a uniformly random elimination order.
    pub fn start<R: Rng + ?Sized>(
        participants: &[ParticipantId],
        rounds: u32,
        turn_timeout_secs: u64,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> DomainResult<Self> {
        let mut order = participants.to_vec();
        order.shuffle(rng);
        Self::with_order(order, rounds, turn_timeout_secs, now)
    }

    /// Start a schedule with a fixed elimination order.
    pub fn with_order(
        elimination_order: Vec<ParticipantId>,
        rounds: u32,
        turn_timeout_secs: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if elimination_order.is_empty() {
            return Err(DomainError::validation("elimination order is empty"));
        }
        let distinct: HashSet<_> = elimination_order.iter().collect();
        if distinct.len() != elimination_order.len() {
            return Err(DomainError::validation(
                "elimination order contains duplicate participants",
            ));
        }

        Ok(Self {
            elimination_order,
            rounds,
            current_round: 1,
            current_turn_index: 0,
            turn_started_at: now,
            turn_timeout_secs,
            skip_records: Vec::new(),
            skip_count_by_participant: BTreeMap::new(),
        })
    }

    pub fn participant_count(&self) -> usize {
        self.elimination_order.len()
    }

    pub fn phase(&self) -> TurnPhase {
        if self.current_round <= self.rounds {
            TurnPhase::Regular
        } else if self.next_pending().is_some() {
            TurnPhase::CatchUp
        } else {
            TurnPhase::Exhausted
        }
    }

    /// Index of the earliest unresolved skip record.
    fn next_pending(&self) -> Option<usize> {
        self.skip_records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_pending())
            .min_by_key(|(_, r)| r.slot())
            .map(|(i, _)| i)
    }

    pub fn pending_count(&self) -> usize {
        self.skip_records.iter().filter(|r| r.is_pending()).count()
    }

    pub fn pending_records(&self) -> impl Iterator<Item = &SkipRecord> {
        self.skip_records.iter().filter(|r| r.is_pending())
    }

    /// The open turn, or `None` once the sequence is exhausted.
    pub fn current_slot(&self) -> DomainResult<Option<TurnSlot>> {
        match self.phase() {
            TurnPhase::Regular => {
                let participant = self
                    .elimination_order
                    .get(self.current_turn_index)
                    .ok_or_else(|| {
                        DomainError::integrity(format!(
                            "turn index {} outside elimination order of {}",
                            self.current_turn_index,
                            self.elimination_order.len()
                        ))
                    })?;
                Ok(Some(TurnSlot {
                    participant: participant.clone(),
                    round: self.current_round,
                    turn_index: self.current_turn_index,
                    catch_up: false,
                }))
            }
            TurnPhase::CatchUp => {
                let record = self
                    .next_pending()
                    .map(|i| &self.skip_records[i])
                    .ok_or_else(|| DomainError::integrity("catch-up without pending records"))?;
                Ok(Some(TurnSlot {
                    participant: record.participant.clone(),
                    round: record.round,
                    turn_index: record.turn_index,
                    catch_up: true,
                }))
            }
            TurnPhase::Exhausted => Ok(None),
        }
    }

    pub fn skip_quota_used(&self, participant: &ParticipantId) -> u32 {
        self.skip_count_by_participant
            .get(participant)
            .copied()
            .unwrap_or(0)
    }

    pub fn turn_deadline(&self) -> DateTime<Utc> {
        self.turn_started_at
            .checked_add_signed(seconds(self.turn_timeout_secs))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the open turn has run out of time at `now`.
    pub fn is_turn_expired(&self, now: DateTime<Utc>) -> bool {
        self.phase() != TurnPhase::Exhausted && now >= self.turn_deadline()
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.turn_deadline() - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }

    /// Move to the next regular turn, wrapping into the next round after the
    /// last participant. In catch-up only the turn clock restarts, since the
    /// backlog cursor moves by resolving records.
    pub fn advance_turn(&mut self, now: DateTime<Utc>) -> TurnPhase {
        if self.phase() == TurnPhase::Regular {
            self.current_turn_index += 1;
            if self.current_turn_index >= self.elimination_order.len() {
                self.current_turn_index = 0;
                self.current_round += 1;
            }
        }
        self.turn_started_at = now;
        self.phase()
    }

    fn ensure_holder(&self, participant: &ParticipantId) -> DomainResult<TurnSlot> {
        match self.current_slot()? {
            Some(slot) if &slot.participant == participant => Ok(slot),
            _ => Err(TurnViolation::NotYourTurn.into()),
        }
    }

    /// Voluntarily pass on the open regular turn, deferring it to catch-up.
    pub fn quick_skip(
        &mut self,
        participant: &ParticipantId,
        now: DateTime<Utc>,
    ) -> DomainResult<SkipRecord> {
        let slot = self.ensure_holder(participant)?;
        let used = self.skip_quota_used(participant);
        if used >= self.rounds {
            return Err(TurnViolation::SkipQuotaExceeded {
                used,
                quota: self.rounds,
            }
            .into());
        }
        if slot.catch_up {
            return Err(TurnViolation::TurnAlreadyDeferred.into());
        }

        let record = SkipRecord::new(
            participant.clone(),
            slot.round,
            slot.turn_index,
            SkipType::QuickSkip,
            now,
        );
        self.skip_records.push(record.clone());
        *self
            .skip_count_by_participant
            .entry(participant.clone())
            .or_insert(0) += 1;
        self.advance_turn(now);
        Ok(record)
    }

    /// Apply the timeout of the open turn.
    ///
    /// The next turn is deemed to have started at the expired turn's deadline,
    /// so several elapsed timeouts can be replayed one after another.
    pub fn timeout_skip(&mut self) -> DomainResult<Option<TimeoutOutcome>> {
        let Some(slot) = self.current_slot()? else {
            return Ok(None);
        };
        let deadline = self.turn_deadline();

        if !slot.catch_up {
            let record = SkipRecord::new(
                slot.participant,
                slot.round,
                slot.turn_index,
                SkipType::TimeoutSkip,
                deadline,
            );
            self.skip_records.push(record.clone());
            self.advance_turn(deadline);
            return Ok(Some(TimeoutOutcome::Deferred(record)));
        }

        let mut forfeited = Vec::new();
        for record in self
            .skip_records
            .iter_mut()
            .filter(|r| r.is_pending() && r.participant == slot.participant)
        {
            record.forfeit(deadline);
            forfeited.push(record.clone());
        }
        self.turn_started_at = deadline;
        Ok(Some(TimeoutOutcome::Forfeited(forfeited)))
    }

    /// Mark the open catch-up turn as made up and start the next one.
    pub fn resolve_catch_up(&mut self, now: DateTime<Utc>) -> DomainResult<SkipRecord> {
        let index = self
            .next_pending()
            .ok_or_else(|| DomainError::integrity("no deferred turn to resolve"))?;
        self.skip_records[index].resolve(now);
        self.turn_started_at = now;
        Ok(self.skip_records[index].clone())
    }

    /// Forfeit every pending record, e.g. when the session ends early.
    pub fn forfeit_all_pending(&mut self, now: DateTime<Utc>) -> Vec<SkipRecord> {
        let mut forfeited = Vec::new();
        for record in self.skip_records.iter_mut().filter(|r| r.is_pending()) {
            record.forfeit(now);
            forfeited.push(record.clone());
        }
        forfeited
    }

    /// Check persisted state for contradictions.
    pub fn validate_integrity(&self, participants: &[ParticipantId]) -> DomainResult<()> {
        let order: HashSet<_> = self.elimination_order.iter().collect();
        if order.len() != self.elimination_order.len() {
            return Err(DomainError::integrity("duplicate participant in elimination order"));
        }
        if let Some(missing) = participants.iter().find(|p| !order.contains(p)) {
            return Err(DomainError::integrity(format!(
                "participant {} missing from elimination order",
                missing
            )));
        }
        if order.len() != participants.len() {
            return Err(DomainError::integrity(
                "elimination order does not match participant set",
            ));
        }
        if self.current_turn_index >= self.elimination_order.len() {
            return Err(DomainError::integrity("turn index out of range"));
        }
        if let Some((p, count)) = self
            .skip_count_by_participant
            .iter()
            .find(|(_, count)| **count > self.rounds)
        {
            return Err(DomainError::integrity(format!(
                "participant {} exceeded skip quota ({} > {})",
                p, count, self.rounds
            )));
        }
        if let Some(record) = self
            .skip_records
            .iter()
            .find(|r| !order.contains(&r.participant))
        {
            return Err(DomainError::integrity(format!(
                "skip record for unknown participant {}",
                record.participant
            )));
        }
        Ok(())
    }
}
