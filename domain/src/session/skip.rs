//! Skipped turns

use crate::core::ids::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipType {
    /// Voluntary, counts against the participant's quota
    QuickSkip,
    /// The turn ran out of time
    TimeoutSkip,
    /// The deferred turn will never be made up
    Forfeited,
}

impl std::fmt::Display for SkipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipType::QuickSkip => write!(f, "quick skip"),
            SkipType::TimeoutSkip => write!(f, "timeout"),
            SkipType::Forfeited => write!(f, "forfeited"),
        }
    }
}

/// A regular-phase turn that was not used, pending replay during catch-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
    pub participant: ParticipantId,
    pub round: u32,
    pub turn_index: usize,
    pub skip_type: SkipType,
    pub timestamp: DateTime<Utc>,
    /// Set once the turn is made up or forfeited
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl SkipRecord {
    pub fn new(
        participant: ParticipantId,
        round: u32,
        turn_index: usize,
        skip_type: SkipType,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            participant,
            round,
            turn_index,
            skip_type,
            timestamp,
            resolved_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.resolved_at.is_none()
    }

    /// The turn was made up with an elimination.
    pub fn resolve(&mut self, at: DateTime<Utc>) {
        self.resolved_at = Some(at);
    }

    pub fn forfeit(&mut self, at: DateTime<Utc>) {
        self.skip_type = SkipType::Forfeited;
        self.resolved_at = Some(at);
    }

    /// Position in the regular turn sequence.
    pub fn slot(&self) -> (u32, usize) {
        (self.round, self.turn_index)
    }
}
