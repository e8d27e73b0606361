//! Session history
//!
//! Append-only record of everything that happened to the candidate set and
//! the turn sequence. Entries are never edited once written.

use super::skip::SkipType;
use crate::core::ids::{ItemId, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HistoryAction {
    Eliminated { item_id: ItemId },
    Skipped { skip_type: SkipType },
    Forfeited,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub participant: ParticipantId,
    pub round: u32,
    pub turn_index: usize,
    /// Whether this happened while replaying a deferred turn
    pub catch_up: bool,
    #[serde(flatten)]
    pub action: HistoryAction,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn eliminated_item(&self) -> Option<&ItemId> {
        match &self.action {
            HistoryAction::Eliminated { item_id } => Some(item_id),
            _ => None,
        }
    }

    /// Short machine-readable name of the action.
    pub fn kind(&self) -> &'static str {
        match self.action {
            HistoryAction::Eliminated { .. } => "item_eliminated",
            HistoryAction::Skipped { .. } => "turn_skipped",
            HistoryAction::Forfeited => "turn_forfeited",
        }
    }
}
