//! Session status

use serde::{Deserialize, Serialize};

/// Lifecycle status of a decision session.
///
/// ```text
/// Configuring ──> Eliminating ──> CatchUp ──> Completed
///      │               │             │
///      └───────────────┴─────────────┴──> Expired | Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created; filters and parameters not yet applied
    Configuring,
    /// Regular elimination rounds in progress
    Eliminating,
    /// Replaying deferred (skipped) turns
    CatchUp,
    Completed,
    Expired,
    Cancelled,
}

impl SessionStatus {
    /// Whether turns can currently be taken.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Eliminating | SessionStatus::CatchUp)
    }

    /// Whether the session has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Expired | SessionStatus::Cancelled
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Configuring => "Configuring",
            SessionStatus::Eliminating => "Eliminating",
            SessionStatus::CatchUp => "CatchUp",
            SessionStatus::Completed => "Completed",
            SessionStatus::Expired => "Expired",
            SessionStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}
