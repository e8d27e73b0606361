//! Domain error types

use crate::core::ids::ItemId;
use crate::params::ParameterSuggestion;
use crate::session::status::SessionStatus;
use thiserror::Error;

/// A turn-level rule was broken. Recoverable: the session is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TurnViolation {
    #[error("It is not your turn")]
    NotYourTurn,

    #[error("Item {0} has already been eliminated")]
    ItemAlreadyEliminated(ItemId),

    #[error("Item {0} is not a candidate in this session")]
    InvalidItem(ItemId),

    #[error("Skip quota exceeded ({used}/{quota} used)")]
    SkipQuotaExceeded { used: u32, quota: u32 },

    #[error("This turn is already a deferred catch-up turn and cannot be skipped")]
    TurnAlreadyDeferred,
}

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No candidates survived the hard filters")]
    NoCandidates,

    #[error("Insufficient candidates: only {available} available")]
    InsufficientCandidates {
        available: usize,
        suggestions: Vec<ParameterSuggestion>,
    },

    #[error(transparent)]
    Turn(#[from] TurnViolation),

    #[error("Cannot {operation} a session in status {status}")]
    SessionState {
        operation: &'static str,
        status: SessionStatus,
    },

    #[error("Integrity error: {0}")]
    Integrity(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        DomainError::Integrity(msg.into())
    }

    /// Whether the caller can correct the input and try again.
    ///
    /// Only integrity errors are unrecoverable; they point at corrupted state.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DomainError::Integrity(_))
    }

    /// The turn violation carried by this error, if any.
    pub fn turn_violation(&self) -> Option<&TurnViolation> {
        match self {
            DomainError::Turn(v) => Some(v),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_violation_display() {
        let error = DomainError::from(TurnViolation::SkipQuotaExceeded { used: 1, quota: 1 });
        assert_eq!(error.to_string(), "Skip quota exceeded (1/1 used)");
        assert_eq!(
            TurnViolation::InvalidItem(ItemId::new("x")).to_string(),
            "Item x is not a candidate in this session"
        );
    }

    #[test]
    fn test_session_state_display() {
        let error = DomainError::SessionState {
            operation: "eliminate",
            status: SessionStatus::Completed,
        };
        assert_eq!(
            error.to_string(),
            "Cannot eliminate a session in status Completed"
        );
    }

    #[test]
    fn test_recoverability() {
        assert!(DomainError::NoCandidates.is_recoverable());
        assert!(DomainError::from(TurnViolation::NotYourTurn).is_recoverable());
        assert!(!DomainError::integrity("missing participant").is_recoverable());
    }

    #[test]
    fn test_turn_violation_accessor() {
        let error = DomainError::from(TurnViolation::TurnAlreadyDeferred);
        assert_eq!(
            error.turn_violation(),
            Some(&TurnViolation::TurnAlreadyDeferred)
        );
        assert!(DomainError::NoCandidates.turn_violation().is_none());
    }
}
