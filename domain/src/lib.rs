//! Domain layer for decider
//!
//! This crate contains the core decision logic: entities, value objects and
//! pure operations. It has no dependencies on storage, clocks or presentation
//! concerns; time is always passed in and randomness is always injected.
//!
//! # Core Concepts
//!
//! ## Filtering
//!
//! A raw candidate pool is narrowed by hard criteria (exclude on failure) and
//! ranked by soft criteria (priority-weighted score).
//!
//! ## Parameters
//!
//! - **K**: eliminations per participant
//! - **N**: number of participants
//! - **M**: size of the final set the winner is drawn from
//!
//! The session starts with `K·N + M` candidates.
//!
//! ## Sessions
//!
//! Participants take turns eliminating candidates in a random order for K
//! rounds. Skipped or timed-out turns are replayed in a catch-up phase. Once
//! the set converges, the winner is drawn uniformly from what remains.

pub mod candidate;
pub mod core;
pub mod filter;
pub mod params;
pub mod session;

// Re-export commonly used types
pub use candidate::{BusinessHours, CandidateItem, DayHours, GeoPoint, WeeklyHours};
pub use core::{
    error::{DomainError, DomainResult, TurnViolation},
    ids::{ItemId, ParticipantId, SessionId},
};
pub use filter::{
    ActivityLookup, ActivitySubject, EvaluationContext, FilterConfiguration, FilterCriterion,
    FilterKind, FilterVerdict, NoActivity, OpenRequirement, RecentActivitySnapshot, evaluate,
};
pub use params::{AlgorithmParameters, ParameterSuggestion};
pub use session::{
    DecisionSession, HistoryAction, HistoryEntry, SessionSetup, SessionStatus, SkipRecord,
    SkipType, TurnPhase, TurnSlot,
};
