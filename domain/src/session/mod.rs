//! Elimination sessions
//!
//! - [`entities::DecisionSession`] is the aggregate: lifecycle, candidate set
//!   and history
//! - [`scheduler::TurnScheduler`] decides whose turn it is, tracks skip quotas
//!   and the catch-up backlog
//! - [`selection::select_final`] draws the winner once elimination converges

pub mod entities;
pub mod history;
pub mod scheduler;
pub mod selection;
pub mod skip;
pub mod status;

#[cfg(test)]
mod test_support;

pub use entities::{DecisionSession, SessionSetup};
pub use history::{HistoryAction, HistoryEntry};
pub use scheduler::{TimeoutOutcome, TurnPhase, TurnScheduler, TurnSlot};
pub use selection::{Selection, select_final};
pub use skip::{SkipRecord, SkipType};
pub use status::SessionStatus;
