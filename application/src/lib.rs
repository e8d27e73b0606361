//! Application layer for decider
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineConfig, ParameterPolicy};
pub use ports::{
    activity_provider::{ActivityError, ActivityProvider, NoActivityProvider},
    candidate_provider::{CandidateProvider, CatalogError},
    clock::{Clock, SystemClock},
    session_event_logger::{NoSessionEventLogger, SessionEvent, SessionEventLogger},
    session_repository::{RepositoryError, SessionRepository},
};
pub use use_cases::create_session::{CreateSessionInput, CreateSessionUseCase};
pub use use_cases::error::SessionServiceError;
pub use use_cases::get_status::{CandidateSummary, GetStatusUseCase, SessionStatusView};
pub use use_cases::manage_session::ManageSessionUseCase;
pub use use_cases::shared::{SessionLocks, SessionServices};
pub use use_cases::start_session::StartSessionUseCase;
pub use use_cases::take_turn::TakeTurnUseCase;
