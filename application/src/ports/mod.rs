//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod activity_provider;
pub mod candidate_provider;
pub mod clock;
pub mod session_event_logger;
pub mod session_repository;
