//! Application-level configuration.
//!
//! - [`EngineConfig`]: turn and session timeouts, default (K, M), the
//!   parameter reduction policy and the fallback requester timezone

pub mod engine_config;

pub use engine_config::{EngineConfig, ParameterPolicy};
