//! Engine configuration: timeouts, default parameters and the reduction policy.
//!
//! These are application-layer concerns. The domain only ever sees the
//! resolved values passed into each operation.

use decider_domain::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do when the requested (K, M) do not fit the surviving candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterPolicy {
    /// Reduce (K, M) with the deterministic reduction sequence
    #[default]
    AutoReduce,
    /// Refuse to start and return the feasible alternatives instead
    Suggest,
}

impl fmt::Display for ParameterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterPolicy::AutoReduce => write!(f, "auto_reduce"),
            ParameterPolicy::Suggest => write!(f, "suggest"),
        }
    }
}

/// Engine configuration.
///
/// | Field | Default |
/// |-------|---------|
/// | `turn_timeout_secs` | 3600 (1 hour) |
/// | `session_timeout_secs` | 172800 (48 hours) |
/// | `default_k` | 2 |
/// | `default_m` | 3 |
/// | `parameter_policy` | `auto_reduce` |
/// | `requester_timezone` | `UTC` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub turn_timeout_secs: u64,
    pub session_timeout_secs: u64,
    pub default_k: u32,
    pub default_m: u32,
    pub parameter_policy: ParameterPolicy,
    /// Used when a filter configuration does not name its own timezone
    pub requester_timezone: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_timeout_secs: 3600,
            session_timeout_secs: 48 * 3600,
            default_k: 2,
            default_m: 3,
            parameter_policy: ParameterPolicy::AutoReduce,
            requester_timezone: "UTC".to_string(),
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_turn_timeout_secs(mut self, secs: u64) -> Self {
        self.turn_timeout_secs = secs;
        self
    }

    pub fn with_session_timeout_secs(mut self, secs: u64) -> Self {
        self.session_timeout_secs = secs;
        self
    }

    pub fn with_defaults(mut self, k: u32, m: u32) -> Self {
        self.default_k = k;
        self.default_m = m;
        self
    }

    pub fn with_parameter_policy(mut self, policy: ParameterPolicy) -> Self {
        self.parameter_policy = policy;
        self
    }

    pub fn with_requester_timezone(mut self, tz: impl Into<String>) -> Self {
        self.requester_timezone = tz.into();
        self
    }

    // ==================== Validation ====================

    pub fn validate(&self) -> DomainResult<()> {
        if self.turn_timeout_secs == 0 {
            return Err(DomainError::validation("turn_timeout_secs must be positive"));
        }
        if self.session_timeout_secs == 0 {
            return Err(DomainError::validation(
                "session_timeout_secs must be positive",
            ));
        }
        if self.default_m == 0 {
            return Err(DomainError::validation("default_m must be at least 1"));
        }
        if self.requester_timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(DomainError::validation(format!(
                "unknown timezone: {}",
                self.requester_timezone
            )));
        }
        Ok(())
    }
}
