//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! The `[engine]` section deserializes straight into the application's
//! [`EngineConfig`].

mod logging;
mod storage;

pub use logging::FileLoggingConfig;
pub use storage::FileStorageConfig;

use decider_application::EngineConfig;
use decider_domain::DomainResult;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Timeouts, default parameters and reduction policy
    pub engine: EngineConfig,
    /// Where sessions are stored
    pub storage: FileStorageConfig,
    /// Event and diagnostic log files
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    pub fn validate(&self) -> DomainResult<()> {
        self.engine.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decider_application::ParameterPolicy;
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[engine]
turn_timeout_secs = 900
session_timeout_secs = 86400
default_k = 1
default_m = 2
parameter_policy = "suggest"
requester_timezone = "America/New_York"

[storage]
data_dir = "/var/lib/decider"

[logging]
events_log = "/var/log/decider/events.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.turn_timeout_secs, 900);
        assert_eq!(config.engine.parameter_policy, ParameterPolicy::Suggest);
        assert_eq!(config.engine.requester_timezone, "America/New_York");
        assert_eq!(
            config.storage.data_dir,
            Some(PathBuf::from("/var/lib/decider"))
        );
        assert!(config.logging.events_log.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[engine]\ndefault_k = 3\n").unwrap();
        assert_eq!(config.engine.default_k, 3);
        assert_eq!(config.engine.default_m, 3);
        assert_eq!(config.engine.turn_timeout_secs, 3600);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_timezone() {
        let config: FileConfig =
            toml::from_str("[engine]\nrequester_timezone = \"Nowhere/Land\"\n").unwrap();
        assert!(config.validate().is_err());
    }
}
