//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL session event log; disabled when unset
    pub events_log: Option<PathBuf>,
    /// Diagnostic log file, in addition to stderr
    pub log_file: Option<PathBuf>,
}
