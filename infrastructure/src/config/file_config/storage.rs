//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Root for session files; defaults to the platform data directory
    pub data_dir: Option<PathBuf>,
}

impl FileStorageConfig {
    /// `data_dir`, else `$XDG_DATA_HOME/decider`, else `./.decider`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("decider")))
            .unwrap_or_else(|| PathBuf::from(".decider"))
    }
}
