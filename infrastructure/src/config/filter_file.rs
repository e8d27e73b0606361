//! Filter configuration files
//!
//! A filter file is TOML or JSON, chosen by extension (anything other than
//! `.json` is read as TOML):
//!
//! ```toml
//! requester_timezone = "Europe/Berlin"
//!
//! [[criteria]]
//! id = "open-late"
//! hard = true
//! priority = 0
//! kind = "opening_hours"
//! requirement = { mode = "open_until", time = "23:00" }
//! ```

use decider_domain::{DomainError, FilterConfiguration};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterFileError {
    #[error("Cannot read filter file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Cannot parse filter file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid filter configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Read and validate a filter configuration.
pub fn load_filter_configuration(path: &Path) -> Result<FilterConfiguration, FilterFileError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| FilterFileError::Read {
        path: display.clone(),
        source,
    })?;

    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let config: FilterConfiguration = if is_json {
        serde_json::from_str(&content).map_err(|e| FilterFileError::Parse {
            path: display.clone(),
            message: e.to_string(),
        })?
    } else {
        toml::from_str(&content).map_err(|e| FilterFileError::Parse {
            path: display.clone(),
            message: e.to_string(),
        })?
    };

    config.validate()?;
    Ok(config)
}
