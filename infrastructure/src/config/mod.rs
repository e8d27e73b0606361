//! Configuration file loading for decider
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. `DECIDER_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./decider.toml` or `./.decider.toml`
//! 4. Global: `$XDG_CONFIG_HOME/decider/config.toml`
//! 5. Default values
//!
//! Filter configurations live in their own files, see [`load_filter_configuration`].

mod file_config;
mod filter_file;
mod loader;

pub use file_config::{FileConfig, FileLoggingConfig, FileStorageConfig};
pub use filter_file::{FilterFileError, load_filter_configuration};
pub use loader::ConfigLoader;
