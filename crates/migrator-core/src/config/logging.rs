//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Log file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format: `"text"` or `"json"`.
    #[serde(default = "default_format")]
    pub format: String,
    /// Directory the per-run log file is written to.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Keep the log file after a run that did not fail.
    #[serde(default)]
    pub keep_on_success: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            directory: default_directory(),
            keep_on_success: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_directory() -> String {
    ".".to_string()
}
