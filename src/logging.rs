//! Per-run log file.
//!
//! Every run logs to `migrator_<timestamp>.log` in the configured
//! directory. The file is removed after a successful run unless
//! `logging.keep_on_success` is set.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use tracing_subscriber::{EnvFilter, fmt};

use migrator_core::config::MigratorConfig;
use migrator_core::config::logging::LoggingConfig;
use migrator_core::error::AppError;
use migrator_core::result::AppResult;

/// The log file of the current run.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    keep_on_success: bool,
}

impl LogFile {
    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the log file after a run that did not fail.
    pub fn finish_successfully(self) -> AppResult<()> {
        if self.keep_on_success {
            return Ok(());
        }
        std::fs::remove_file(&self.path)?;
        Ok(())
    }
}

/// Logging settings of a preloaded configuration, or the defaults when it
/// could not be read. Configuration errors are reported by the pipeline.
pub fn settings(config: Option<&MigratorConfig>) -> LoggingConfig {
    config
        .map(|config| config.logging.clone())
        .unwrap_or_default()
}

/// Log file name for a run started now.
pub fn file_name() -> String {
    let timestamp = Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(':', "-");
    format!("migrator_{}.log", timestamp)
}

/// Install the global subscriber writing to a new log file.
pub fn init(settings: &LoggingConfig) -> AppResult<LogFile> {
    std::fs::create_dir_all(&settings.directory)?;
    let path = Path::new(&settings.directory).join(file_name());
    let file = File::create(&path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let result = match settings.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .with_writer(Mutex::new(file))
            .try_init(),
        _ => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
    };
    result.map_err(|e| AppError::internal(format!("Failed to initialize logging: {}", e)))?;

    Ok(LogFile {
        path,
        keep_on_success: settings.keep_on_success,
    })
}
