//! Migrator configuration schemas.
//!
//! The configuration is deserialized via the `config` crate from a single
//! file (JSON by default, TOML or YAML by extension) overlaid with
//! `MIGRATOR__*` environment variables, then validated with `validator`.
//! Each sub-module represents a logical configuration section.

pub mod destination;
pub mod logging;
pub mod migration;
pub mod source;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use self::destination::DestinationConfig;
use self::logging::LoggingConfig;
use self::migration::MigrationConfig;
use self::source::SourceConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Root migrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MigratorConfig {
    /// Source storage settings.
    #[validate(nested)]
    pub source: SourceConfig,
    /// Destination asset service settings.
    #[validate(nested)]
    pub destination: DestinationConfig,
    /// Migration behaviour settings.
    #[serde(default)]
    #[validate(nested)]
    pub migration: MigrationConfig,
    /// Log file settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MigratorConfig {
    /// Load and validate configuration from the given file.
    ///
    /// Values from environment variables prefixed with `MIGRATOR__` take
    /// precedence over the file (e.g. `MIGRATOR__DESTINATION__ACCESS_TOKEN`).
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("MIGRATOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }
}

/// Supplies the validated migrator configuration.
pub trait ConfigProvider: Send + Sync + std::fmt::Debug {
    /// Load and validate the configuration.
    fn load(&self) -> AppResult<MigratorConfig>;

    /// Human-readable description of where the configuration comes from.
    fn describe(&self) -> String;
}

/// Reads the configuration from a file on disk.
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    /// Create a provider reading the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileConfigProvider {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigProvider for FileConfigProvider {
    fn load(&self) -> AppResult<MigratorConfig> {
        MigratorConfig::load(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Render validation errors as an indented, field-level tree.
///
/// ```text
/// - destination
///     - access_token
///         length: must not be empty
/// ```
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut output = String::new();
    write_validation_errors(errors, 0, &mut output);
    output
}

fn write_validation_errors(errors: &ValidationErrors, indent: usize, output: &mut String) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());

    for (field, kind) in fields {
        output.push_str(&format!("{}- {}\n", pad(indent), field));

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "invalid value".to_string());
                    output.push_str(&format!("{}{}: {}\n", pad(indent + 1), error.code, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                write_validation_errors(nested, indent + 1, output);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    output.push_str(&format!("{}- [{}]\n", pad(indent + 1), index));
                    write_validation_errors(nested, indent + 2, output);
                }
            }
        }
    }
}

fn pad(indent: usize) -> String {
    " ".repeat(indent * 4)
}
