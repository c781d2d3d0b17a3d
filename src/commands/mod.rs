//! CLI command definitions and dispatch.

pub mod adapters;
pub mod check;
pub mod run;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use migrator_client::HttpClientFactory;
use migrator_core::config::migration::MigrationConfig;
use migrator_core::config::{DEFAULT_CONFIG_PATH, FileConfigProvider, MigratorConfig};
use migrator_core::error::AppError;
use migrator_engine::{MigratorDependencies, UrlMappingWriter};
use migrator_storage::AdapterFactory;

use crate::output::TerminalInteraction;

/// Asset migrator: copies categories, folders and files to the destination asset service
#[derive(Debug, Parser)]
#[command(name = "asset-migrator", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the migration
    Run(run::RunArgs),
    /// Check the configuration and both connections without migrating
    Check,
    /// List the available source adapters
    Adapters,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Some(Commands::Run(args)) => run::execute(args, &self.config).await,
            None => run::execute(&run::RunArgs::default(), &self.config).await,
            Some(Commands::Check) => check::execute(&self.config).await,
            Some(Commands::Adapters) => adapters::execute(),
        }
    }
}

/// Helper: read the configuration ahead of the pipeline for the settings
/// needed before it starts. Errors are left for Load-Config to report.
pub fn preload_config(config_path: &Path) -> Option<MigratorConfig> {
    MigratorConfig::load(config_path).ok()
}

/// Helper: wire the production collaborators
pub fn dependencies(config_path: &Path, preloaded: Option<&MigratorConfig>) -> MigratorDependencies {
    let prefix = preloaded
        .map(|config| config.migration.mapping_file_prefix.clone())
        .unwrap_or_else(|| MigrationConfig::default().mapping_file_prefix);

    MigratorDependencies {
        config: Arc::new(FileConfigProvider::new(config_path)),
        adapters: AdapterFactory::with_defaults(),
        clients: Arc::new(HttpClientFactory),
        interaction: Arc::new(TerminalInteraction::new()),
        mapping: Arc::new(UrlMappingWriter::new(".", &prefix)),
    }
}

/// Helper: the banner printed at startup
pub fn banner() -> String {
    format!("Asset migrator v{}", env!("CARGO_PKG_VERSION"))
}
