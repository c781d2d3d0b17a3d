//! The migration command.

use std::path::Path;

use clap::Args;

use migrator_core::context::ExecutionContext;
use migrator_core::error::AppError;
use migrator_engine::{AbortSignal, PipelineOutcome};

use crate::logging;
use crate::output;

/// Arguments for the run command
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Show the migration plan and stop before anything is migrated
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the migration
pub async fn execute(args: &RunArgs, config_path: &Path) -> Result<(), AppError> {
    let preloaded = super::preload_config(config_path);
    let log = logging::init(&logging::settings(preloaded.as_ref()))?;

    output::print_info(&super::banner());
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dry_run = args.dry_run,
        "Asset migrator started"
    );

    let deps = super::dependencies(config_path, preloaded.as_ref());
    let mut pipeline = deps.migration_pipeline(args.dry_run);
    let mut ctx = ExecutionContext::new();

    let interrupt = tokio::spawn(abort_on_shutdown(pipeline.abort_signal()));
    let result = pipeline.run(&mut ctx).await;
    interrupt.abort();

    match result {
        Ok(outcome) => {
            if outcome == PipelineOutcome::Completed {
                output::print_success("Migration completed");
                output::print_info(&format!(
                    "The map of old and new file URLs was saved in {}",
                    deps.mapping.location()
                ));
            }
            tracing::info!(?outcome, "Asset migrator finished");
            if let Err(e) = log.finish_successfully() {
                output::print_warning(&format!("Could not remove the log file: {}", e));
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Migration failed");
            output::print_error(&format!(
                "Migration failed. Log written to {}",
                log.path().display()
            ));
            Err(e)
        }
    }
}

/// Set `abort` once Ctrl+C or SIGTERM arrives, so the run stops after the
/// asset or stage in flight.
async fn abort_on_shutdown(abort: AbortSignal) {
    shutdown_signal().await;
    tracing::warn!("Shutdown signal received");
    output::print_warning("Interrupted, stopping after the current step");
    abort.abort();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
