//! Configuration and connectivity check.

use std::path::Path;

use migrator_core::context::ExecutionContext;
use migrator_core::error::AppError;

use crate::logging;
use crate::output;

/// Load the configuration and verify both connections
pub async fn execute(config_path: &Path) -> Result<(), AppError> {
    let preloaded = super::preload_config(config_path);
    let log = logging::init(&logging::settings(preloaded.as_ref()))?;

    output::print_info(&super::banner());

    let deps = super::dependencies(config_path, preloaded.as_ref());
    let mut ctx = ExecutionContext::new();

    match deps.check_pipeline().run(&mut ctx).await {
        Ok(_) => {
            output::print_success("Ready to migrate");
            if let Err(e) = log.finish_successfully() {
                output::print_warning(&format!("Could not remove the log file: {}", e));
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Check failed");
            output::print_error(&format!("Check failed. Log written to {}", log.path().display()));
            Err(e)
        }
    }
}
