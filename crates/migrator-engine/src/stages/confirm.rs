//! Confirm-Migration stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use migrator_core::context::ExecutionContext;
use migrator_core::result::AppResult;
use migrator_core::traits::UserInteraction;

use crate::pipeline::{AbortSignal, Stage};

/// Question asked before anything is written to the destination.
pub const CONFIRM_PROMPT: &str = "Do you want to start the migration? (Y/n) ";

/// Warning shown instead of the prompt in dry-run mode.
pub const DRY_RUN_MESSAGE: &str = "Dry run enabled, migration will not be started";

/// Lets the user stop the run after reviewing the plan.
#[derive(Debug)]
pub struct ConfirmMigrationStage {
    interaction: Arc<dyn UserInteraction>,
    dry_run: bool,
}

impl ConfirmMigrationStage {
    pub fn new(interaction: Arc<dyn UserInteraction>, dry_run: bool) -> Self {
        Self {
            interaction,
            dry_run,
        }
    }
}

#[async_trait]
impl Stage for ConfirmMigrationStage {
    fn name(&self) -> &str {
        "Confirm-Migration"
    }

    async fn run(&self, _ctx: &mut ExecutionContext, abort: &AbortSignal) -> AppResult<()> {
        if self.dry_run {
            self.interaction.warn(DRY_RUN_MESSAGE);
            info!("Dry run, migration not started");
            abort.abort();
            return Ok(());
        }

        let answer = self.interaction.prompt(CONFIRM_PROMPT).await?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            info!(answer = %answer.trim(), "Migration declined");
            abort.abort();
        }
        Ok(())
    }
}
