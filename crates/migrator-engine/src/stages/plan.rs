//! Create-Migration-Plan stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use migrator_core::context::ExecutionContext;
use migrator_core::result::AppResult;
use migrator_core::traits::UserInteraction;

use crate::keys;
use crate::pipeline::{AbortSignal, Stage};
use crate::plan::MigrationPlan;

/// Asks the source adapter for its structure and shows the resulting plan.
#[derive(Debug)]
pub struct CreateMigrationPlanStage {
    interaction: Arc<dyn UserInteraction>,
    mapping_location: String,
}

impl CreateMigrationPlanStage {
    /// `mapping_location` is where the URL map will be written.
    pub fn new(interaction: Arc<dyn UserInteraction>, mapping_location: impl Into<String>) -> Self {
        Self {
            interaction,
            mapping_location: mapping_location.into(),
        }
    }
}

#[async_trait]
impl Stage for CreateMigrationPlanStage {
    fn name(&self) -> &str {
        "Create-Migration-Plan"
    }

    fn processing_message(&self) -> Option<&str> {
        Some("Creating migration plan")
    }

    fn success_message(&self) -> Option<&str> {
        Some("Migration plan created")
    }

    fn failure_message(&self) -> Option<&str> {
        Some("Migration plan creation failed")
    }

    async fn run(&self, ctx: &mut ExecutionContext, _abort: &AbortSignal) -> AppResult<()> {
        let adapter = ctx.get(keys::ADAPTER)?;
        let plan = MigrationPlan::from(adapter.prepare_migration_plan().await?);
        plan.validate()?;

        info!(
            categories = plan.category_count(),
            folders = plan.folder_count(),
            assets = plan.asset_count(),
            "Migration plan created"
        );
        self.interaction.info(&plan.summary(&self.mapping_location));

        ctx.set(keys::MIGRATION_PLAN, Arc::new(plan))
    }
}
