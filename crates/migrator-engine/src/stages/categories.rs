//! Migrate-Categories stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use migrator_core::context::ExecutionContext;
use migrator_core::result::AppResult;
use migrator_core::types::NewCategory;

use crate::index::MigratedCategoryIndex;
use crate::keys;
use crate::pipeline::{AbortSignal, Stage};

/// Creates every planned category in the destination, in plan order.
///
/// Fails on the first rejected category; categories created before it are
/// left in place.
#[derive(Debug, Default)]
pub struct MigrateCategoriesStage;

impl MigrateCategoriesStage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for MigrateCategoriesStage {
    fn name(&self) -> &str {
        "Migrate-Categories"
    }

    fn processing_message(&self) -> Option<&str> {
        Some("Migrating categories")
    }

    fn success_message(&self) -> Option<&str> {
        Some("Categories migrated")
    }

    fn failure_message(&self) -> Option<&str> {
        Some("Categories migration failed")
    }

    async fn run(&self, ctx: &mut ExecutionContext, _abort: &AbortSignal) -> AppResult<()> {
        let plan = ctx.get(keys::MIGRATION_PLAN)?;
        let client = ctx.get(keys::DESTINATION_CLIENT)?;

        let mut index = MigratedCategoryIndex::new();
        for category in plan.categories() {
            let destination_id = client
                .create_category(NewCategory {
                    name: category.name.clone(),
                    allowed_extensions: category.allowed_extensions.clone(),
                })
                .await?;

            info!(
                source_category_id = %category.id,
                migrated_category_id = %destination_id,
                "Category migrated"
            );
            index.insert(category.id.as_str(), destination_id)?;
        }

        ctx.set(keys::MIGRATED_CATEGORIES, Arc::new(index))
    }
}
