//! Migrate-Folders stage.
//!
//! Each category's folder forest is recreated depth-first in pre-order: a
//! folder is created before its children because the children are placed
//! under the parent's destination id. Siblings keep plan order.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{error, info};

use migrator_core::config::migration::UnresolvedCategoryPolicy;
use migrator_core::context::ExecutionContext;
use migrator_core::error::AppError;
use migrator_core::result::AppResult;
use migrator_core::traits::DestinationClient;
use migrator_core::types::{DestinationLocation, NewFolder, SourceFolder};

use crate::index::MigratedFolderIndex;
use crate::keys;
use crate::pipeline::{AbortSignal, Stage};

/// Recreates every category's folder tree in the destination.
///
/// A category whose destination id is unknown is handled according to
/// `migration.on_unresolved_folder_category`.
#[derive(Debug, Default)]
pub struct MigrateFoldersStage;

impl MigrateFoldersStage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for MigrateFoldersStage {
    fn name(&self) -> &str {
        "Migrate-Folders"
    }

    fn processing_message(&self) -> Option<&str> {
        Some("Migrating folders")
    }

    fn success_message(&self) -> Option<&str> {
        Some("Folders migrated")
    }

    fn failure_message(&self) -> Option<&str> {
        Some("Folders migration failed")
    }

    async fn run(&self, ctx: &mut ExecutionContext, _abort: &AbortSignal) -> AppResult<()> {
        let config = ctx.get(keys::CONFIG)?;
        let plan = ctx.get(keys::MIGRATION_PLAN)?;
        let categories = ctx.get(keys::MIGRATED_CATEGORIES)?;
        let client = ctx.get(keys::DESTINATION_CLIENT)?;
        let policy = config.migration.on_unresolved_folder_category;

        let mut index = MigratedFolderIndex::new();
        for category in plan.categories() {
            let destination_category_id = match categories.resolve(&category.id) {
                Ok(id) => id,
                Err(e) if policy == UnresolvedCategoryPolicy::SkipCategory => {
                    error!(
                        source_category_id = %category.id,
                        error = %e,
                        "Skipping folders of unmigrated category"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            for folder in &category.folders {
                migrate_folder(
                    client.as_ref(),
                    &category.id,
                    folder,
                    DestinationLocation::CategoryId(destination_category_id.to_string()),
                    &mut index,
                )
                .await?;
            }
        }

        info!(folders = index.len(), "Folders migrated");
        ctx.set(keys::MIGRATED_FOLDERS, Arc::new(index))
    }
}

/// Create `folder` at `location`, record it, then recurse into its children.
fn migrate_folder<'a>(
    client: &'a dyn DestinationClient,
    category_id: &'a str,
    folder: &'a SourceFolder,
    location: DestinationLocation,
    index: &'a mut MigratedFolderIndex,
) -> BoxFuture<'a, AppResult<()>> {
    async move {
        let destination_id = client
            .create_folder(NewFolder {
                name: folder.name.clone(),
                location,
            })
            .await
            .map_err(|e| {
                AppError::with_source(
                    e.kind,
                    format!("Failed to create folder \"{}\": {}", folder.id, e.message),
                    e,
                )
            })?;

        info!(
            source_category_id = %category_id,
            source_folder_id = %folder.id,
            migrated_folder_id = %destination_id,
            "Folder migrated"
        );
        index.insert(category_id, &folder.id, destination_id.clone())?;

        for child in &folder.child_folders {
            migrate_folder(
                client,
                category_id,
                child,
                DestinationLocation::FolderId(destination_id.clone()),
                index,
            )
            .await?;
        }
        Ok(())
    }
    .boxed()
}
