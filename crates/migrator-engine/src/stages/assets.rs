//! Migrate-Assets stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use migrator_core::config::migration::AssetFailurePolicy;
use migrator_core::context::ExecutionContext;
use migrator_core::error::{AppError, ErrorKind};
use migrator_core::result::AppResult;
use migrator_core::traits::{DestinationClient, MappingSink, SourceStorageAdapter, UserInteraction};
use migrator_core::types::{DestinationLocation, NewAsset, SourceAsset, SourceLocation, UploadedAsset};

use crate::index::{MigratedCategoryIndex, MigratedFolderIndex};
use crate::keys;
use crate::pipeline::{AbortSignal, Stage};

/// Copies every planned asset and records its old and new URL.
///
/// Assets are copied one at a time in plan order. A failed asset does not
/// stop the others unless `migration.on_asset_failure` is `abort`; the
/// stage still fails once every asset has been attempted.
#[derive(Debug)]
pub struct MigrateAssetsStage {
    interaction: Arc<dyn UserInteraction>,
    mapping: Arc<dyn MappingSink>,
}

impl MigrateAssetsStage {
    pub fn new(interaction: Arc<dyn UserInteraction>, mapping: Arc<dyn MappingSink>) -> Self {
        Self {
            interaction,
            mapping,
        }
    }

    async fn migrate_asset(
        &self,
        asset: &SourceAsset,
        location: DestinationLocation,
        adapter: &dyn SourceStorageAdapter,
        client: &dyn DestinationClient,
    ) -> AppResult<UploadedAsset> {
        let stream = adapter.get_asset(&asset.download_url).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Transfer,
                format!("Failed to download {}: {}", asset.download_url, e.message),
                e,
            )
        })?;

        let uploaded = client
            .upload_asset(NewAsset {
                name: asset.file_name(),
                location,
                stream,
            })
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Transfer,
                    format!("Failed to upload {}: {}", asset.file_name(), e.message),
                    e,
                )
            })?;

        self.mapping
            .write(&asset.download_url_to_replace, &uploaded.url)
            .await?;
        Ok(uploaded)
    }
}

/// Destination location of an asset.
///
/// The category id is dropped once a folder resolves, since the folder
/// implies its category.
pub fn resolve_destination(
    location: &SourceLocation,
    categories: &MigratedCategoryIndex,
    folders: &MigratedFolderIndex,
) -> AppResult<DestinationLocation> {
    let category_id = categories.resolve(&location.category_id)?;
    match &location.folder_id {
        None => Ok(DestinationLocation::CategoryId(category_id.to_string())),
        Some(folder_id) => folders
            .resolve(&location.category_id, folder_id)
            .map(|id| DestinationLocation::FolderId(id.to_string())),
    }
}

/// Progress line shown before copying the asset at `index`.
pub fn progress_message(index: usize, total: usize) -> String {
    let percent = if total == 0 { 0 } else { index * 100 / total };
    format!(
        "Copying assets: {percent}% (processing file {} of {total})",
        index + 1
    )
}

#[async_trait]
impl Stage for MigrateAssetsStage {
    fn name(&self) -> &str {
        "Migrate-Assets"
    }

    fn processing_message(&self) -> Option<&str> {
        Some("Migrating assets")
    }

    fn success_message(&self) -> Option<&str> {
        Some("Assets migrated")
    }

    fn failure_message(&self) -> Option<&str> {
        Some("Assets migration failed")
    }

    async fn run(&self, ctx: &mut ExecutionContext, abort: &AbortSignal) -> AppResult<()> {
        let config = ctx.get(keys::CONFIG)?;
        let plan = ctx.get(keys::MIGRATION_PLAN)?;
        let categories = ctx.get(keys::MIGRATED_CATEGORIES)?;
        let folders = ctx.get(keys::MIGRATED_FOLDERS)?;
        let adapter = ctx.get(keys::ADAPTER)?;
        let client = ctx.get(keys::DESTINATION_CLIENT)?;
        let policy = config.migration.on_asset_failure;

        let total = plan.asset_count();
        let mut failed = 0usize;

        for (index, asset) in plan.assets().iter().enumerate() {
            if abort.is_aborted() {
                warn!(copied = index, total, "Asset migration interrupted");
                break;
            }

            let progress = progress_message(index, total);
            if failed == 0 {
                self.interaction.spinner(&progress);
            } else {
                self.interaction.warn(&progress);
            }

            info!(source_asset_id = %asset.id, "Migrating asset");
            let result = match resolve_destination(&asset.location, &categories, &folders) {
                Ok(location) => {
                    self.migrate_asset(asset, location, adapter.as_ref(), client.as_ref())
                        .await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(uploaded) => {
                    info!(
                        source_asset_id = %asset.id,
                        migrated_asset_id = %uploaded.id,
                        "Asset migrated"
                    );
                }
                Err(e) => {
                    error!(
                        source_asset_id = %asset.id,
                        name = %asset.file_name(),
                        kind = %e.kind,
                        error = %e.message,
                        "Asset migration failed"
                    );
                    if policy == AssetFailurePolicy::Abort {
                        return Err(e);
                    }
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(AppError::transfer(format!(
                "{failed} of {total} assets failed to migrate."
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        ClientCall, FakeAdapter, FakeDestinationClient, MemoryMappingSink, RecordingInteraction,
        sample_asset, sample_config, sample_structure,
    };
    use crate::plan::MigrationPlan;
    use migrator_core::types::SourceStructure;

    struct Harness {
        interaction: Arc<RecordingInteraction>,
        mapping: Arc<MemoryMappingSink>,
        adapter: FakeAdapter,
        client: Arc<FakeDestinationClient>,
        ctx: ExecutionContext,
    }

    impl Harness {
        fn new(
            assets: Vec<SourceAsset>,
            adapter: impl FnOnce(FakeAdapter) -> FakeAdapter,
            client: FakeDestinationClient,
            policy: AssetFailurePolicy,
        ) -> Self {
            let structure = SourceStructure {
                categories: sample_structure().categories,
                assets,
            };
            let adapter = adapter(FakeAdapter::new(structure.clone()));
            let client = Arc::new(client);

            let mut categories = MigratedCategoryIndex::new();
            categories.insert("c-1", "DC").unwrap();
            let mut folders = MigratedFolderIndex::new();
            folders.insert("c-1", "f-1", "DF1").unwrap();

            let mut config = sample_config("FakeAdapter");
            config.migration.on_asset_failure = policy;

            let mut ctx = ExecutionContext::new();
            ctx.set(keys::CONFIG, Arc::new(config)).unwrap();
            ctx.set(keys::MIGRATION_PLAN, Arc::new(MigrationPlan::from(structure)))
                .unwrap();
            ctx.set(keys::MIGRATED_CATEGORIES, Arc::new(categories))
                .unwrap();
            ctx.set(keys::MIGRATED_FOLDERS, Arc::new(folders)).unwrap();
            let dyn_adapter: Arc<dyn SourceStorageAdapter> = Arc::new(adapter.clone());
            ctx.set(keys::ADAPTER, dyn_adapter).unwrap();
            let dyn_client: Arc<dyn DestinationClient> = client.clone();
            ctx.set(keys::DESTINATION_CLIENT, dyn_client).unwrap();

            Self {
                interaction: Arc::new(RecordingInteraction::new()),
                mapping: Arc::new(MemoryMappingSink::new()),
                adapter,
                client,
                ctx,
            }
        }

        async fn run(&mut self) -> AppResult<()> {
            self.run_with(&AbortSignal::new()).await
        }

        async fn run_with(&mut self, abort: &AbortSignal) -> AppResult<()> {
            MigrateAssetsStage::new(self.interaction.clone(), self.mapping.clone())
                .run(&mut self.ctx, abort)
                .await
        }

        fn uploads(&self) -> Vec<(String, DestinationLocation)> {
            self.client
                .calls()
                .into_iter()
                .filter_map(|call| match call {
                    ClientCall::UploadAsset { name, location, .. } => Some((name, location)),
                    _ => None,
                })
                .collect()
        }
    }

    fn root_asset(id: &str) -> SourceAsset {
        sample_asset(id, id, SourceLocation::category_root("c-1"))
    }

    #[test]
    fn test_resolve_destination() {
        let mut categories = MigratedCategoryIndex::new();
        categories.insert("c-1", "DC").unwrap();
        let mut folders = MigratedFolderIndex::new();
        folders.insert("c-1", "f-1", "DF").unwrap();

        assert_eq!(
            resolve_destination(&SourceLocation::category_root("c-1"), &categories, &folders)
                .unwrap(),
            DestinationLocation::CategoryId("DC".to_string())
        );
        assert_eq!(
            resolve_destination(&SourceLocation::folder("c-1", "f-1"), &categories, &folders)
                .unwrap(),
            DestinationLocation::FolderId("DF".to_string())
        );

        let err = resolve_destination(&SourceLocation::category_root("c-9"), &categories, &folders)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedCategory);

        let err = resolve_destination(&SourceLocation::folder("c-1", "f-9"), &categories, &folders)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedFolder);
    }

    #[test]
    fn test_progress_message_floors() {
        assert_eq!(progress_message(0, 2), "Copying assets: 0% (processing file 1 of 2)");
        assert_eq!(progress_message(1, 2), "Copying assets: 50% (processing file 2 of 2)");
        assert_eq!(progress_message(2, 3), "Copying assets: 66% (processing file 3 of 3)");
    }

    #[tokio::test]
    async fn test_assets_are_copied_and_mapped() {
        let mut harness = Harness::new(
            vec![
                root_asset("a-1"),
                sample_asset("a-2", "photo", SourceLocation::folder("c-1", "f-1")),
            ],
            |adapter| adapter,
            FakeDestinationClient::new(),
            AssetFailurePolicy::FailAtEnd,
        );

        harness.run().await.unwrap();

        assert_eq!(
            harness.interaction.progress_messages(),
            vec![
                "Copying assets: 0% (processing file 1 of 2)",
                "Copying assets: 50% (processing file 2 of 2)",
            ]
        );
        assert_eq!(
            harness.uploads(),
            vec![
                ("a-1.png".to_string(), DestinationLocation::CategoryId("DC".to_string())),
                ("photo.png".to_string(), DestinationLocation::FolderId("DF1".to_string())),
            ]
        );
        assert_eq!(
            harness.mapping.lines(),
            vec![
                (
                    "https://old.example.com/a-1".to_string(),
                    "https://cdn.example.com/asset-1/a-1.png".to_string()
                ),
                (
                    "https://old.example.com/a-2".to_string(),
                    "https://cdn.example.com/asset-2/photo.png".to_string()
                ),
            ]
        );
        assert_eq!(harness.adapter.downloads(), vec!["fake://a-1", "fake://a-2"]);
    }

    #[tokio::test]
    async fn test_failed_upload_does_not_stop_other_assets() {
        let mut harness = Harness::new(
            vec![root_asset("a-1"), root_asset("a-2"), root_asset("a-3")],
            |adapter| adapter,
            FakeDestinationClient::new().failing_upload("a-2.png"),
            AssetFailurePolicy::FailAtEnd,
        );

        let err = harness.run().await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Transfer);
        assert_eq!(err.message, "1 of 3 assets failed to migrate.");
        assert_eq!(harness.uploads().len(), 3);
        assert_eq!(harness.mapping.lines().len(), 2);
        assert_eq!(
            harness.interaction.notifications().last(),
            Some(&crate::testing::Notification::Warn(
                "Copying assets: 66% (processing file 3 of 3)".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_unresolved_folder_and_failed_download_are_counted() {
        let mut harness = Harness::new(
            vec![
                sample_asset("a-1", "lost", SourceLocation::folder("c-1", "missing")),
                root_asset("a-2"),
                root_asset("a-3"),
            ],
            |adapter| adapter.failing_download("fake://a-2"),
            FakeDestinationClient::new(),
            AssetFailurePolicy::FailAtEnd,
        );

        let err = harness.run().await.unwrap_err();

        assert_eq!(err.message, "2 of 3 assets failed to migrate.");
        assert_eq!(harness.adapter.downloads(), vec!["fake://a-2", "fake://a-3"]);
        assert_eq!(harness.uploads().len(), 1);
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_failure() {
        let mut harness = Harness::new(
            vec![root_asset("a-1"), root_asset("a-2"), root_asset("a-3")],
            |adapter| adapter,
            FakeDestinationClient::new().failing_upload("a-2.png"),
            AssetFailurePolicy::Abort,
        );

        let err = harness.run().await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Transfer);
        assert_eq!(harness.uploads().len(), 2);
        assert_eq!(harness.mapping.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_no_assets() {
        let mut harness = Harness::new(
            vec![],
            |adapter| adapter,
            FakeDestinationClient::new(),
            AssetFailurePolicy::FailAtEnd,
        );

        harness.run().await.unwrap();
        assert!(harness.interaction.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_interrupted_run_copies_nothing_more() {
        let mut harness = Harness::new(
            vec![root_asset("a-1"), root_asset("a-2")],
            |adapter| adapter,
            FakeDestinationClient::new(),
            AssetFailurePolicy::FailAtEnd,
        );
        let abort = AbortSignal::new();
        abort.abort();

        harness.run_with(&abort).await.unwrap();

        assert!(harness.adapter.downloads().is_empty());
        assert!(harness.uploads().is_empty());
        assert!(harness.mapping.lines().is_empty());
    }
}
