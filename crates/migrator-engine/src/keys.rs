//! Context keys shared by the migration stages.

use std::sync::Arc;

use migrator_core::config::MigratorConfig;
use migrator_core::context::ContextKey;
use migrator_core::traits::{DestinationClient, SourceStorageAdapter};

use crate::index::{MigratedCategoryIndex, MigratedFolderIndex};
use crate::plan::MigrationPlan;

/// Validated configuration, set by Load-Config.
pub const CONFIG: ContextKey<Arc<MigratorConfig>> = ContextKey::new("MigratorConfig");

/// Configured source adapter, set by Create-Adapter.
pub const ADAPTER: ContextKey<Arc<dyn SourceStorageAdapter>> = ContextKey::new("Adapter");

/// Destination client, set by Create-Destination-Client.
pub const DESTINATION_CLIENT: ContextKey<Arc<dyn DestinationClient>> =
    ContextKey::new("DestinationClient");

/// Migration plan, set by Create-Migration-Plan.
pub const MIGRATION_PLAN: ContextKey<Arc<MigrationPlan>> = ContextKey::new("MigrationPlan");

/// Category index, set by Migrate-Categories.
pub const MIGRATED_CATEGORIES: ContextKey<Arc<MigratedCategoryIndex>> =
    ContextKey::new("MigratedCategories");

/// Folder index, set by Migrate-Folders.
pub const MIGRATED_FOLDERS: ContextKey<Arc<MigratedFolderIndex>> =
    ContextKey::new("MigratedFolders");
