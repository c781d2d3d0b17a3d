//! Assembles the standard pipelines from their long-lived collaborators.

use std::sync::Arc;

use migrator_core::config::ConfigProvider;
use migrator_core::traits::{DestinationClientFactory, MappingSink, UserInteraction};
use migrator_storage::AdapterFactory;

use crate::pipeline::Pipeline;
use crate::stages::{
    ConfirmMigrationStage, CreateAdapterStage, CreateDestinationClientStage,
    CreateMigrationPlanStage, LoadConfigStage, MigrateAssetsStage, MigrateCategoriesStage,
    MigrateFoldersStage, VerifyAdapterConnectionStage, VerifyDestinationConnectionStage,
};

/// Collaborators injected into the stages.
#[derive(Debug, Clone)]
pub struct MigratorDependencies {
    pub config: Arc<dyn ConfigProvider>,
    pub adapters: AdapterFactory,
    pub clients: Arc<dyn DestinationClientFactory>,
    pub interaction: Arc<dyn UserInteraction>,
    pub mapping: Arc<dyn MappingSink>,
}

impl MigratorDependencies {
    /// The full migration: setup, checks, plan, confirmation, then the
    /// category, folder and asset migration.
    pub fn migration_pipeline(&self, dry_run: bool) -> Pipeline {
        self.check_pipeline()
            .with_stage(CreateMigrationPlanStage::new(
                self.interaction.clone(),
                self.mapping.location(),
            ))
            .with_stage(ConfirmMigrationStage::new(self.interaction.clone(), dry_run))
            .with_stage(MigrateCategoriesStage::new())
            .with_stage(MigrateFoldersStage::new())
            .with_stage(MigrateAssetsStage::new(
                self.interaction.clone(),
                self.mapping.clone(),
            ))
    }

    /// Setup and connection checks only; nothing is written anywhere.
    pub fn check_pipeline(&self) -> Pipeline {
        Pipeline::new(self.interaction.clone())
            .with_stage(LoadConfigStage::new(self.config.clone()))
            .with_stage(CreateAdapterStage::new(self.adapters.clone()))
            .with_stage(CreateDestinationClientStage::new(self.clients.clone()))
            .with_stage(VerifyAdapterConnectionStage::new())
            .with_stage(VerifyDestinationConnectionStage::new())
    }
}
