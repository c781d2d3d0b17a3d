//! The migration stages, in pipeline order.

pub mod assets;
pub mod categories;
pub mod config;
pub mod confirm;
pub mod folders;
pub mod plan;
pub mod setup;
pub mod verify;

pub use assets::MigrateAssetsStage;
pub use categories::MigrateCategoriesStage;
pub use config::LoadConfigStage;
pub use confirm::ConfirmMigrationStage;
pub use folders::MigrateFoldersStage;
pub use plan::CreateMigrationPlanStage;
pub use setup::{CreateAdapterStage, CreateDestinationClientStage};
pub use verify::{VerifyAdapterConnectionStage, VerifyDestinationConnectionStage};
