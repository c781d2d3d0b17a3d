//! # migrator-engine
//!
//! The migration orchestration engine: an ordered [`Pipeline`] of stages
//! threading an [`ExecutionContext`](migrator_core::ExecutionContext)
//! from configuration loading through category, folder and asset
//! migration.

pub mod builder;
pub mod index;
pub mod keys;
pub mod mapping;
pub mod pipeline;
pub mod plan;
pub mod stages;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use builder::MigratorDependencies;
pub use index::{MigratedCategoryIndex, MigratedFolderIndex};
pub use mapping::UrlMappingWriter;
pub use pipeline::{AbortSignal, Pipeline, PipelineOutcome, PipelineState, Stage};
pub use plan::MigrationPlan;
