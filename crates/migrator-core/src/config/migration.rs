//! Migration behaviour configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// What the folder stage does when a category has no migrated counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedCategoryPolicy {
    /// Log the error, skip the category's folders, continue with the rest.
    #[default]
    SkipCategory,
    /// Fail the stage immediately.
    Abort,
}

/// What the asset stage does when a single asset cannot be migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetFailurePolicy {
    /// Keep copying the remaining assets, fail the stage once all were attempted.
    #[default]
    FailAtEnd,
    /// Fail the stage on the first failed asset.
    Abort,
}

/// Migration behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MigrationConfig {
    /// File name prefix of the URL mapping output.
    #[serde(default = "default_mapping_file_prefix")]
    #[validate(length(min = 1))]
    pub mapping_file_prefix: String,
    /// Folder stage policy for unresolved categories.
    #[serde(default)]
    pub on_unresolved_folder_category: UnresolvedCategoryPolicy,
    /// Asset stage policy for failed assets.
    #[serde(default)]
    pub on_asset_failure: AssetFailurePolicy,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            mapping_file_prefix: default_mapping_file_prefix(),
            on_unresolved_folder_category: UnresolvedCategoryPolicy::default(),
            on_asset_failure: AssetFailurePolicy::default(),
        }
    }
}

fn default_mapping_file_prefix() -> String {
    "migrated_urls".to_string()
}
