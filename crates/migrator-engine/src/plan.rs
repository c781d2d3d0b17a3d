//! Immutable snapshot of the source structure to be migrated.

use migrator_core::error::{AppError, ErrorKind};
use migrator_core::result::AppResult;
use migrator_core::types::{SourceAsset, SourceCategory, SourceFolder, SourceStructure};

/// The complete set of categories, folders and assets of one run.
///
/// Counts are derived on demand; the plan never changes after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    categories: Vec<SourceCategory>,
    assets: Vec<SourceAsset>,
}

impl MigrationPlan {
    /// Create a plan from the categories and assets reported by an adapter.
    pub fn new(categories: Vec<SourceCategory>, assets: Vec<SourceAsset>) -> Self {
        Self { categories, assets }
    }

    /// Categories in plan order.
    pub fn categories(&self) -> &[SourceCategory] {
        &self.categories
    }

    /// Assets across all categories and folders, in plan order.
    pub fn assets(&self) -> &[SourceAsset] {
        &self.assets
    }

    /// Number of categories.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Number of folders across every category's folder forest.
    pub fn folder_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|category| category.folders.iter())
            .map(SourceFolder::subtree_size)
            .sum()
    }

    /// Number of assets.
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Check that every asset's category is part of the plan and that its
    /// folder, when set, is reachable from that category's folder tree.
    pub fn validate(&self) -> AppResult<()> {
        for asset in &self.assets {
            let location = &asset.location;
            let category = self
                .categories
                .iter()
                .find(|c| c.id == location.category_id)
                .ok_or_else(|| {
                    AppError::new(
                        ErrorKind::UnresolvedCategory,
                        format!(
                            "Asset \"{}\" belongs to category \"{}\" which is not part of the plan.",
                            asset.id, location.category_id
                        ),
                    )
                })?;

            if let Some(folder_id) = &location.folder_id {
                if !category.folders.iter().any(|f| f.contains(folder_id)) {
                    return Err(AppError::new(
                        ErrorKind::UnresolvedFolder,
                        format!(
                            "Asset \"{}\" is placed in folder \"{}\" which does not exist in category \"{}\".",
                            asset.id, folder_id, location.category_id
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Human-readable summary shown before the user confirms the run.
    pub fn summary(&self, mapping_location: &str) -> String {
        let categories = self.category_count();
        let mut category_line = format!(
            "- {categories} {} will be created",
            plural(categories, "category", "categories")
        );
        if categories > 0 {
            let names: Vec<&str> = self.categories.iter().map(|c| c.name.as_str()).collect();
            category_line.push_str(&format!(": {}", names.join(", ")));
        }

        let folders = self.folder_count();
        let assets = self.asset_count();

        format!(
            "Migration plan:\n{category_line}\n\
             - {folders} {} will be created\n\
             - {assets} {} will be copied\n\
             - the map of old and new file URLs will be saved in {mapping_location}\n",
            plural(folders, "folder", "folders"),
            plural(assets, "file", "files"),
        )
    }
}

impl From<SourceStructure> for MigrationPlan {
    fn from(structure: SourceStructure) -> Self {
        Self::new(structure.categories, structure.assets)
    }
}

fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}
