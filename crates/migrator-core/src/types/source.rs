//! Source-side structure reported by a storage adapter.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A top-level asset bucket in the source storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCategory {
    /// Source-local identifier, never reused across categories.
    pub id: String,
    /// Display name, reused for the destination category.
    pub name: String,
    /// File extensions the category accepts.
    #[serde(default)]
    pub allowed_extensions: BTreeSet<String>,
    /// Root folders of the category, in source order.
    #[serde(default)]
    pub folders: Vec<SourceFolder>,
}

/// A node in a category's folder tree.
///
/// Folder ids are unique only within their owning category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFolder {
    /// Identifier unique within the owning category.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Child folders, in source order.
    #[serde(default)]
    pub child_folders: Vec<SourceFolder>,
}

impl SourceFolder {
    /// Number of folders in this subtree, this folder included.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .child_folders
            .iter()
            .map(SourceFolder::subtree_size)
            .sum::<usize>()
    }

    /// Depth-first search for a folder id within this subtree.
    pub fn contains(&self, folder_id: &str) -> bool {
        self.id == folder_id || self.child_folders.iter().any(|f| f.contains(folder_id))
    }
}

/// Where an asset lives in the source structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Owning category.
    pub category_id: String,
    /// Containing folder; `None` means the category root.
    #[serde(default)]
    pub folder_id: Option<String>,
}

impl SourceLocation {
    /// Location at the root of a category.
    pub fn category_root(category_id: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            folder_id: None,
        }
    }

    /// Location inside a folder of a category.
    pub fn folder(category_id: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            folder_id: Some(folder_id.into()),
        }
    }
}

/// A single file to be transferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAsset {
    /// Source-local identifier.
    pub id: String,
    /// File name without extension.
    pub name: String,
    /// File extension without the leading dot.
    pub extension: String,
    /// Address the adapter fetches the content from.
    pub download_url: String,
    /// Address that appears in authored content and must be rewritten.
    pub download_url_to_replace: String,
    /// Where the asset lives in the source structure.
    pub location: SourceLocation,
}

impl SourceAsset {
    /// File name used for the upload: `name.extension`, or just `name`
    /// when the asset has no extension.
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }
}

/// Raw structure returned by an adapter's plan preparation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStructure {
    /// Categories with their folder trees.
    pub categories: Vec<SourceCategory>,
    /// Flat list of assets across all categories and folders.
    pub assets: Vec<SourceAsset>,
}
