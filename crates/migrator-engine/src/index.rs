//! Lookup tables from source identifiers to destination identifiers.
//!
//! Both indices are append-only for the duration of a run. Folder ids are
//! only unique within their category, so folders are always keyed by the
//! `(category, folder)` pair.

use std::collections::HashMap;

use migrator_core::error::AppError;
use migrator_core::result::AppResult;

/// Source category id to destination category id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigratedCategoryIndex {
    entries: HashMap<String, String>,
}

impl MigratedCategoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a migrated category. Fails if the category was already recorded.
    pub fn insert(
        &mut self,
        source_id: impl Into<String>,
        destination_id: impl Into<String>,
    ) -> AppResult<()> {
        let source_id = source_id.into();
        if self.entries.contains_key(&source_id) {
            return Err(AppError::internal(format!(
                "Category \"{source_id}\" was already migrated."
            )));
        }
        self.entries.insert(source_id, destination_id.into());
        Ok(())
    }

    /// Destination id of a source category, if migrated.
    pub fn get(&self, source_id: &str) -> Option<&str> {
        self.entries.get(source_id).map(String::as_str)
    }

    /// Destination id of a source category, or `UnresolvedCategory`.
    pub fn resolve(&self, source_id: &str) -> AppResult<&str> {
        self.get(source_id)
            .ok_or_else(|| AppError::unresolved_category(source_id))
    }

    /// Number of migrated categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no category was migrated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Source category id to (source folder id to destination folder id).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigratedFolderIndex {
    entries: HashMap<String, HashMap<String, String>>,
}

impl MigratedFolderIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a migrated folder. Fails if the pair was already recorded.
    pub fn insert(
        &mut self,
        category_id: &str,
        folder_id: &str,
        destination_id: impl Into<String>,
    ) -> AppResult<()> {
        let folders = self.entries.entry(category_id.to_string()).or_default();
        if folders.contains_key(folder_id) {
            return Err(AppError::internal(format!(
                "Folder \"{folder_id}\" of category \"{category_id}\" was already migrated."
            )));
        }
        folders.insert(folder_id.to_string(), destination_id.into());
        Ok(())
    }

    /// Destination id of a source folder, if migrated.
    pub fn get(&self, category_id: &str, folder_id: &str) -> Option<&str> {
        self.entries
            .get(category_id)
            .and_then(|folders| folders.get(folder_id))
            .map(String::as_str)
    }

    /// Destination id of a source folder, or `UnresolvedFolder`.
    pub fn resolve(&self, category_id: &str, folder_id: &str) -> AppResult<&str> {
        self.get(category_id, folder_id)
            .ok_or_else(|| AppError::unresolved_folder(category_id, folder_id))
    }

    /// Number of folders migrated within a category.
    pub fn category_len(&self, category_id: &str) -> usize {
        self.entries.get(category_id).map_or(0, HashMap::len)
    }

    /// Total number of migrated folders.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Whether no folder was migrated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
