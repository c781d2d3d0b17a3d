//! Destination-side request and response types.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::traits::storage::ByteStream;

/// Where a folder or asset is created in the destination service.
///
/// Once a folder is known the category is implied by it, so the two
/// variants are exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DestinationLocation {
    /// The root of a destination category.
    CategoryId(String),
    /// A destination folder.
    FolderId(String),
}

impl fmt::Display for DestinationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CategoryId(id) => write!(f, "category {id}"),
            Self::FolderId(id) => write!(f, "folder {id}"),
        }
    }
}

/// Request to create a destination category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    /// Category name.
    pub name: String,
    /// File extensions the category accepts.
    pub allowed_extensions: BTreeSet<String>,
}

/// Request to create a destination folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFolder {
    /// Folder name.
    pub name: String,
    /// Parent location.
    pub location: DestinationLocation,
}

/// Request to upload an asset.
pub struct NewAsset {
    /// File name including extension.
    pub name: String,
    /// Target location.
    pub location: DestinationLocation,
    /// Content to upload.
    pub stream: ByteStream,
}

impl fmt::Debug for NewAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAsset")
            .field("name", &self.name)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Destination asset identifier.
    pub id: String,
    /// Public URL of the uploaded asset.
    pub url: String,
}
