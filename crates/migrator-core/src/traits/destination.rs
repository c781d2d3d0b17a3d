//! Destination asset service client trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::destination::DestinationConfig;
use crate::result::AppResult;
use crate::types::{NewAsset, NewCategory, NewFolder, UploadedAsset};

/// Creates categories, folders and assets in the destination service.
#[async_trait]
pub trait DestinationClient: Send + Sync + std::fmt::Debug + 'static {
    /// Check that the destination service is reachable and accepts the credentials.
    async fn verify_connection(&self) -> AppResult<()>;

    /// Create a category, returning its destination identifier.
    async fn create_category(&self, category: NewCategory) -> AppResult<String>;

    /// Create a folder, returning its destination identifier.
    async fn create_folder(&self, folder: NewFolder) -> AppResult<String>;

    /// Upload an asset's content.
    async fn upload_asset(&self, asset: NewAsset) -> AppResult<UploadedAsset>;
}

/// Builds a configured destination client.
pub trait DestinationClientFactory: Send + Sync + std::fmt::Debug {
    /// Create a client for the configured destination service.
    fn create(&self, config: &DestinationConfig) -> AppResult<Arc<dyn DestinationClient>>;
}
