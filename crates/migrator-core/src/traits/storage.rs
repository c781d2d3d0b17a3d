//! Source storage adapter trait for pluggable source backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;
use crate::types::SourceStructure;

/// A byte stream type used for transferring file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Reads structure and content from a source digital-asset backend.
///
/// Adapters are constructed empty by the adapter factory and configured
/// through [`SourceStorageAdapter::load_config`] before any other call.
#[async_trait]
pub trait SourceStorageAdapter: Send + Sync + std::fmt::Debug + 'static {
    /// Adapter name as registered in the factory (e.g. `"local"`).
    fn name(&self) -> &str;

    /// Validate and apply adapter-specific options.
    async fn load_config(&mut self, options: &serde_json::Value) -> AppResult<()>;

    /// Check that the source storage is reachable with the loaded options.
    async fn verify_connection(&self) -> AppResult<()>;

    /// Analyze the source storage and report its categories, folders and assets.
    async fn prepare_migration_plan(&self) -> AppResult<SourceStructure>;

    /// Open the content of an asset for reading.
    async fn get_asset(&self, download_url: &str) -> AppResult<ByteStream>;
}
