//! Sink for source-to-destination URL pairs.

use async_trait::async_trait;

use crate::result::AppResult;

/// Records old/new URL pairs for post-migration link rewriting.
#[async_trait]
pub trait MappingSink: Send + Sync + std::fmt::Debug {
    /// Record that `source_url` is now served from `destination_url`.
    async fn write(&self, source_url: &str, destination_url: &str) -> AppResult<()>;

    /// Human-readable location of the recorded mapping.
    fn location(&self) -> String;
}
