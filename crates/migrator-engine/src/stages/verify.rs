//! Connection checks run before anything is written to the destination.

use async_trait::async_trait;
use tracing::info;

use migrator_core::context::ExecutionContext;
use migrator_core::result::AppResult;

use crate::keys;
use crate::pipeline::{AbortSignal, Stage};

/// Checks that the source storage is reachable.
#[derive(Debug, Default)]
pub struct VerifyAdapterConnectionStage;

impl VerifyAdapterConnectionStage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for VerifyAdapterConnectionStage {
    fn name(&self) -> &str {
        "Verify-Adapter-Connection"
    }

    fn processing_message(&self) -> Option<&str> {
        Some("Verifying connection to source storage")
    }

    fn success_message(&self) -> Option<&str> {
        Some("Connection to source storage verified")
    }

    fn failure_message(&self) -> Option<&str> {
        Some("Connection to source storage verification failed")
    }

    async fn run(&self, ctx: &mut ExecutionContext, _abort: &AbortSignal) -> AppResult<()> {
        let adapter = ctx.get(keys::ADAPTER)?;
        adapter.verify_connection().await?;
        info!(adapter = adapter.name(), "Source storage reachable");
        Ok(())
    }
}

/// Checks that the destination service accepts the configured credentials.
#[derive(Debug, Default)]
pub struct VerifyDestinationConnectionStage;

impl VerifyDestinationConnectionStage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for VerifyDestinationConnectionStage {
    fn name(&self) -> &str {
        "Verify-Destination-Connection"
    }

    fn processing_message(&self) -> Option<&str> {
        Some("Verifying connection to destination")
    }

    fn success_message(&self) -> Option<&str> {
        Some("Connection to destination verified")
    }

    fn failure_message(&self) -> Option<&str> {
        Some("Connection to destination verification failed")
    }

    async fn run(&self, ctx: &mut ExecutionContext, _abort: &AbortSignal) -> AppResult<()> {
        let client = ctx.get(keys::DESTINATION_CLIENT)?;
        client.verify_connection().await?;
        info!("Destination service reachable");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{FakeAdapter, FakeDestinationClient, sample_structure};
    use migrator_core::error::ErrorKind;
    use migrator_core::traits::{DestinationClient, SourceStorageAdapter};

    #[tokio::test]
    async fn test_adapter_connection() {
        let mut ctx = ExecutionContext::new();
        let adapter: Arc<dyn SourceStorageAdapter> = Arc::new(FakeAdapter::new(sample_structure()));
        ctx.set(keys::ADAPTER, adapter).unwrap();

        VerifyAdapterConnectionStage::new()
            .run(&mut ctx, &AbortSignal::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_adapter_fails() {
        let mut ctx = ExecutionContext::new();
        let adapter: Arc<dyn SourceStorageAdapter> =
            Arc::new(FakeAdapter::new(sample_structure()).unreachable());
        ctx.set(keys::ADAPTER, adapter).unwrap();

        let err = VerifyAdapterConnectionStage::new()
            .run(&mut ctx, &AbortSignal::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Connection);
    }

    #[tokio::test]
    async fn test_unreachable_destination_fails() {
        let mut ctx = ExecutionContext::new();
        let client: Arc<dyn DestinationClient> =
            Arc::new(FakeDestinationClient::new().unreachable());
        ctx.set(keys::DESTINATION_CLIENT, client).unwrap();

        let err = VerifyDestinationConnectionStage::new()
            .run(&mut ctx, &AbortSignal::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Connection);
    }
}
