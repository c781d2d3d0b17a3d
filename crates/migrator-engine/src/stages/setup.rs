//! Create-Adapter and Create-Destination-Client stages.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use migrator_core::context::ExecutionContext;
use migrator_core::result::AppResult;
use migrator_core::traits::{DestinationClientFactory, SourceStorageAdapter};
use migrator_storage::AdapterFactory;

use crate::keys;
use crate::pipeline::{AbortSignal, Stage};

/// Resolves the configured source adapter by name and configures it.
#[derive(Debug)]
pub struct CreateAdapterStage {
    adapters: AdapterFactory,
}

impl CreateAdapterStage {
    pub fn new(adapters: AdapterFactory) -> Self {
        Self { adapters }
    }
}

#[async_trait]
impl Stage for CreateAdapterStage {
    fn name(&self) -> &str {
        "Create-Adapter"
    }

    fn processing_message(&self) -> Option<&str> {
        Some("Creating adapter")
    }

    fn success_message(&self) -> Option<&str> {
        Some("Adapter created")
    }

    fn failure_message(&self) -> Option<&str> {
        Some("Adapter creation failed")
    }

    async fn run(&self, ctx: &mut ExecutionContext, _abort: &AbortSignal) -> AppResult<()> {
        let config = ctx.get(keys::CONFIG)?;

        let mut adapter = self.adapters.create(&config.source.adapter_type)?;
        adapter.load_config(&config.source.options).await?;
        info!(adapter = adapter.name(), "Source adapter configured");

        let adapter: Arc<dyn SourceStorageAdapter> = Arc::from(adapter);
        ctx.set(keys::ADAPTER, adapter)
    }
}

/// Builds the destination client from the destination settings.
#[derive(Debug)]
pub struct CreateDestinationClientStage {
    clients: Arc<dyn DestinationClientFactory>,
}

impl CreateDestinationClientStage {
    pub fn new(clients: Arc<dyn DestinationClientFactory>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl Stage for CreateDestinationClientStage {
    fn name(&self) -> &str {
        "Create-Destination-Client"
    }

    fn processing_message(&self) -> Option<&str> {
        Some("Creating destination client")
    }

    fn success_message(&self) -> Option<&str> {
        Some("Destination client created")
    }

    fn failure_message(&self) -> Option<&str> {
        Some("Destination client creation failed")
    }

    async fn run(&self, ctx: &mut ExecutionContext, _abort: &AbortSignal) -> AppResult<()> {
        let config = ctx.get(keys::CONFIG)?;
        let client = self.clients.create(&config.destination)?;
        info!(
            origin = %config.destination.service_origin,
            workspace = config.destination.workspace_id.as_deref().unwrap_or("default"),
            "Destination client created"
        );
        ctx.set(keys::DESTINATION_CLIENT, client)
    }
}
