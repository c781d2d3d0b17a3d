//! Load-Config stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use migrator_core::config::ConfigProvider;
use migrator_core::context::ExecutionContext;
use migrator_core::result::AppResult;

use crate::keys;
use crate::pipeline::{AbortSignal, Stage};

/// Loads and validates the configuration into the context.
#[derive(Debug)]
pub struct LoadConfigStage {
    provider: Arc<dyn ConfigProvider>,
}

impl LoadConfigStage {
    pub fn new(provider: Arc<dyn ConfigProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Stage for LoadConfigStage {
    fn name(&self) -> &str {
        "Load-Config"
    }

    fn processing_message(&self) -> Option<&str> {
        Some("Checking configuration")
    }

    fn success_message(&self) -> Option<&str> {
        Some("Configuration loaded")
    }

    fn failure_message(&self) -> Option<&str> {
        Some("Failed to load configuration")
    }

    async fn run(&self, ctx: &mut ExecutionContext, _abort: &AbortSignal) -> AppResult<()> {
        let config = self.provider.load()?;
        info!(
            source = %self.provider.describe(),
            adapter = %config.source.adapter_type,
            destination = %config.destination.service_origin,
            "Configuration loaded"
        );
        ctx.set(keys::CONFIG, Arc::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StaticConfigProvider, sample_config};
    use migrator_core::config::FileConfigProvider;
    use migrator_core::error::ErrorKind;

    #[tokio::test]
    async fn test_config_is_stored() {
        let stage = LoadConfigStage::new(Arc::new(StaticConfigProvider::new(sample_config(
            "FakeAdapter",
        ))));
        let mut ctx = ExecutionContext::new();

        stage.run(&mut ctx, &AbortSignal::new()).await.unwrap();

        let config = ctx.get(keys::CONFIG).unwrap();
        assert_eq!(config.source.adapter_type, "FakeAdapter");
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let stage = LoadConfigStage::new(Arc::new(FileConfigProvider::new(
            dir.path().join("config.json"),
        )));
        let mut ctx = ExecutionContext::new();

        let err = stage.run(&mut ctx, &AbortSignal::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(!ctx.contains(keys::CONFIG));
    }
}
