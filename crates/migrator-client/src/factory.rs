//! Factory producing HTTP destination clients from configuration.

use std::sync::Arc;

use migrator_core::config::destination::DestinationConfig;
use migrator_core::result::AppResult;
use migrator_core::traits::destination::{DestinationClient, DestinationClientFactory};

use crate::http::HttpDestinationClient;

/// Builds [`HttpDestinationClient`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpClientFactory;

impl DestinationClientFactory for HttpClientFactory {
    fn create(&self, config: &DestinationConfig) -> AppResult<Arc<dyn DestinationClient>> {
        Ok(Arc::new(HttpDestinationClient::new(config)?))
    }
}
