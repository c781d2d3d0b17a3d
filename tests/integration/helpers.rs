//! Shared test helpers for integration tests.

use std::sync::Arc;

use migrator_engine::MigratorDependencies;
use migrator_engine::testing::{
    FAKE_ADAPTER, FakeAdapter, FakeClientFactory, FakeDestinationClient, MemoryMappingSink,
    RecordingInteraction, StaticConfigProvider, sample_config,
};
use migrator_storage::AdapterFactory;

/// Fakes wired into a full set of migrator dependencies
pub struct TestApp {
    /// Dependencies handed to the pipelines
    pub deps: MigratorDependencies,
    /// Console calls made during the run
    pub interaction: Arc<RecordingInteraction>,
    /// Destination calls made during the run
    pub client: Arc<FakeDestinationClient>,
    /// Mapping lines written during the run
    pub mapping: Arc<MemoryMappingSink>,
    /// Source adapter, shared with every instance the factory creates
    pub adapter: FakeAdapter,
}

impl TestApp {
    /// Create a test application around a source adapter and destination client
    pub fn new(adapter: FakeAdapter, client: FakeDestinationClient, answer: &str) -> Self {
        let interaction = Arc::new(RecordingInteraction::new().with_answer(answer));
        let client = Arc::new(client);
        let mapping = Arc::new(MemoryMappingSink::new());

        let mut adapters = AdapterFactory::with_defaults();
        let registered = adapter.clone();
        adapters.register(FAKE_ADAPTER, move || Box::new(registered.clone()));

        let deps = MigratorDependencies {
            config: Arc::new(StaticConfigProvider::new(sample_config(FAKE_ADAPTER))),
            adapters,
            clients: Arc::new(FakeClientFactory::new(client.clone())),
            interaction: interaction.clone(),
            mapping: mapping.clone(),
        };

        Self {
            deps,
            interaction,
            client,
            mapping,
            adapter,
        }
    }
}
