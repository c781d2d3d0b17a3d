//! Adapter factory resolving a source adapter implementation by name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use migrator_core::error::AppError;
use migrator_core::result::AppResult;
use migrator_core::traits::storage::SourceStorageAdapter;

use crate::adapters::LocalSourceAdapter;

/// Constructs a fresh, unconfigured adapter instance.
pub type AdapterConstructor = Arc<dyn Fn() -> Box<dyn SourceStorageAdapter> + Send + Sync>;

/// Registry of source adapter constructors keyed by adapter name.
#[derive(Clone, Default)]
pub struct AdapterFactory {
    constructors: BTreeMap<String, AdapterConstructor>,
}

impl AdapterFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory with all built-in adapters registered.
    pub fn with_defaults() -> Self {
        let mut factory = Self::new();
        factory.register(LocalSourceAdapter::NAME, || {
            Box::new(LocalSourceAdapter::new())
        });
        factory
    }

    /// Register an adapter constructor under a name, replacing any previous one.
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn() -> Box<dyn SourceStorageAdapter> + Send + Sync + 'static,
    {
        debug!(adapter = name, "Registered source adapter");
        self.constructors
            .insert(name.to_string(), Arc::new(constructor));
    }

    /// Create an unconfigured adapter by name.
    pub fn create(&self, name: &str) -> AppResult<Box<dyn SourceStorageAdapter>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| AppError::not_found(format!("Adapter \"{name}\" not found.")))?;
        Ok(constructor())
    }

    /// Names of all registered adapters, sorted.
    pub fn names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }
}

impl fmt::Debug for AdapterFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterFactory")
            .field("adapters", &self.names())
            .finish()
    }
}
