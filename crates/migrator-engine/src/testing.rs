//! In-memory fakes of the engine's collaborators.
//!
//! Available to other crates through the `testing` feature.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use migrator_core::config::destination::DestinationConfig;
use migrator_core::config::logging::LoggingConfig;
use migrator_core::config::migration::MigrationConfig;
use migrator_core::config::source::SourceConfig;
use migrator_core::config::{ConfigProvider, MigratorConfig};
use migrator_core::error::AppError;
use migrator_core::result::AppResult;
use migrator_core::traits::{
    ByteStream, DestinationClient, DestinationClientFactory, MappingSink, SourceStorageAdapter,
    UserInteraction,
};
use migrator_core::types::{
    DestinationLocation, NewAsset, NewCategory, NewFolder, SourceAsset, SourceCategory,
    SourceFolder, SourceLocation, SourceStructure, UploadedAsset,
};

/// Name the fake adapter registers under.
pub const FAKE_ADAPTER: &str = "FakeAdapter";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A console call captured by [`RecordingInteraction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Info(String),
    Warn(String),
    Spinner(String),
    Succeed(String),
    Fail(String),
    Prompt(String),
}

/// Records every console call and answers prompts from a script.
#[derive(Debug, Default)]
pub struct RecordingInteraction {
    notifications: Mutex<Vec<Notification>>,
    answers: Mutex<VecDeque<String>>,
}

impl RecordingInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next prompt.
    pub fn with_answer(self, answer: &str) -> Self {
        lock(&self.answers).push_back(answer.to_string());
        self
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }

    /// Messages of spinner and warning notifications, in order.
    pub fn progress_messages(&self) -> Vec<String> {
        lock(&self.notifications)
            .iter()
            .filter_map(|n| match n {
                Notification::Spinner(m) | Notification::Warn(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, notification: Notification) {
        lock(&self.notifications).push(notification);
    }
}

#[async_trait]
impl UserInteraction for RecordingInteraction {
    fn info(&self, message: &str) {
        self.record(Notification::Info(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.record(Notification::Warn(message.to_string()));
    }

    fn spinner(&self, message: &str) {
        self.record(Notification::Spinner(message.to_string()));
    }

    fn succeed(&self, message: &str) {
        self.record(Notification::Succeed(message.to_string()));
    }

    fn fail(&self, message: &str) {
        self.record(Notification::Fail(message.to_string()));
    }

    async fn prompt(&self, message: &str) -> AppResult<String> {
        self.record(Notification::Prompt(message.to_string()));
        Ok(lock(&self.answers).pop_front().unwrap_or_default())
    }
}

/// Keeps mapping lines in memory.
#[derive(Debug, Default)]
pub struct MemoryMappingSink {
    lines: Mutex<Vec<(String, String)>>,
}

impl MemoryMappingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(String, String)> {
        lock(&self.lines).clone()
    }
}

#[async_trait]
impl MappingSink for MemoryMappingSink {
    async fn write(&self, source_url: &str, destination_url: &str) -> AppResult<()> {
        lock(&self.lines).push((source_url.to_string(), destination_url.to_string()));
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Source adapter serving a fixed structure.
#[derive(Debug, Clone, Default)]
pub struct FakeAdapter {
    structure: SourceStructure,
    failing_downloads: HashSet<String>,
    unreachable: bool,
    loaded_options: Arc<Mutex<Option<serde_json::Value>>>,
    downloads: Arc<Mutex<Vec<String>>>,
}

impl FakeAdapter {
    pub fn new(structure: SourceStructure) -> Self {
        Self {
            structure,
            ..Self::default()
        }
    }

    /// Make `get_asset` fail for a download URL.
    pub fn failing_download(mut self, download_url: &str) -> Self {
        self.failing_downloads.insert(download_url.to_string());
        self
    }

    /// Make `verify_connection` fail.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Options passed to `load_config`, shared across clones.
    pub fn loaded_options(&self) -> Option<serde_json::Value> {
        lock(&self.loaded_options).clone()
    }

    /// Download URLs requested so far, shared across clones.
    pub fn downloads(&self) -> Vec<String> {
        lock(&self.downloads).clone()
    }
}

#[async_trait]
impl SourceStorageAdapter for FakeAdapter {
    fn name(&self) -> &str {
        FAKE_ADAPTER
    }

    async fn load_config(&mut self, options: &serde_json::Value) -> AppResult<()> {
        *lock(&self.loaded_options) = Some(options.clone());
        Ok(())
    }

    async fn verify_connection(&self) -> AppResult<()> {
        if self.unreachable {
            return Err(AppError::connection("Fake source is unreachable."));
        }
        Ok(())
    }

    async fn prepare_migration_plan(&self) -> AppResult<SourceStructure> {
        Ok(self.structure.clone())
    }

    async fn get_asset(&self, download_url: &str) -> AppResult<ByteStream> {
        lock(&self.downloads).push(download_url.to_string());
        if self.failing_downloads.contains(download_url) {
            return Err(AppError::transfer(format!("Cannot download {download_url}")));
        }
        let content = Bytes::from(format!("content of {download_url}"));
        Ok(Box::pin(futures::stream::iter(vec![Ok(content)])))
    }
}

/// A destination call captured by [`FakeDestinationClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    CreateCategory(NewCategory),
    CreateFolder(NewFolder),
    UploadAsset {
        name: String,
        location: DestinationLocation,
        size: usize,
    },
}

/// Destination client issuing sequential ids and recording calls.
#[derive(Debug, Default)]
pub struct FakeDestinationClient {
    calls: Mutex<Vec<ClientCall>>,
    counters: Mutex<HashMap<&'static str, usize>>,
    failing_uploads: HashSet<String>,
    unreachable: bool,
}

impl FakeDestinationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make uploads of the given file name fail.
    pub fn failing_upload(mut self, file_name: &str) -> Self {
        self.failing_uploads.insert(file_name.to_string());
        self
    }

    /// Make `verify_connection` fail.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        lock(&self.calls).clone()
    }

    fn next_id(&self, prefix: &'static str) -> String {
        let mut counters = lock(&self.counters);
        let counter = counters.entry(prefix).or_insert(0);
        *counter += 1;
        format!("{prefix}-{counter}")
    }
}

#[async_trait]
impl DestinationClient for FakeDestinationClient {
    async fn verify_connection(&self) -> AppResult<()> {
        if self.unreachable {
            return Err(AppError::connection("Fake destination is unreachable."));
        }
        Ok(())
    }

    async fn create_category(&self, category: NewCategory) -> AppResult<String> {
        lock(&self.calls).push(ClientCall::CreateCategory(category));
        Ok(self.next_id("category"))
    }

    async fn create_folder(&self, folder: NewFolder) -> AppResult<String> {
        lock(&self.calls).push(ClientCall::CreateFolder(folder));
        Ok(self.next_id("folder"))
    }

    async fn upload_asset(&self, asset: NewAsset) -> AppResult<UploadedAsset> {
        let NewAsset {
            name,
            location,
            mut stream,
        } = asset;

        let mut size = 0;
        while let Some(chunk) = stream.next().await {
            size += chunk?.len();
        }

        lock(&self.calls).push(ClientCall::UploadAsset {
            name: name.clone(),
            location,
            size,
        });

        if self.failing_uploads.contains(&name) {
            return Err(AppError::external_service(format!("Upload of {name} rejected")));
        }

        let id = self.next_id("asset");
        Ok(UploadedAsset {
            url: format!("https://cdn.example.com/{id}/{name}"),
            id,
        })
    }
}

/// Hands out one shared [`FakeDestinationClient`].
#[derive(Debug, Clone)]
pub struct FakeClientFactory {
    client: Arc<FakeDestinationClient>,
}

impl FakeClientFactory {
    pub fn new(client: Arc<FakeDestinationClient>) -> Self {
        Self { client }
    }
}

impl DestinationClientFactory for FakeClientFactory {
    fn create(&self, _config: &DestinationConfig) -> AppResult<Arc<dyn DestinationClient>> {
        Ok(self.client.clone())
    }
}

/// Config provider returning a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigProvider {
    config: MigratorConfig,
}

impl StaticConfigProvider {
    pub fn new(config: MigratorConfig) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn load(&self) -> AppResult<MigratorConfig> {
        Ok(self.config.clone())
    }

    fn describe(&self) -> String {
        "static configuration".to_string()
    }
}

/// Minimal valid configuration naming the given adapter.
pub fn sample_config(adapter_type: &str) -> MigratorConfig {
    MigratorConfig {
        source: SourceConfig {
            adapter_type: adapter_type.to_string(),
            options: serde_json::json!({ "bucket": "assets" }),
        },
        destination: DestinationConfig {
            service_origin: "https://assets.example.com".to_string(),
            access_token: "token".to_string(),
            workspace_id: None,
            timeout_seconds: 60,
        },
        migration: MigrationConfig::default(),
        logging: LoggingConfig::default(),
    }
}

/// One category with a root folder holding a child folder, and one asset
/// at the category root.
pub fn sample_structure() -> SourceStructure {
    SourceStructure {
        categories: vec![SourceCategory {
            id: "c-1".to_string(),
            name: "Category".to_string(),
            allowed_extensions: BTreeSet::new(),
            folders: vec![SourceFolder {
                id: "f-1".to_string(),
                name: "Folder".to_string(),
                child_folders: vec![SourceFolder {
                    id: "f-2".to_string(),
                    name: "Child Folder".to_string(),
                    child_folders: vec![],
                }],
            }],
        }],
        assets: vec![sample_asset("a-1", "logo", SourceLocation::category_root("c-1"))],
    }
}

/// Asset with URLs derived from its id.
pub fn sample_asset(id: &str, name: &str, location: SourceLocation) -> SourceAsset {
    SourceAsset {
        id: id.to_string(),
        name: name.to_string(),
        extension: "png".to_string(),
        download_url: format!("fake://{id}"),
        download_url_to_replace: format!("https://old.example.com/{id}"),
        location,
    }
}
