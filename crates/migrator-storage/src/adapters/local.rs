//! Local filesystem source adapter.
//!
//! Treats a directory tree as a source storage: every top-level directory
//! under the root is a category, nested directories are folders and
//! regular files are assets.

use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use futures::stream::StreamExt;
use serde::Deserialize;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;
use url::Url;
use validator::Validate;

use migrator_core::error::{AppError, ErrorKind};
use migrator_core::result::AppResult;
use migrator_core::traits::storage::{ByteStream, SourceStorageAdapter};
use migrator_core::types::{
    SourceAsset, SourceCategory, SourceFolder, SourceLocation, SourceStructure,
};

const URL_SCHEME: &str = "local://";

/// Options accepted by the local adapter.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LocalAdapterOptions {
    /// Directory whose sub-directories become categories.
    #[validate(length(min = 1, message = "root path must not be empty"))]
    pub root_path: String,
    /// Public base URL the files are currently served from.
    #[validate(url(message = "public URL must be a valid URL"))]
    pub public_url: String,
    /// Allowed extensions per category name; categories not listed accept any extension.
    #[serde(default)]
    pub allowed_extensions: HashMap<String, Vec<String>>,
}

/// Local filesystem source adapter.
#[derive(Debug, Clone, Default)]
pub struct LocalSourceAdapter {
    options: Option<LocalAdapterOptions>,
}

impl LocalSourceAdapter {
    /// Name the adapter is registered under.
    pub const NAME: &'static str = "local";

    /// Create an unconfigured adapter.
    pub fn new() -> Self {
        Self::default()
    }

    fn options(&self) -> AppResult<&LocalAdapterOptions> {
        self.options
            .as_ref()
            .ok_or_else(|| AppError::configuration("Local adapter configuration not loaded."))
    }

    /// Resolve a `local://` download URL to a path inside the root.
    fn resolve(&self, download_url: &str) -> AppResult<PathBuf> {
        let options = self.options()?;
        let relative = download_url.strip_prefix(URL_SCHEME).ok_or_else(|| {
            AppError::validation(format!("Unsupported download URL: {download_url}"))
        })?;

        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::validation(format!(
                "Download URL escapes the storage root: {download_url}"
            )));
        }

        Ok(Path::new(&options.root_path).join(relative))
    }
}

#[async_trait]
impl SourceStorageAdapter for LocalSourceAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn load_config(&mut self, options: &serde_json::Value) -> AppResult<()> {
        let options: LocalAdapterOptions = serde_json::from_value(options.clone())
            .map_err(|e| AppError::configuration(format!("Invalid local adapter options: {e}")))?;
        options.validate()?;

        self.options = Some(options);
        Ok(())
    }

    async fn verify_connection(&self) -> AppResult<()> {
        let root = &self.options()?.root_path;
        let metadata = fs::metadata(root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Connection,
                format!("Failed to access source directory {root}."),
                e,
            )
        })?;

        if !metadata.is_dir() {
            return Err(AppError::connection(format!(
                "Source path {root} is not a directory."
            )));
        }
        Ok(())
    }

    async fn prepare_migration_plan(&self) -> AppResult<SourceStructure> {
        let options = self.options()?.clone();
        tokio::task::spawn_blocking(move || scan_root(&options))
            .await
            .map_err(|e| AppError::internal(format!("Source scan task failed: {e}")))?
    }

    async fn get_asset(&self, download_url: &str) -> AppResult<ByteStream> {
        let path = self.resolve(download_url)?;
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {download_url}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open file: {download_url}"),
                    e,
                )
            }
        })?;

        debug!(download_url, "Opened source asset");
        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(|b| b.into()))))
    }
}

/// A directory entry relevant to the scan, sorted by name.
struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

fn read_sorted(dir: &Path) -> AppResult<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let file_type = entry.file_type()?;
        if !file_type.is_dir() && !file_type.is_file() {
            continue;
        }
        entries.push(Entry {
            name,
            path: entry.path(),
            is_dir: file_type.is_dir(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn scan_root(options: &LocalAdapterOptions) -> AppResult<SourceStructure> {
    let public_url = Url::parse(&options.public_url).map_err(|e| {
        AppError::configuration(format!("Invalid public URL {}: {e}", options.public_url))
    })?;
    let mut structure = SourceStructure::default();

    for entry in read_sorted(Path::new(&options.root_path))? {
        if !entry.is_dir {
            debug!(file = %entry.path.display(), "Skipping file outside of any category");
            continue;
        }

        let allowed_extensions: BTreeSet<String> = options
            .allowed_extensions
            .get(&entry.name)
            .map(|exts| exts.iter().map(|e| e.to_lowercase()).collect())
            .unwrap_or_default();

        let mut scan = CategoryScan {
            category_id: &entry.name,
            public_url: &public_url,
            assets: &mut structure.assets,
        };
        let folders = scan.scan_dir(&entry.path, None)?;

        structure.categories.push(SourceCategory {
            id: entry.name.clone(),
            name: entry.name.clone(),
            allowed_extensions,
            folders,
        });
    }

    Ok(structure)
}

/// Walks a single category directory, collecting its assets.
struct CategoryScan<'a> {
    category_id: &'a str,
    public_url: &'a Url,
    assets: &'a mut Vec<SourceAsset>,
}

impl CategoryScan<'_> {
    /// Scan `dir` (the folder `folder_id`, or the category root when `None`)
    /// and return its child folders.
    fn scan_dir(&mut self, dir: &Path, folder_id: Option<&str>) -> AppResult<Vec<SourceFolder>> {
        let mut folders = Vec::new();

        for entry in read_sorted(dir)? {
            let relative = match folder_id {
                Some(parent) => format!("{parent}/{}", entry.name),
                None => entry.name.clone(),
            };

            if entry.is_dir {
                let child_folders = self.scan_dir(&entry.path, Some(&relative))?;
                folders.push(SourceFolder {
                    id: relative,
                    name: entry.name,
                    child_folders,
                });
            } else {
                let asset = self.asset(&entry.name, &relative, folder_id)?;
                self.assets.push(asset);
            }
        }

        Ok(folders)
    }

    fn asset(
        &self,
        file_name: &str,
        relative: &str,
        folder_id: Option<&str>,
    ) -> AppResult<SourceAsset> {
        let (name, extension) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_string()),
            _ => (file_name.to_string(), String::new()),
        };

        Ok(SourceAsset {
            id: format!("{}/{relative}", self.category_id),
            name,
            extension,
            download_url: format!("{URL_SCHEME}{}/{relative}", self.category_id),
            download_url_to_replace: self.public_url_of(relative)?,
            location: match folder_id {
                Some(folder_id) => SourceLocation::folder(self.category_id, folder_id),
                None => SourceLocation::category_root(self.category_id),
            },
        })
    }

    /// Public URL of a file, each path segment percent-encoded the way it
    /// appears in authored content.
    fn public_url_of(&self, relative: &str) -> AppResult<String> {
        let mut url = self.public_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::configuration(format!(
                    "Public URL {} cannot be used as a base URL.",
                    self.public_url
                ))
            })?
            .pop_if_empty()
            .push(self.category_id)
            .extend(relative.split('/'));
        Ok(url.to_string())
    }
}
