//! Tab-separated record of source and destination asset URLs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use migrator_core::result::AppResult;
use migrator_core::traits::MappingSink;

/// Appends `source\tdestination` lines to a timestamped text file.
///
/// The file is created on the first write, so a run that never copies an
/// asset leaves nothing behind.
#[derive(Debug)]
pub struct UrlMappingWriter {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl UrlMappingWriter {
    /// Writer for `<directory>/<prefix>_<timestamp>.txt`.
    pub fn new(directory: impl AsRef<Path>, prefix: &str) -> Self {
        let timestamp = Utc::now()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace(':', "-");
        Self::with_path(directory.as_ref().join(format!("{prefix}_{timestamp}.txt")))
    }

    /// Writer for an explicit file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    /// Target file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MappingSink for UrlMappingWriter {
    async fn write(&self, source_url: &str, destination_url: &str) -> AppResult<()> {
        let mut guard = self.file.lock().await;
        if guard.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            *guard = Some(file);
        }

        if let Some(file) = guard.as_mut() {
            file.write_all(format!("{source_url}\t{destination_url}\n").as_bytes())
                .await?;
            file.flush().await?;
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
