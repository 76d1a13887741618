//! Single-link processing: download, upload, clean up.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use vidrelay_google::DriveFile;

use crate::error::PipelineError;
use crate::fetch::Fetcher;
use crate::filename::sanitize_filename;
use crate::store::VideoStore;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedVideo {
    pub drive_file: DriveFile,
    /// Name the file was uploaded under.
    pub filename: String,
}

/// Downloads links with the first matching fetcher and uploads the result.
pub struct VideoProcessor {
    fetchers: Vec<Arc<dyn Fetcher>>,
    store: Arc<dyn VideoStore>,
    work_dir: PathBuf,
}

impl VideoProcessor {
    /// Create a processor. Fetchers are tried in order.
    pub fn new(
        fetchers: Vec<Arc<dyn Fetcher>>,
        store: Arc<dyn VideoStore>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetchers,
            store,
            work_dir: work_dir.into(),
        }
    }

    fn fetcher_for(&self, url: &str) -> Option<&Arc<dyn Fetcher>> {
        self.fetchers.iter().find(|f| f.handles(url))
    }

    /// Download `url` and upload it under `desired_name` (sanitized, random
    /// when absent or blank).
    pub async fn process_one_url(
        &self,
        url: &str,
        desired_name: Option<&str>,
    ) -> Result<ProcessedVideo, PipelineError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(PipelineError::EmptyUrl);
        }

        let filename = sanitize_filename(desired_name.unwrap_or_default());
        let fetcher = self
            .fetcher_for(url)
            .ok_or_else(|| PipelineError::NoFetcher(url.to_string()))?;

        tokio::fs::create_dir_all(&self.work_dir).await?;
        let local = self.work_dir.join(format!("{}.mp4", Uuid::new_v4()));

        info!("Processing {} with {} as {}", url, fetcher.name(), filename);

        if let Err(e) = fetcher.fetch(url, &local).await {
            remove_local(&local).await;
            return Err(e);
        }

        let uploaded = self.store.upload(&local, &filename).await;
        remove_local(&local).await;

        let drive_file = uploaded?;
        info!("Uploaded {} as {} ({})", url, filename, drive_file.id);
        Ok(ProcessedVideo {
            drive_file,
            filename,
        })
    }
}

async fn remove_local(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not delete {}: {}", path.display(), e),
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
