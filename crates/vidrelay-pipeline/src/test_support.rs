//! In-memory fetchers and stores for tests.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use vidrelay_google::{DriveFile, GoogleError, RowStatus, SheetRow};

use crate::error::PipelineError;
use crate::fetch::Fetcher;
use crate::store::{SheetStore, VideoStore};

/// Writes the URL as file content; fails for URLs containing `broken`.
pub struct FakeFetcher {
    pub prefix: &'static str,
}

#[async_trait]
impl Fetcher for FakeFetcher {
    fn name(&self) -> &str {
        "fake"
    }

    fn handles(&self, url: &str) -> bool {
        url.starts_with(self.prefix)
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), PipelineError> {
        if url.contains("broken") {
            return Err(PipelineError::YtDlpFailed);
        }
        tokio::fs::write(dest, url).await?;
        Ok(())
    }
}

/// Records uploads; uploads named `reject*` fail.
#[derive(Default)]
pub struct RecordingStore {
    /// (uploaded name, file content)
    pub uploads: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl VideoStore for RecordingStore {
    async fn upload(&self, local_path: &Path, name: &str) -> Result<DriveFile, GoogleError> {
        let content = tokio::fs::read_to_string(local_path).await?;
        if name.starts_with("reject") {
            return Err(GoogleError::Api {
                status: 403,
                body: "storageQuotaExceeded".to_string(),
            });
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((name.to_string(), content));
        let id = format!("file-{}", uploads.len());
        Ok(DriveFile {
            web_view_link: Some(format!("https://drive.google.com/file/d/{}/view", id)),
            web_content_link: None,
            id,
        })
    }
}

/// Sheet queue held in memory.
#[derive(Default)]
pub struct MemorySheet {
    pub rows: Vec<SheetRow>,
    pub writes: Mutex<Vec<(u32, String, RowStatus)>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

pub fn row(row_index: u32, name: &str, urls: &[&str]) -> SheetRow {
    SheetRow {
        row_index,
        name: name.to_string(),
        urls: urls.iter().map(|u| u.to_string()).collect(),
        existing_drive_links: String::new(),
        existing_status: String::new(),
    }
}

#[async_trait]
impl SheetStore for MemorySheet {
    async fn pending_rows(&self) -> Result<Vec<SheetRow>, GoogleError> {
        if self.fail_reads {
            return Err(GoogleError::Api {
                status: 404,
                body: "Requested entity was not found.".to_string(),
            });
        }
        Ok(self.rows.clone())
    }

    async fn write_result(
        &self,
        row_index: u32,
        drive_links: &str,
        status: RowStatus,
    ) -> Result<(), GoogleError> {
        if self.fail_writes {
            return Err(GoogleError::Api {
                status: 403,
                body: "The caller does not have permission".to_string(),
            });
        }
        self.writes
            .lock()
            .unwrap()
            .push((row_index, drive_links.to_string(), status));
        Ok(())
    }
}
