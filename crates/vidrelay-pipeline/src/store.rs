//! Storage seams for uploads and the sheet queue.

use std::path::Path;

use async_trait::async_trait;
use vidrelay_google::{DriveClient, DriveFile, GoogleError, RowStatus, SheetRow, SheetsClient};

/// Where finished videos are uploaded.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn upload(&self, local_path: &Path, name: &str) -> Result<DriveFile, GoogleError>;
}

/// The queue of rows waiting to be processed.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Rows that have links and no final status yet, in sheet order.
    async fn pending_rows(&self) -> Result<Vec<SheetRow>, GoogleError>;

    /// Record the outcome of a row.
    async fn write_result(
        &self,
        row_index: u32,
        drive_links: &str,
        status: RowStatus,
    ) -> Result<(), GoogleError>;
}

/// Stand-in used when Google credentials could not be loaded.
///
/// Every call fails with the load error, so the service can still start and
/// answer health checks.
#[derive(Debug, Clone)]
pub struct UnavailableGoogle {
    reason: String,
}

impl UnavailableGoogle {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> GoogleError {
        GoogleError::Credentials(self.reason.clone())
    }
}

#[async_trait]
impl VideoStore for UnavailableGoogle {
    async fn upload(&self, _local_path: &Path, _name: &str) -> Result<DriveFile, GoogleError> {
        Err(self.error())
    }
}

#[async_trait]
impl SheetStore for UnavailableGoogle {
    async fn pending_rows(&self) -> Result<Vec<SheetRow>, GoogleError> {
        Err(self.error())
    }

    async fn write_result(
        &self,
        _row_index: u32,
        _drive_links: &str,
        _status: RowStatus,
    ) -> Result<(), GoogleError> {
        Err(self.error())
    }
}

#[async_trait]
impl VideoStore for DriveClient {
    async fn upload(&self, local_path: &Path, name: &str) -> Result<DriveFile, GoogleError> {
        DriveClient::upload(self, local_path, name).await
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn pending_rows(&self) -> Result<Vec<SheetRow>, GoogleError> {
        self.read_pending_rows().await
    }

    async fn write_result(
        &self,
        row_index: u32,
        drive_links: &str,
        status: RowStatus,
    ) -> Result<(), GoogleError> {
        SheetsClient::write_result(self, row_index, drive_links, status).await
    }
}
