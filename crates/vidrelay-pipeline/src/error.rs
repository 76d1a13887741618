//! Pipeline errors.
//!
//! The `Display` text is what API clients see in `detail` and what gets
//! recorded per link in sync reports.

use thiserror::Error;
use vidrelay_browser::{BrowserError, CdpError};
use vidrelay_google::GoogleError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("URL is empty")]
    EmptyUrl,

    #[error("No downloader handles {0}")]
    NoFetcher(String),

    #[error("yt-dlp failed")]
    YtDlpFailed,

    #[error("AliExpress video not found")]
    AliExpressVideoNotFound,

    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Google(#[from] GoogleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CdpError> for PipelineError {
    fn from(e: CdpError) -> Self {
        PipelineError::Browser(e.into())
    }
}
