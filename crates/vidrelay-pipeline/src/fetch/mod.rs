//! Downloaders.
//!
//! Each [`Fetcher`] claims the links it knows how to download. The processor
//! asks them in order and uses the first that says yes, so a catch-all like
//! [`YtDlpFetcher`] belongs last.

mod aliexpress;
mod direct;
mod ytdlp;

use std::path::Path;

use async_trait::async_trait;

use crate::error::PipelineError;

pub use aliexpress::{first_http_source, AliExpressFetcher, AliExpressOptions};
pub use direct::download_to_file;
pub use ytdlp::{YtDlpFetcher, YtDlpOptions};

/// Downloads a video link to a local file.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether this fetcher should download `url`.
    fn handles(&self, url: &str) -> bool;

    /// Download `url` into `dest`.
    ///
    /// On success `dest` exists and holds the video.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), PipelineError>;
}
