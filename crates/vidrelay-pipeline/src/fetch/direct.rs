//! Streamed HTTP download of a direct media URL.

use std::path::Path;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::PipelineError;

/// Stream `url` into `dest`, returning the number of bytes written.
///
/// Non-success HTTP statuses are errors.
pub async fn download_to_file(
    http: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<u64, PipelineError> {
    let response = http.get(url).send().await?.error_for_status()?;

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    debug!("Downloaded {} bytes from {} to {}", written, url, dest.display());
    Ok(written)
}
