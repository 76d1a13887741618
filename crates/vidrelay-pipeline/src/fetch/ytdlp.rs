//! yt-dlp subprocess downloader.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use vidrelay_config::DownloaderConfig;

use super::Fetcher;
use crate::error::PipelineError;

const INSTAGRAM_HOST: &str = "instagram.com";
const STDERR_TAIL: usize = 2000;

/// Options for running yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlpOptions {
    /// yt-dlp executable.
    pub binary: PathBuf,
    /// Format selector passed to `-f`.
    pub format: String,
    pub timeout: Duration,
    /// Netscape cookie file mounted read-only; copied before use.
    pub cookies_secret_path: PathBuf,
    /// Environment variable holding Instagram cookies.
    pub cookies_env: String,
}

impl From<&DownloaderConfig> for YtDlpOptions {
    fn from(config: &DownloaderConfig) -> Self {
        Self {
            binary: PathBuf::from(&config.ytdlp_path),
            format: config.format.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            cookies_secret_path: config.cookies_secret_path.clone(),
            cookies_env: config.cookies_env.clone(),
        }
    }
}

/// Where the cookies for one download come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CookieSource {
    /// Copy of the mounted secret file.
    Secret(PathBuf),
    /// Cookie file content taken from the environment.
    Inline(String),
}

/// Pick the cookie source for `url`.
///
/// The environment value only applies to Instagram links and wins over the
/// mounted secret.
pub(crate) fn resolve_cookies(
    url: &str,
    secret_path: &Path,
    env_value: Option<String>,
) -> Option<CookieSource> {
    if url.contains(INSTAGRAM_HOST) {
        if let Some(content) = env_value.filter(|v| !v.is_empty()) {
            return Some(CookieSource::Inline(content));
        }
    }
    secret_path
        .is_file()
        .then(|| CookieSource::Secret(secret_path.to_path_buf()))
}

/// Materialize cookies into a writable temp file; yt-dlp rewrites the
/// cookie jar it is given.
fn write_cookie_file(source: &CookieSource) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    match source {
        CookieSource::Secret(path) => {
            let content = std::fs::read(path)?;
            file.write_all(&content)?;
        }
        CookieSource::Inline(content) => file.write_all(content.as_bytes())?,
    }
    file.flush()?;
    Ok(file)
}

fn tail(text: &str) -> &str {
    let start = text.len().saturating_sub(STDERR_TAIL);
    let start = (start..text.len())
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(text.len());
    &text[start..]
}

/// Downloads anything yt-dlp supports. Handles every link, so it goes last.
pub struct YtDlpFetcher {
    options: YtDlpOptions,
}

impl YtDlpFetcher {
    pub fn new(options: YtDlpOptions) -> Self {
        Self { options }
    }

    /// Arguments for one download.
    pub fn build_args(&self, url: &str, dest: &Path, cookies: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-f".into(),
            self.options.format.clone().into(),
            "--no-playlist".into(),
            "-o".into(),
            dest.as_os_str().to_owned(),
        ];
        if let Some(cookies) = cookies {
            args.push("--cookies".into());
            args.push(cookies.as_os_str().to_owned());
        }
        args.push("--".into());
        args.push(url.into());
        args
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    fn handles(&self, _url: &str) -> bool {
        true
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), PipelineError> {
        info!("Downloading via yt-dlp: {}", url);

        let env_value = std::env::var(&self.options.cookies_env).ok();
        let cookie_file = match resolve_cookies(url, &self.options.cookies_secret_path, env_value) {
            Some(source) => {
                debug!("Using cookies from {}", source_label(&source));
                Some(write_cookie_file(&source)?)
            }
            None => None,
        };

        let args = self.build_args(url, dest, cookie_file.as_ref().map(NamedTempFile::path));
        let mut cmd = Command::new(&self.options.binary);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.options.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("Could not run {}: {}", self.options.binary.display(), e);
                return Err(PipelineError::YtDlpFailed);
            }
            Err(_) => {
                warn!(
                    "yt-dlp timed out after {}s for {}",
                    self.options.timeout.as_secs(),
                    url
                );
                return Err(PipelineError::YtDlpFailed);
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "yt-dlp exited with {:?} for {}: {}",
                output.status.code(),
                url,
                tail(stderr.trim())
            );
            return Err(PipelineError::YtDlpFailed);
        }

        if !dest.is_file() {
            warn!("yt-dlp reported success but {} is missing", dest.display());
            return Err(PipelineError::YtDlpFailed);
        }

        info!("yt-dlp download complete: {}", dest.display());
        Ok(())
    }
}

fn source_label(source: &CookieSource) -> &str {
    match source {
        CookieSource::Secret(_) => "secret file",
        CookieSource::Inline(_) => "environment",
    }
}

#[cfg(all(test, unix))]
#[path = "ytdlp_tests.rs"]
mod tests;
