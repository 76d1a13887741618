//! Browser manager errors and settings.

use std::path::PathBuf;

use thiserror::Error;

use crate::cdp::CdpError;

/// Errors from launching or talking to Chrome.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Chrome not found. Install Chromium or set browser.chrome_path.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    /// The DevTools connection dropped; the next page open reconnects.
    #[error("Browser not connected")]
    NotConnected,

    #[error(transparent)]
    Cdp(CdpError),
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::SessionClosed => BrowserError::NotConnected,
            other => BrowserError::Cdp(other),
        }
    }
}

/// Browser configuration.
#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    /// Explicit Chrome executable; discovered when `None`.
    pub chrome_path: Option<PathBuf>,
    /// Chrome debugging port.
    pub debug_port: u16,
    /// Profile directory; a temp directory is used when `None`.
    pub profile_dir: Option<PathBuf>,
    /// Whether to run Chrome in headless mode.
    pub headless: bool,
    /// Disable the Chrome sandbox (needed as root inside containers).
    pub no_sandbox: bool,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            debug_port: 9222,
            profile_dir: None,
            headless: true,
            no_sandbox: true,
        }
    }
}

impl BrowserManagerConfig {
    /// Get the profile directory, defaulting to one under the temp dir.
    pub fn get_profile_dir(&self) -> PathBuf {
        self.profile_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("vidrelay-chrome-profile"))
    }

    /// Get the CDP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.debug_port)
    }
}
