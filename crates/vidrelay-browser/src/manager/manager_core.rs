//! BrowserManager core: Chrome discovery, launch, connection and pages.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserManagerConfig};
use crate::cdp::{CdpClient, CdpError, PageSession};

/// Environment variable pointing at Playwright-managed browsers.
pub const PLAYWRIGHT_BROWSERS_PATH: &str = "PLAYWRIGHT_BROWSERS_PATH";

const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(200);
const STARTUP_ATTEMPTS: u32 = 50;

/// Manages the Chrome process and CDP connection.
pub struct BrowserManager {
    pub(super) config: BrowserManagerConfig,
    pub(super) client: RwLock<Option<Arc<CdpClient>>>,
    /// Serializes launch/connect so concurrent callers start one Chrome.
    connect_lock: Mutex<()>,
    /// Chrome process handle (if we launched it).
    pub(super) chrome_process: Mutex<Option<Child>>,
}

impl BrowserManager {
    /// Create a new browser manager.
    pub fn new(config: BrowserManagerConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
            connect_lock: Mutex::new(()),
            chrome_process: Mutex::new(None),
        }
    }

    /// Look for a Chromium build installed by Playwright under `root`.
    ///
    /// Playwright lays browsers out as `chromium-<rev>/chrome-linux/chrome`,
    /// with the slim build under `chromium_headless_shell-<rev>`. Full
    /// builds win over the headless shell.
    pub fn find_playwright_chrome(root: &Path) -> Option<PathBuf> {
        let entries: Vec<_> = std::fs::read_dir(root)
            .ok()?
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                Some((name, entry.path()))
            })
            .collect();

        let pick = |prefix: &str, binary: &str| {
            let mut found: Vec<PathBuf> = entries
                .iter()
                .filter(|(name, _)| name.starts_with(prefix))
                .map(|(_, dir)| dir.join("chrome-linux").join(binary))
                .filter(|path| path.exists())
                .collect();
            // Newest revision last.
            found.sort();
            found.pop()
        };

        pick("chromium-", "chrome").or_else(|| pick("chromium_headless_shell-", "headless_shell"))
    }

    /// Find a Chrome executable: configured path, Playwright install, then
    /// well-known system locations.
    pub fn find_chrome(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config.chrome_path {
            return path.exists().then(|| path.clone());
        }

        if let Some(root) = std::env::var_os(PLAYWRIGHT_BROWSERS_PATH) {
            if let Some(path) = Self::find_playwright_chrome(Path::new(&root)) {
                return Some(path);
            }
        }

        #[cfg(target_os = "macos")]
        let paths = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ];

        #[cfg(not(target_os = "macos"))]
        let paths = [
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/snap/bin/chromium",
        ];

        paths.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Command-line arguments for launching Chrome.
    pub fn chrome_args(&self, profile_dir: &Path) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.config.debug_port),
            format!("--user-data-dir={}", profile_dir.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-background-networking".to_string(),
            "--disable-sync".to_string(),
            "--disable-translate".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--mute-audio".to_string(),
        ];

        if self.config.headless {
            args.push("--headless=new".to_string());
        }
        if self.config.no_sandbox {
            args.push("--no-sandbox".to_string());
        }

        args
    }

    /// Check if Chrome is already listening on the debug port.
    async fn is_chrome_running(&self) -> bool {
        reqwest::get(format!("{}/json/version", self.config.endpoint()))
            .await
            .is_ok()
    }

    /// Launch Chrome with remote debugging enabled.
    async fn launch_chrome(&self) -> Result<Child, BrowserError> {
        let chrome_path = self.find_chrome().ok_or(BrowserError::ChromeNotFound)?;
        let profile_dir = self.config.get_profile_dir();

        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("Failed to create profile directory: {}", e);
        }

        info!(
            "Launching {} with profile at {}",
            chrome_path.display(),
            profile_dir.display()
        );

        let child = Command::new(&chrome_path)
            .args(self.chrome_args(&profile_dir))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!("Chrome launched with PID: {:?}", child.id());
        Ok(child)
    }

    /// Connect to the browser, launching it if necessary.
    pub async fn connect(&self) -> Result<(), BrowserError> {
        let _guard = self.connect_lock.lock().await;

        if let Some(client) = self.client.read().await.as_ref() {
            if client.is_alive() {
                return Ok(());
            }
        }

        if !self.is_chrome_running().await {
            info!(
                "Chrome not running on port {}, launching...",
                self.config.debug_port
            );

            let child = self.launch_chrome().await?;
            *self.chrome_process.lock().await = Some(child);

            let mut ready = false;
            for _ in 0..STARTUP_ATTEMPTS {
                tokio::time::sleep(STARTUP_POLL_INTERVAL).await;
                if self.is_chrome_running().await {
                    ready = true;
                    break;
                }
            }

            if !ready {
                return Err(BrowserError::LaunchFailed(
                    "Chrome failed to start within timeout".to_string(),
                ));
            }
        } else {
            info!("Chrome already running on port {}", self.config.debug_port);
        }

        let client = CdpClient::connect(&self.config.endpoint()).await?;
        *self.client.write().await = Some(Arc::new(client));

        info!("Connected to Chrome at {}", self.config.endpoint());
        Ok(())
    }

    /// Get the CDP client, connecting first if needed.
    async fn client(&self) -> Result<Arc<CdpClient>, BrowserError> {
        {
            let client = self.client.read().await;
            if let Some(client) = client.as_ref().filter(|c| c.is_alive()) {
                return Ok(client.clone());
            }
        }

        self.connect().await?;
        self.client
            .read()
            .await
            .clone()
            .ok_or(BrowserError::NotConnected)
    }

    /// Open a new blank page, optionally overriding its user agent.
    pub async fn open_page(&self, user_agent: Option<&str>) -> Result<PageSession, BrowserError> {
        let client = self.client().await?;

        let session = match client.new_page(user_agent).await {
            Ok(session) => session,
            // Chrome answered, so the connection itself is fine.
            Err(e @ CdpError::Protocol { .. }) => return Err(e.into()),
            Err(e) => {
                // Drop a broken connection so the next call reconnects.
                self.client.write().await.take();
                return Err(e.into());
            }
        };

        debug!("Opened page {}", session.target_id());
        Ok(session)
    }

    /// Close a page opened with [`open_page`](Self::open_page).
    pub async fn close_page(&self, session: &PageSession) -> Result<(), BrowserError> {
        let client = self.client.read().await.clone();
        if let Some(client) = client {
            client.close_page(session).await?;
        }
        debug!("Closed page {}", session.target_id());
        Ok(())
    }

    /// Close the browser connection.
    pub async fn close(&self) -> Result<(), BrowserError> {
        let _ = self.client.write().await.take();
        info!("Browser connection closed");
        Ok(())
    }

    /// Shutdown Chrome if we launched it.
    pub async fn shutdown(&self) -> Result<(), BrowserError> {
        self.close().await?;
        if let Some(mut child) = self.chrome_process.lock().await.take() {
            info!("Shutting down Chrome...");
            let _ = child.kill().await;
        }
        Ok(())
    }
}
