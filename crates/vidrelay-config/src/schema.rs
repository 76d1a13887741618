//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub google: GoogleConfig,

    #[serde(default)]
    pub downloader: DownloaderConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Google Drive and Sheets configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Service account JSON key file.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Drive folder receiving uploads.
    #[serde(default)]
    pub drive_folder_id: String,

    /// Spreadsheet driving batch downloads.
    #[serde(default)]
    pub sheet_id: String,

    /// Tab name inside the spreadsheet.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,

    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            drive_folder_id: String::new(),
            sheet_id: String::new(),
            sheet_name: default_sheet_name(),
            sheets_base_url: default_sheets_base_url(),
            drive_base_url: default_drive_base_url(),
        }
    }
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("/etc/secrets/GOOGLE_CREDS")
}

fn default_sheet_name() -> String {
    "videos".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

/// Video downloader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,

    #[serde(default = "default_format")]
    pub format: String,

    /// Scratch directory for downloads before upload.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// yt-dlp process timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for direct HTTP downloads.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Read-only cookie file mounted as a secret.
    #[serde(default = "default_cookies_secret_path")]
    pub cookies_secret_path: PathBuf,

    /// Environment variable holding Instagram cookies.
    #[serde(default = "default_cookies_env")]
    pub cookies_env: String,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            format: default_format(),
            work_dir: default_work_dir(),
            timeout_secs: default_timeout_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            cookies_secret_path: default_cookies_secret_path(),
            cookies_env: default_cookies_env(),
        }
    }
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_format() -> String {
    "mp4".to_string()
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_http_timeout_secs() -> u64 {
    60
}

fn default_cookies_secret_path() -> PathBuf {
    PathBuf::from("/etc/secrets/INSTAGRAM_COOKIES")
}

fn default_cookies_env() -> String {
    "IG_COOKIES".to_string()
}

/// Headless browser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome executable. Discovered automatically when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Pass `--no-sandbox`; required when running as root in a container.
    #[serde(default = "default_true")]
    pub no_sandbox: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    #[serde(default = "default_scroll_steps")]
    pub scroll_steps: u32,

    #[serde(default = "default_scroll_distance")]
    pub scroll_distance: u32,

    #[serde(default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            debug_port: default_debug_port(),
            headless: true,
            no_sandbox: true,
            user_agent: default_user_agent(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            scroll_steps: default_scroll_steps(),
            scroll_distance: default_scroll_distance(),
            scroll_pause_ms: default_scroll_pause_ms(),
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120 Safari/537.36"
        .to_string()
}

fn default_navigation_timeout_secs() -> u64 {
    60
}

fn default_scroll_steps() -> u32 {
    12
}

fn default_scroll_distance() -> u32 {
    1000
}

fn default_scroll_pause_ms() -> u64 {
    400
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for rolling log files.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    /// Write logs to files in addition to the console.
    #[serde(default = "default_true")]
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file: true,
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(
            config.google.credentials_path,
            PathBuf::from("/etc/secrets/GOOGLE_CREDS")
        );
        assert_eq!(config.downloader.cookies_env, "IG_COOKIES");
        assert_eq!(config.browser.scroll_steps, 12);
        assert_eq!(config.browser.scroll_pause_ms, 400);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_user_agent_is_single_line() {
        let ua = default_user_agent();
        assert!(ua.starts_with("Mozilla/5.0 (Windows NT 10.0"));
        assert!(ua.contains("AppleWebKit/537.36 (KHTML, like Gecko)"));
        assert!(!ua.contains('\n'));
    }

    #[test]
    fn test_serialize_roundtrip_keeps_optional_chrome_path_out() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("chrome_path"));
    }
}
