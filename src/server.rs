//! Component wiring and startup logic for vidrelay.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vidrelay_api::{ApiConfig, ApiServer, AppState};
use vidrelay_browser::{BrowserManager, BrowserManagerConfig};
use vidrelay_config::{BrowserConfig, Config, LoggingConfig};
use vidrelay_google::{DriveClient, ServiceAccountAuth, SheetsClient};
use vidrelay_pipeline::{
    AliExpressFetcher, AliExpressOptions, Fetcher, SheetStore, SheetSync, UnavailableGoogle,
    VideoProcessor, VideoStore, YtDlpFetcher, YtDlpOptions,
};

/// Initialize tracing with console output and, when enabled, a daily log file.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let file_layer = if logging.file {
        std::fs::create_dir_all(&logging.dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("vidrelay")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&logging.dir)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // The guard flushes buffered lines on drop; keep it for the whole run.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(file_layer)
        .init();

    Ok(())
}

/// Long-lived pieces shared by the server and the one-shot sync.
pub(crate) struct Components {
    pub processor: Arc<VideoProcessor>,
    pub sheet_sync: Arc<SheetSync>,
    pub browser: Arc<BrowserManager>,
}

fn browser_manager_config(config: &BrowserConfig) -> BrowserManagerConfig {
    BrowserManagerConfig {
        chrome_path: config.chrome_path.clone(),
        debug_port: config.debug_port,
        profile_dir: None,
        headless: config.headless,
        no_sandbox: config.no_sandbox,
    }
}

/// Drive and Sheets stores, or stand-ins reporting why credentials failed.
fn google_stores(config: &Config, http: &reqwest::Client) -> (Arc<dyn VideoStore>, Arc<dyn SheetStore>) {
    let google = &config.google;
    match ServiceAccountAuth::from_file(&google.credentials_path, http.clone()) {
        Ok(auth) => {
            let auth = Arc::new(auth);
            info!("Google service account: {}", auth.client_email());
            let drive = DriveClient::new(
                http.clone(),
                auth.clone(),
                google.drive_base_url.clone(),
                google.drive_folder_id.clone(),
            );
            let sheets = SheetsClient::new(
                http.clone(),
                auth,
                google.sheets_base_url.clone(),
                google.sheet_id.clone(),
                google.sheet_name.clone(),
            );
            let drive: Arc<dyn VideoStore> = Arc::new(drive);
            let sheets: Arc<dyn SheetStore> = Arc::new(sheets);
            (drive, sheets)
        }
        Err(e) => {
            let reason = format!("{}: {}", google.credentials_path.display(), e);
            warn!("Google credentials unavailable, uploads will fail: {}", reason);
            let unavailable = Arc::new(UnavailableGoogle::new(reason));
            let drive: Arc<dyn VideoStore> = unavailable.clone();
            let sheets: Arc<dyn SheetStore> = unavailable;
            (drive, sheets)
        }
    }
}

/// Build the processing pipeline from configuration.
pub(crate) fn build_components(config: &Config) -> Result<Components, Box<dyn std::error::Error>> {
    let http_timeout = Duration::from_secs(config.downloader.http_timeout_secs);
    let http = reqwest::Client::builder()
        .connect_timeout(http_timeout)
        .read_timeout(http_timeout)
        .build()?;

    let (drive, sheets) = google_stores(config, &http);

    let browser = Arc::new(BrowserManager::new(browser_manager_config(&config.browser)));

    // yt-dlp handles every link, so it must come last.
    let fetchers: Vec<Arc<dyn Fetcher>> = vec![
        Arc::new(AliExpressFetcher::new(
            browser.clone(),
            http.clone(),
            AliExpressOptions::from(&config.browser),
        )),
        Arc::new(YtDlpFetcher::new(YtDlpOptions::from(&config.downloader))),
    ];

    let processor = Arc::new(VideoProcessor::new(
        fetchers,
        drive,
        config.downloader.work_dir.clone(),
    ));
    let sheet_sync = Arc::new(SheetSync::new(sheets, processor.clone()));

    Ok(Components {
        processor,
        sheet_sync,
        browser,
    })
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

async fn shutdown_browser(browser: &BrowserManager) {
    if let Err(e) = browser.shutdown().await {
        warn!("Failed to shut down Chrome: {}", e);
    }
}

/// Run the HTTP server in foreground.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting vidrelay v{}", env!("CARGO_PKG_VERSION"));
    log_work_dir(&config.downloader.work_dir);

    let components = build_components(&config)?;
    let state = Arc::new(AppState::new(
        components.processor.clone(),
        components.sheet_sync.clone(),
    ));

    let server = ApiServer::new(
        ApiConfig::new(config.server.host.clone(), config.server.port),
        state,
    );
    let result = server.run(shutdown_signal()).await;

    shutdown_browser(&components.browser).await;
    result
}

/// Process the sheet queue once and print the report to stdout.
pub(crate) async fn run_sync(
    config: Config,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Running one-shot sheet sync");
    log_work_dir(&config.downloader.work_dir);

    let components = build_components(&config)?;
    let result = components.sheet_sync.run(limit).await;
    shutdown_browser(&components.browser).await;

    let report = result?;
    info!("Sheet sync processed {} rows", report.count);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn log_work_dir(work_dir: &Path) {
    info!("Download directory: {}", work_dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidrelay_config::ConfigLoader;

    #[test]
    fn test_browser_manager_config_from_config() {
        let config = BrowserConfig {
            chrome_path: Some("/ms-playwright/chromium-1105/chrome-linux/chrome".into()),
            debug_port: 9333,
            headless: false,
            ..Default::default()
        };
        let manager_config = browser_manager_config(&config);
        assert_eq!(manager_config.debug_port, 9333);
        assert!(!manager_config.headless);
        assert!(manager_config.no_sandbox);
        assert!(manager_config.chrome_path.is_some());
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.google.sheet_name, "videos");
        assert!(vidrelay_config::ConfigValidator::validate(&config).is_valid());
    }

    #[tokio::test]
    async fn test_build_components_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ConfigLoader::load_str("").unwrap();
        config.google.credentials_path = dir.path().join("missing-creds.json");
        config.downloader.work_dir = dir.path().join("work");

        let components = build_components(&config).unwrap();

        // Sheet access fails with the credentials error instead of panicking.
        let err = components.sheet_sync.run(None).await.unwrap_err();
        assert!(err.to_string().contains("missing-creds.json"));
    }
}
