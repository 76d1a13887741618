//! AliExpress product video extraction.
//!
//! Product pages load their player lazily, so the page is rendered in
//! headless Chrome and scrolled before the `<video>` sources are read.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use vidrelay_browser::{BrowserManager, CdpError, PageSession};
use vidrelay_config::BrowserConfig;

use super::{download_to_file, Fetcher};
use crate::error::PipelineError;

const ALIEXPRESS_HOST: &str = "aliexpress.com";
const NETWORK_IDLE: Duration = Duration::from_millis(500);

/// `<source>` children first, then `src` on the `<video>` elements.
const COLLECT_VIDEO_SOURCES: &str = r#"(() => {
  const srcs = [];
  document.querySelectorAll('video source').forEach(s => srcs.push(s.getAttribute('src')));
  document.querySelectorAll('video').forEach(v => srcs.push(v.getAttribute('src')));
  return srcs;
})()"#;

#[derive(Debug, Clone)]
pub struct AliExpressOptions {
    pub user_agent: String,
    pub navigation_timeout: Duration,
    pub scroll_steps: u32,
    pub scroll_distance: u32,
    pub scroll_pause: Duration,
}

impl From<&BrowserConfig> for AliExpressOptions {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            scroll_steps: config.scroll_steps,
            scroll_distance: config.scroll_distance,
            scroll_pause: Duration::from_millis(config.scroll_pause_ms),
        }
    }
}

/// First collected source that is an absolute http(s) URL.
pub fn first_http_source(sources: &Value) -> Option<String> {
    sources
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .find(|src| src.starts_with("http"))
        .map(str::to_string)
}

/// Renders AliExpress pages and downloads the first product video.
pub struct AliExpressFetcher {
    browser: Arc<BrowserManager>,
    http: reqwest::Client,
    options: AliExpressOptions,
}

impl AliExpressFetcher {
    pub fn new(browser: Arc<BrowserManager>, http: reqwest::Client, options: AliExpressOptions) -> Self {
        Self {
            browser,
            http,
            options,
        }
    }

    /// Find the product video URL on `url`, if the page has one.
    pub async fn find_video_url(&self, url: &str) -> Result<Option<String>, PipelineError> {
        info!("Extracting AliExpress video from {}", url);

        let page = self.browser.open_page(Some(self.options.user_agent.as_str())).await?;
        let result = self.scrape(&page, url).await;

        if let Err(e) = self.browser.close_page(&page).await {
            warn!("Failed to close page for {}: {}", url, e);
        }

        let found = result?;
        match &found {
            Some(src) => info!("AliExpress video found: {}", src),
            None => warn!("No AliExpress video found on {}", url),
        }
        Ok(found)
    }

    async fn scrape(&self, page: &PageSession, url: &str) -> Result<Option<String>, CdpError> {
        page.navigate(url, self.options.navigation_timeout).await?;

        match page
            .wait_for_network_idle(NETWORK_IDLE, self.options.navigation_timeout)
            .await
        {
            Ok(()) => {}
            // Pages with long-polling never go idle; read what rendered.
            Err(CdpError::Timeout(msg)) => warn!("{} on {}", msg, url),
            Err(e) => return Err(e),
        }

        for _ in 0..self.options.scroll_steps {
            page.scroll_by(0, i64::from(self.options.scroll_distance))
                .await?;
            tokio::time::sleep(self.options.scroll_pause).await;
        }

        let sources = page.evaluate(COLLECT_VIDEO_SOURCES).await?;
        Ok(first_http_source(&sources))
    }
}

#[async_trait]
impl Fetcher for AliExpressFetcher {
    fn name(&self) -> &str {
        "aliexpress"
    }

    fn handles(&self, url: &str) -> bool {
        url.contains(ALIEXPRESS_HOST)
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), PipelineError> {
        let video_url = self
            .find_video_url(url)
            .await?
            .ok_or(PipelineError::AliExpressVideoNotFound)?;

        download_to_file(&self.http, &video_url, dest).await?;
        Ok(())
    }
}
