//! CDP page session for interacting with a single page.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::client::{send_command, PendingRequest, WsSink};
use super::error::CdpError;
use super::protocol::Incoming;

const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Update the set of in-flight request IDs from a Network domain event.
///
/// Returns `true` when the event touched the set.
pub fn track_network_event(inflight: &mut HashSet<String>, event: &Incoming) -> bool {
    let Some(method) = event.method.as_deref() else {
        return false;
    };
    let Some(request_id) = event.request_id() else {
        return false;
    };

    match method {
        "Network.requestWillBeSent" => inflight.insert(request_id.to_string()),
        "Network.loadingFinished" | "Network.loadingFailed" => inflight.remove(request_id),
        _ => false,
    }
}

/// A session attached to a single page/target.
pub struct PageSession {
    /// Target ID.
    target_id: String,
    /// Session ID for this target.
    session_id: String,
    /// WebSocket sender (shared with client).
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    /// Pending requests (shared with client).
    pending: Arc<Mutex<HashMap<u64, PendingRequest>>>,
    /// Request ID counter (shared with client).
    request_id: Arc<AtomicU64>,
    /// Events routed to this session.
    event_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Incoming>>,
}

impl std::fmt::Debug for PageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSession")
            .field("target_id", &self.target_id)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
        pending: Arc<Mutex<HashMap<u64, PendingRequest>>>,
        request_id: Arc<AtomicU64>,
        event_rx: mpsc::UnboundedReceiver<Incoming>,
    ) -> Self {
        Self {
            target_id,
            session_id,
            ws_tx,
            pending,
            request_id,
            event_rx: tokio::sync::Mutex::new(event_rx),
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        send_command(
            &self.ws_tx,
            &self.pending,
            &self.request_id,
            method,
            params,
            Some(self.session_id.as_str()),
        )
        .await
    }

    /// Enable the domains the session relies on.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        // Network events drive wait_for_network_idle
        self.call("Network.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Override the user agent for subsequent requests from this page.
    pub async fn set_user_agent(&self, user_agent: &str) -> Result<(), CdpError> {
        self.call(
            "Network.setUserAgentOverride",
            Some(json!({"userAgent": user_agent})),
        )
        .await?;
        Ok(())
    }

    /// Navigate to URL and wait until the document has loaded.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<String, CdpError> {
        let navigation = async {
            let result = self
                .call("Page.navigate", Some(json!({"url": url})))
                .await?;

            if let Some(error) = result.get("errorText").and_then(Value::as_str) {
                return Err(CdpError::NavigationFailed(format!("{}: {}", url, error)));
            }

            let frame_id = result["frameId"].as_str().unwrap_or("main").to_string();
            self.wait_for_load().await?;
            Ok::<String, CdpError>(frame_id)
        };

        let frame_id = tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| CdpError::Timeout(format!("Navigation to {} timed out", url)))??;

        debug!("Navigated to {}", url);
        Ok(frame_id)
    }

    /// Poll `document.readyState` until the page is complete.
    pub async fn wait_for_load(&self) -> Result<(), CdpError> {
        loop {
            let state = self.evaluate("document.readyState").await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            tokio::time::sleep(LOAD_POLL_INTERVAL).await;
        }
    }

    /// Wait until no network request has been in flight for `idle`.
    ///
    /// Fails with [`CdpError::Timeout`] if the page keeps loading past
    /// `timeout`.
    pub async fn wait_for_network_idle(
        &self,
        idle: Duration,
        timeout: Duration,
    ) -> Result<(), CdpError> {
        let mut events = self.event_rx.lock().await;
        let mut inflight = HashSet::new();
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(CdpError::Timeout(format!(
                    "Network still busy ({} requests in flight)",
                    inflight.len()
                )));
            }

            let wait = if inflight.is_empty() {
                idle.min(remaining)
            } else {
                remaining
            };

            match tokio::time::timeout(wait, events.recv()).await {
                Ok(Some(event)) => {
                    if track_network_event(&mut inflight, &event) {
                        trace!("{} requests in flight", inflight.len());
                    }
                }
                Ok(None) => return Err(CdpError::SessionClosed),
                Err(_) if inflight.is_empty() => return Ok(()),
                Err(_) => {}
            }
        }
    }

    /// Scroll the window by the given offset.
    pub async fn scroll_by(&self, x: i64, y: i64) -> Result<(), CdpError> {
        self.evaluate(&format!("window.scrollBy({}, {})", x, y))
            .await?;
        Ok(())
    }

    /// Evaluate a JavaScript expression and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(method: &str, request_id: &str) -> Incoming {
        serde_json::from_value(json!({
            "method": method,
            "params": {"requestId": request_id},
            "sessionId": "s1"
        }))
        .unwrap()
    }

    #[test]
    fn test_track_request_lifecycle() {
        let mut inflight = HashSet::new();
        assert!(track_network_event(&mut inflight, &event("Network.requestWillBeSent", "1")));
        assert!(track_network_event(&mut inflight, &event("Network.requestWillBeSent", "2")));
        assert_eq!(inflight.len(), 2);

        assert!(track_network_event(&mut inflight, &event("Network.loadingFinished", "1")));
        assert!(track_network_event(&mut inflight, &event("Network.loadingFailed", "2")));
        assert!(inflight.is_empty());
    }

    #[test]
    fn test_track_ignores_unrelated_events() {
        let mut inflight = HashSet::new();
        assert!(!track_network_event(&mut inflight, &event("Network.dataReceived", "1")));
        assert!(!track_network_event(&mut inflight, &event("Network.loadingFinished", "unknown")));
        assert!(inflight.is_empty());
    }

    #[test]
    fn test_track_ignores_events_without_request_id() {
        let mut inflight = HashSet::new();
        let page_event: Incoming = serde_json::from_value(json!({
            "method": "Page.loadEventFired",
            "params": {"timestamp": 1.0}
        }))
        .unwrap();
        assert!(!track_network_event(&mut inflight, &page_event));
    }
}
