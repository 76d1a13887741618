//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{Command, Incoming, NewTarget, VersionInfo};
use super::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type PendingMap = Arc<Mutex<HashMap<u64, PendingRequest>>>;
type EventHandlers = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<Incoming>>>>;

pub(crate) const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Waiter for the reply to one command ID.
pub(crate) struct PendingRequest {
    pub tx: oneshot::Sender<Result<Value, CdpError>>,
}

/// Send one command over the shared socket and wait for its response.
pub(crate) async fn send_command(
    ws_tx: &tokio::sync::Mutex<WsSink>,
    pending: &Mutex<HashMap<u64, PendingRequest>>,
    request_id: &AtomicU64,
    method: &str,
    params: Option<Value>,
    session_id: Option<&str>,
) -> Result<Value, CdpError> {
    let id = request_id.fetch_add(1, Ordering::SeqCst);

    let json = serde_json::to_string(&Command {
        id,
        method,
        params,
        session_id,
    })?;
    trace!("CDP send: {}", json);

    let (tx, rx) = oneshot::channel();
    pending.lock().insert(id, PendingRequest { tx });

    {
        let mut ws = ws_tx.lock().await;
        if let Err(e) = ws.send(Message::Text(json.into())).await {
            pending.lock().remove(&id);
            return Err(e.into());
        }
    }

    match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(CdpError::SessionClosed),
        Err(_) => {
            pending.lock().remove(&id);
            Err(CdpError::Timeout(format!("{} got no reply", method)))
        }
    }
}

/// DevTools connection to one Chrome instance.
///
/// Holds one browser-level WebSocket; page sessions multiplex over it using
/// flattened session IDs.
pub struct CdpClient {
    /// `http://host:port`, used for `/json/new`.
    http_endpoint: String,
    /// WebSocket sender.
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    /// Request ID counter.
    request_id: Arc<AtomicU64>,
    /// Waiters keyed by command ID.
    pending: PendingMap,
    /// Event handlers by session ID.
    event_handlers: EventHandlers,
    /// Background task handle.
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Attach to the browser target advertised by `{endpoint}/json/version`.
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();

        let version = Self::version(&http_endpoint)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;
        debug!("{} at {}", version.browser, version.ws_url);

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.ws_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("{}: {}", version.ws_url, e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let event_handlers: EventHandlers = Arc::new(RwLock::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            let event_handlers = event_handlers.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending, event_handlers).await;
            })
        };

        Ok(Self {
            http_endpoint,
            ws_tx: Arc::new(tokio::sync::Mutex::new(ws_sink)),
            request_id: Arc::new(AtomicU64::new(1)),
            pending,
            event_handlers,
            recv_task,
        })
    }

    async fn version(http_endpoint: &str) -> Result<VersionInfo, reqwest::Error> {
        reqwest::get(format!("{}/json/version", http_endpoint))
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Route replies to their waiters and events to their page session.
    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap, event_handlers: EventHandlers) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<Incoming>(&text) {
                        Ok(resp) => Self::dispatch(resp, &pending, &event_handlers).await,
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        // Fail whatever is still waiting.
        for (_, req) in pending.lock().drain() {
            let _ = req.tx.send(Err(CdpError::SessionClosed));
        }
        event_handlers.write().await.clear();
    }

    async fn dispatch(resp: Incoming, pending: &PendingMap, event_handlers: &EventHandlers) {
        if let Some(id) = resp.id {
            let pending_req = pending.lock().remove(&id);
            if let Some(req) = pending_req {
                let result = match resp.error {
                    Some(error) => Err(CdpError::Protocol {
                        code: error.code,
                        message: error.message,
                    }),
                    None => Ok(resp.result.unwrap_or(Value::Null)),
                };
                let _ = req.tx.send(result);
            }
        } else if resp.method.is_some() {
            let session_id = resp.session_id.clone().unwrap_or_default();
            let handlers = event_handlers.read().await;
            if let Some(tx) = handlers.get(&session_id) {
                let _ = tx.send(resp);
            }
        }
    }

    /// Whether the receive loop is still running.
    pub fn is_alive(&self) -> bool {
        !self.recv_task.is_finished()
    }

    /// Send a browser-level CDP command and wait for the response.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        send_command(
            &self.ws_tx,
            &self.pending,
            &self.request_id,
            method,
            params,
            None,
        )
        .await
    }

    /// Create a new blank page and attach a session to it.
    ///
    /// If any setup step fails the target is closed again, so a failed call
    /// never leaves a tab behind.
    pub async fn new_page(&self, user_agent: Option<&str>) -> Result<PageSession, CdpError> {
        // Chrome requires PUT for /json/new
        let create_url = format!("{}/json/new", self.http_endpoint);
        let target: NewTarget = reqwest::Client::new()
            .put(&create_url)
            .send()
            .await?
            .json()
            .await?;
        debug!("Created new page: {}", target.id);

        let session_id = match self.attach(&target.id).await {
            Ok(session_id) => session_id,
            Err(e) => {
                self.close_target(&target.id).await;
                return Err(e);
            }
        };

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.event_handlers
            .write()
            .await
            .insert(session_id.clone(), event_tx);

        let session = PageSession::new(
            target.id,
            session_id,
            self.ws_tx.clone(),
            self.pending.clone(),
            self.request_id.clone(),
            event_rx,
        );

        if let Err(e) = Self::prepare(&session, user_agent).await {
            if let Err(close_err) = self.close_page(&session).await {
                warn!("Failed to close page {}: {}", session.target_id(), close_err);
            }
            return Err(e);
        }

        Ok(session)
    }

    async fn attach(&self, target_id: &str) -> Result<String, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await?;

        result["sessionId"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))
    }

    async fn prepare(session: &PageSession, user_agent: Option<&str>) -> Result<(), CdpError> {
        session.enable_domains().await?;
        if let Some(ua) = user_agent {
            session.set_user_agent(ua).await?;
        }
        Ok(())
    }

    async fn close_target(&self, target_id: &str) {
        if let Err(e) = self
            .call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await
        {
            warn!("Failed to close target {}: {}", target_id, e);
        }
    }

    /// Close a page and stop routing its events.
    pub async fn close_page(&self, session: &PageSession) -> Result<(), CdpError> {
        self.event_handlers
            .write()
            .await
            .remove(session.session_id());
        self.call(
            "Target.closeTarget",
            Some(json!({"targetId": session.target_id()})),
        )
        .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
