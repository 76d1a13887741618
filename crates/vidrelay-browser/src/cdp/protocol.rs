//! Wire shapes for the DevTools WebSocket and HTTP endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing command. Page-level commands carry the flattened session ID.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Command<'a> {
    pub id: u64,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a str>,
}

/// Anything Chrome sends back: a reply (has `id`) or an event (has `method`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incoming {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<ProtocolError>,
    pub method: Option<String>,
    pub params: Option<Value>,
    pub session_id: Option<String>,
}

impl Incoming {
    /// `params.requestId` of a network event.
    pub fn request_id(&self) -> Option<&str> {
        self.params.as_ref()?.get("requestId")?.as_str()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProtocolError {
    pub code: i64,
    pub message: String,
}

/// Reply of `PUT /json/new`; only the target ID is needed to attach.
#[derive(Debug, Deserialize)]
pub struct NewTarget {
    pub id: String,
}

/// Reply of `GET /json/version`. Chrome mixes PascalCase into this one.
#[derive(Debug, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub ws_url: String,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
