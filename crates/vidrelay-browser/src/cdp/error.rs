//! CDP client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdpError {
    /// Nothing answered `/json/version` on the debug port.
    #[error("Chrome DevTools not reachable at {0}")]
    ChromeNotAvailable(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// WebSocket or HTTP failure after the connection was set up.
    #[error("CDP transport error: {0}")]
    Transport(String),

    /// Chrome rejected a command.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// The page threw while evaluating an expression.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::Transport(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for CdpError {
    fn from(e: serde_json::Error) -> Self {
        CdpError::InvalidResponse(e.to_string())
    }
}
