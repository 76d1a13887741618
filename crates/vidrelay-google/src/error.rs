//! Google client errors.

use thiserror::Error;

/// Errors from the Drive/Sheets clients.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// Credential file missing or malformed.
    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    /// JWT assertion could not be signed.
    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Token endpoint rejected the assertion.
    #[error("Token exchange failed: {0}")]
    Token(String),

    /// Non-success HTTP status from a Google API.
    #[error("Google API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Transport error.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local file error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Base URL parses but cannot take path segments (e.g. `mailto:`).
    #[error("Base URL cannot carry a path: {0}")]
    NotABaseUrl(String),

    /// Response missing expected data.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GoogleError {
    /// Build an [`GoogleError::Api`] from a failed response.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        GoogleError::Api { status, body }
    }
}
