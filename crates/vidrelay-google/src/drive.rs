//! Google Drive upload client.

use std::path::Path;
use std::sync::Arc;

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};
use url::Url;

use crate::auth::{ServiceAccountAuth, SCOPE_DRIVE};
use crate::error::GoogleError;

const VIDEO_MIME: &str = "video/mp4";
const RESPONSE_FIELDS: &str = "id,webContentLink,webViewLink";

/// Uploaded file as reported by Drive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_content_link: Option<String>,
}

/// Drive API client uploading into a single folder.
pub struct DriveClient {
    http: reqwest::Client,
    auth: Arc<ServiceAccountAuth>,
    base_url: String,
    folder_id: String,
}

impl DriveClient {
    pub fn new(
        http: reqwest::Client,
        auth: Arc<ServiceAccountAuth>,
        base_url: impl Into<String>,
        folder_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.into(),
            folder_id: folder_id.into(),
        }
    }

    fn upload_url(&self) -> Result<Url, GoogleError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| GoogleError::NotABaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["upload", "drive", "v3", "files"]);
        url.query_pairs_mut()
            .append_pair("uploadType", "resumable")
            .append_pair("supportsAllDrives", "true")
            .append_pair("fields", RESPONSE_FIELDS);
        Ok(url)
    }

    fn metadata(&self, name: &str) -> serde_json::Value {
        if self.folder_id.is_empty() {
            serde_json::json!({ "name": name })
        } else {
            serde_json::json!({ "name": name, "parents": [self.folder_id] })
        }
    }

    /// Upload a local video under `name`.
    ///
    /// Opens a resumable session and sends the whole file in one streamed PUT.
    pub async fn upload(&self, local_path: &Path, name: &str) -> Result<DriveFile, GoogleError> {
        let size = tokio::fs::metadata(local_path).await?.len();
        let token = self.auth.token(&[SCOPE_DRIVE]).await?;

        let response = self
            .http
            .post(self.upload_url()?)
            .bearer_auth(&token)
            .header("X-Upload-Content-Type", VIDEO_MIME)
            .header("X-Upload-Content-Length", size)
            .json(&self.metadata(name))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GoogleError::from_response(response).await);
        }

        let session_url = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                GoogleError::InvalidResponse("Upload session has no Location header".to_string())
            })?;
        debug!("Opened upload session for {} ({} bytes)", name, size);

        let file = tokio::fs::File::open(local_path).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let response = self
            .http
            .put(&session_url)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, VIDEO_MIME)
            .header(CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GoogleError::from_response(response).await);
        }

        let uploaded: DriveFile = response.json().await?;
        info!("Uploaded {} to Drive as {}", name, uploaded.id);
        Ok(uploaded)
    }
}
