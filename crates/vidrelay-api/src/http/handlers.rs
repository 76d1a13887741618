//! Download handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use vidrelay_google::DriveFile;
use vidrelay_pipeline::SyncReport;

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /download`.
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    /// Upload name; a random one is used when absent.
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub filename: String,
    pub drive_file: DriveFile,
}

/// Body of `POST /download-from-sheet`.
#[derive(Debug, Default, Deserialize)]
pub struct SheetDownloadRequest {
    /// Process at most this many rows.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Download one link and upload it to Drive.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DownloadRequest>,
) -> Result<Json<DownloadResponse>, ApiError> {
    info!("Download request: {}", req.url);

    let processed = state
        .processor
        .process_one_url(&req.url, req.filename.as_deref())
        .await?;

    Ok(Json(DownloadResponse {
        success: true,
        filename: processed.filename,
        drive_file: processed.drive_file,
    }))
}

/// Process pending sheet rows.
pub async fn download_from_sheet(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SheetDownloadRequest>,
) -> Result<Json<SyncReport>, ApiError> {
    info!("Sheet sync request (limit: {:?})", req.limit);

    let report = state.sheet_sync.run(req.limit).await?;
    Ok(Json(report))
}
