//! Batch processing driven by the sheet queue.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use vidrelay_google::{DriveFile, RowStatus, SheetRow};

use crate::error::PipelineError;
use crate::filename::sanitize_filename;
use crate::processor::VideoProcessor;
use crate::store::SheetStore;

/// Outcome of one link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub url: String,
    pub filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_file: Option<DriveFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one sheet row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowReport {
    pub row_index: u32,
    pub name: String,
    pub status: RowStatus,
    pub links_count: usize,
    /// `webViewLink` of every uploaded file, in link order.
    pub drive_links: Vec<String>,
    pub items: Vec<ItemReport>,
}

/// Outcome of a sync run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub success: bool,
    pub count: usize,
    pub results: Vec<RowReport>,
}

/// Upload name for the `index`-th (1-based) link of a row.
fn link_name(base: &str, index: usize) -> String {
    if index == 1 {
        base.to_string()
    } else {
        format!("{} ({})", base, index)
    }
}

/// Processes pending sheet rows and writes each outcome back.
pub struct SheetSync {
    sheet: Arc<dyn SheetStore>,
    processor: Arc<VideoProcessor>,
}

impl SheetSync {
    pub fn new(sheet: Arc<dyn SheetStore>, processor: Arc<VideoProcessor>) -> Self {
        Self { sheet, processor }
    }

    /// Process pending rows, at most `limit` of them when given and non-zero.
    ///
    /// Link failures are recorded in the report and mark the row `PARTIAL`.
    /// Failing to read the queue or write a row back aborts the run.
    pub async fn run(&self, limit: Option<usize>) -> Result<SyncReport, PipelineError> {
        let mut rows = self.sheet.pending_rows().await?;
        if let Some(limit) = limit.filter(|l| *l > 0) {
            rows.truncate(limit);
        }
        info!("Syncing {} pending rows", rows.len());

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let report = self.process_row(row).await;
            self.sheet
                .write_result(report.row_index, &report.drive_links.join("\n"), report.status)
                .await?;
            info!(
                "Row {} finished as {} ({} links)",
                report.row_index, report.status, report.links_count
            );
            results.push(report);
        }

        Ok(SyncReport {
            success: true,
            count: results.len(),
            results,
        })
    }

    async fn process_row(&self, row: SheetRow) -> RowReport {
        let mut drive_links = Vec::new();
        let mut items = Vec::with_capacity(row.urls.len());
        let mut all_ok = true;

        for (i, url) in row.urls.iter().enumerate() {
            let name = link_name(&row.name, i + 1);
            match self.processor.process_one_url(url, Some(name.as_str())).await {
                Ok(processed) => {
                    drive_links.push(processed.drive_file.web_view_link.clone().unwrap_or_default());
                    items.push(ItemReport {
                        url: url.clone(),
                        filename: processed.filename,
                        success: true,
                        drive_file: Some(processed.drive_file),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!("Row {} link {} failed: {}", row.row_index, url, e);
                    all_ok = false;
                    items.push(ItemReport {
                        url: url.clone(),
                        filename: sanitize_filename(&name),
                        success: false,
                        drive_file: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        RowReport {
            row_index: row.row_index,
            name: row.name,
            status: if all_ok { RowStatus::Done } else { RowStatus::Partial },
            links_count: row.urls.len(),
            drive_links,
            items,
        }
    }
}

#[cfg(test)]
#[path = "sheet_sync_tests.rs"]
mod tests;
