//! Google Sheets client for the download queue.
//!
//! The queue tab is read from column C to G starting at row 2:
//!
//! | Column | Content |
//! |---|---|
//! | C | Base file name |
//! | D | (unused) |
//! | E | Links, one per line |
//! | F | Drive links written back after processing |
//! | G | Status written back (`DONE` / `PARTIAL`) |

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::auth::{ServiceAccountAuth, SCOPE_DRIVE, SCOPE_SPREADSHEETS};
use crate::error::GoogleError;

const FIRST_DATA_ROW: u32 = 2;
const COL_NAME: usize = 0;
const COL_LINKS: usize = 2;
const COL_DRIVE_LINKS: usize = 3;
const COL_STATUS: usize = 4;

/// Final state of a processed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RowStatus {
    /// Every link uploaded.
    Done,
    /// At least one link failed.
    Partial,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Done => "DONE",
            RowStatus::Partial => "PARTIAL",
        }
    }

    /// Parse a status cell. Unknown values mean the row is still pending.
    pub fn parse(cell: &str) -> Option<Self> {
        match cell.trim().to_uppercase().as_str() {
            "DONE" => Some(RowStatus::Done),
            "PARTIAL" => Some(RowStatus::Partial),
            _ => None,
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending row of the queue tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetRow {
    /// 1-based sheet row number.
    pub row_index: u32,
    pub name: String,
    pub urls: Vec<String>,
    pub existing_drive_links: String,
    pub existing_status: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell(row: &[Value], index: usize) -> String {
    match row.get(index) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Turn raw sheet values into pending rows.
///
/// Rows already marked `DONE` or `PARTIAL` and rows without links are skipped.
pub fn parse_rows(values: &[Vec<Value>]) -> Vec<SheetRow> {
    values
        .iter()
        .zip(FIRST_DATA_ROW..)
        .filter_map(|(row, row_index)| {
            let status = cell(row, COL_STATUS).to_uppercase();
            if RowStatus::parse(&status).is_some() {
                return None;
            }

            let links = cell(row, COL_LINKS);
            if links.is_empty() {
                return None;
            }

            let urls = links
                .lines()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .collect();

            Some(SheetRow {
                row_index,
                name: cell(row, COL_NAME),
                urls,
                existing_drive_links: cell(row, COL_DRIVE_LINKS),
                existing_status: status,
            })
        })
        .collect()
}

/// Sheets API client bound to one spreadsheet tab.
pub struct SheetsClient {
    http: reqwest::Client,
    auth: Arc<ServiceAccountAuth>,
    base_url: String,
    sheet_id: String,
    sheet_name: String,
}

impl SheetsClient {
    pub fn new(
        http: reqwest::Client,
        auth: Arc<ServiceAccountAuth>,
        base_url: impl Into<String>,
        sheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.into(),
            sheet_id: sheet_id.into(),
            sheet_name: sheet_name.into(),
        }
    }

    /// A1 range covering the queue columns.
    pub fn read_range(&self) -> String {
        format!("{}!C{}:G", self.sheet_name, FIRST_DATA_ROW)
    }

    /// A1 range of the result cells for one row.
    pub fn result_range(&self, row_index: u32) -> String {
        format!("{}!F{}:G{}", self.sheet_name, row_index, row_index)
    }

    fn values_url(&self, range: &str) -> Result<Url, GoogleError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| GoogleError::NotABaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", &self.sheet_id, "values", range]);
        Ok(url)
    }

    async fn bearer(&self) -> Result<String, GoogleError> {
        self.auth.token(&[SCOPE_SPREADSHEETS, SCOPE_DRIVE]).await
    }

    /// Read rows still waiting to be processed.
    pub async fn read_pending_rows(&self) -> Result<Vec<SheetRow>, GoogleError> {
        let url = self.values_url(&self.read_range())?;
        let token = self.bearer().await?;

        let response = self.http.get(url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(GoogleError::from_response(response).await);
        }

        let range: ValueRange = response.json().await?;
        let rows = parse_rows(&range.values);
        info!(
            "Read {} sheet rows, {} pending",
            range.values.len(),
            rows.len()
        );
        Ok(rows)
    }

    /// Write the Drive links and status of a processed row.
    pub async fn write_result(
        &self,
        row_index: u32,
        drive_links: &str,
        status: RowStatus,
    ) -> Result<(), GoogleError> {
        let range = self.result_range(row_index);
        let mut url = self.values_url(&range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let token = self.bearer().await?;

        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [[drive_links, status.as_str()]],
        });

        let response = self
            .http
            .put(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GoogleError::from_response(response).await);
        }

        debug!("Row {} marked {}", row_index, status);
        Ok(())
    }
}

#[cfg(test)]
#[path = "sheets_tests.rs"]
mod tests;
