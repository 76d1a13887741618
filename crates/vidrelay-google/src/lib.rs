//! Google Drive and Sheets clients.
//!
//! Both clients talk to the public REST endpoints with `reqwest` and share a
//! [`ServiceAccountAuth`] that exchanges signed JWT assertions for bearer
//! tokens. Base URLs are configurable so the clients can be pointed at a
//! proxy or a mock server.

pub mod auth;
pub mod drive;
mod error;
pub mod sheets;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, SCOPE_DRIVE, SCOPE_SPREADSHEETS};
pub use drive::{DriveClient, DriveFile};
pub use error::GoogleError;
pub use sheets::{parse_rows, RowStatus, SheetRow, SheetsClient};

#[cfg(test)]
pub(crate) mod test_support;
