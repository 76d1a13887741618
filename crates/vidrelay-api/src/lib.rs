//! HTTP API for vidrelay.
//!
//! ```text
//! POST /download             one link -> one Drive file
//! POST /download-from-sheet  process the sheet queue
//! GET  /health               status, version, uptime
//! GET  /livez                liveness probe
//! ```

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::handlers::{DownloadRequest, DownloadResponse, SheetDownloadRequest};
pub use http::routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::AppState;
