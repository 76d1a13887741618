//! Download-and-upload pipeline.
//!
//! A [`VideoProcessor`] turns one link into one Drive file: pick the first
//! [`Fetcher`] that handles the link, download into the work directory,
//! upload through a [`VideoStore`], then remove the local copy. [`SheetSync`]
//! drives the processor from the queue tab of a spreadsheet and writes the
//! outcome of every row back.

mod error;
pub mod fetch;
mod filename;
mod processor;
mod sheet_sync;
pub mod store;

pub use error::PipelineError;
pub use fetch::{AliExpressFetcher, AliExpressOptions, Fetcher, YtDlpFetcher, YtDlpOptions};
pub use filename::sanitize_filename;
pub use processor::{ProcessedVideo, VideoProcessor};
pub use sheet_sync::{ItemReport, RowReport, SheetSync, SyncReport};
pub use store::{SheetStore, UnavailableGoogle, VideoStore};

#[cfg(test)]
pub(crate) mod test_support;
