//! Application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use vidrelay_pipeline::{SheetSync, VideoProcessor};

/// Shared by all handlers.
pub struct AppState {
    pub processor: Arc<VideoProcessor>,
    pub sheet_sync: Arc<SheetSync>,
    start_time: Instant,
}

impl AppState {
    pub fn new(processor: Arc<VideoProcessor>, sheet_sync: Arc<SheetSync>) -> Self {
        Self {
            processor,
            sheet_sync,
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
