//! Browser instance manager.
//!
//! Launches headless Chrome on first use and hands out fresh pages.

mod manager_core;
mod manager_types;

pub use manager_core::{BrowserManager, PLAYWRIGHT_BROWSERS_PATH};
pub use manager_types::{BrowserError, BrowserManagerConfig};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
