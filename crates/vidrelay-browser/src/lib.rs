//! Headless Chrome control for vidrelay.
//!
//! A small Chrome DevTools Protocol (CDP) client over WebSocket plus a
//! [`BrowserManager`] that launches Chrome on demand. Only the operations the
//! video extractors need are exposed: open a page, override the user agent,
//! navigate, wait for the network to settle, and evaluate JavaScript.
//!
//! ```text
//! ┌─────────────────┐    WebSocket     ┌──────────────────┐
//! │  BrowserManager │ ◄──────────────► │  headless Chrome │
//! │   + CdpClient   │       CDP        │ (launched lazily)│
//! └─────────────────┘                  └──────────────────┘
//! ```
//!
//! Chrome is NOT started when the manager is created. The first
//! [`BrowserManager::open_page`] call launches it (or attaches to one already
//! listening on the debug port).

pub mod cdp;
pub mod manager;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig};
