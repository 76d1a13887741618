//! HTTP handlers and routes.

pub mod handlers;
pub(crate) mod monitoring;
pub mod routes;
