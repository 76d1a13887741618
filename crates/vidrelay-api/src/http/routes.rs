//! HTTP route definitions.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers::{download, download_from_sheet};
use crate::http::monitoring;
use crate::state::AppState;

/// Build the router.
///
/// ```text
/// POST /download
/// POST /download-from-sheet
/// GET  /health
/// GET  /livez
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    // Credentialed requests need the origin echoed back; `*` is refused.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let download_routes = Router::new()
        .route("/download", post(download))
        .route("/download-from-sheet", post(download_from_sheet))
        .route("/health", get(monitoring::health_check))
        .with_state(state);

    // Liveness probe has no state dependency
    let liveness_route = Router::new().route("/livez", get(monitoring::liveness_probe));

    Router::new()
        .merge(download_routes)
        .merge(liveness_route)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
