//! Router construction.
//!
//! There are no routes: every request falls through to the document
//! handler, wrapped in tracing and security header middleware.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new().fallback(handlers::serve_document);

    for layer in security::security_header_layers() {
        router = router.layer(layer);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
