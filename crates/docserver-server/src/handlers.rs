//! Document request handler.
//!
//! Every path is a file lookup under the serving root: Markdown is rendered
//! into the page template, anything else is sent as stored.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Uri, header};
use axum::response::{IntoResponse, Response};

use crate::content_type::{ContentKind, HTML_CONTENT_TYPE};
use crate::error::ServeError;
use crate::state::AppState;

/// Fallback handler serving every request path.
pub(crate) async fn serve_document(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let request_path = uri.path();
    match serve(&state, request_path).await {
        Ok(response) => response,
        Err(err) => {
            match &err {
                ServeError::Forbidden(_) => {
                    tracing::warn!(path = %request_path, "Rejected path outside served directory");
                }
                ServeError::Render(cause) => {
                    tracing::error!(path = %request_path, error = %cause, "Failed to render page");
                }
                ServeError::NotFound(_) | ServeError::UnsupportedMediaType(_) => {
                    tracing::debug!(path = %request_path, error = %err, "Request failed");
                }
            }
            state.errors.present(&err)
        }
    }
}

async fn serve(state: &AppState, request_path: &str) -> Result<Response, ServeError> {
    let path = state.resolver.resolve(request_path)?;
    tracing::debug!(path = %path.display(), "Request");

    let content = tokio::fs::read(&path)
        .await
        .map_err(|_| ServeError::NotFound(request_path.to_owned()))?;

    match state.typer.classify(&path)? {
        ContentKind::Markdown => {
            let title = page_title(&path);
            let markdown = String::from_utf8_lossy(&content);
            let html = state.renderer.render_page(&title, &markdown)?;
            Ok(([(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], html).into_response())
        }
        ContentKind::Raw(content_type) => {
            Ok(([(header::CONTENT_TYPE, content_type)], content).into_response())
        }
    }
}

/// Page title: the file's base name.
fn page_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
