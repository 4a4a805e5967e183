//! Error types for the HTTP server.

use axum::http::StatusCode;
use docserver_renderer::{RenderError, TemplateError};
use docserver_vcs::SyncError;

/// Per-request failure. Every variant ends up as an error page.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The request path resolves outside the serving root.
    #[error("Forbidden: {0} is outside the served directory")]
    Forbidden(String),

    /// The file is missing, a directory, or unreadable.
    #[error("Can't find: {0}")]
    NotFound(String),

    /// Strict mode only: the extension has no known content type.
    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),

    /// The Markdown page could not be rendered.
    #[error("Server Error: {0}")]
    Render(#[from] RenderError),
}

impl ServeError {
    /// Status code that identifies this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedMediaType(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Fatal startup failure. Nothing is served after one of these.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A page or error template could not be loaded.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Git credentials could not be resolved.
    #[error("Invalid git credentials: {0}")]
    Credentials(#[source] SyncError),

    /// The initial clone failed.
    #[error("Failed to clone repository: {0}")]
    Clone(#[source] SyncError),

    /// I/O error while preparing the serving root or running the listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The listen address could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
