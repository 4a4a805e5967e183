//! Application state.
//!
//! Shared read-only by all request handlers.

use docserver_renderer::MarkdownRenderer;

use crate::content_type::ContentTyper;
use crate::error_page::ErrorPresenter;
use crate::resolve::PathResolver;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Maps request paths into the serving root.
    pub(crate) resolver: PathResolver,
    /// Decides between rendering and raw passthrough.
    pub(crate) typer: ContentTyper,
    /// Markdown to page pipeline.
    pub(crate) renderer: MarkdownRenderer,
    /// Error page rendering.
    pub(crate) errors: ErrorPresenter,
}
