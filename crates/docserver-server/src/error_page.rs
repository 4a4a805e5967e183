//! Uniform HTML error pages.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use docserver_renderer::{RenderContext, TemplateRenderer, escape_html};

use crate::content_type::HTML_CONTENT_TYPE;
use crate::error::ServeError;

/// Renders every failure through the error template.
///
/// The template receives `title` (`"Error"`), `errorCode` and `msg`. The
/// message is HTML-escaped before it is handed over as raw HTML, since it
/// can contain the request path.
pub struct ErrorPresenter {
    template: Box<dyn TemplateRenderer>,
    legacy_status: bool,
}

impl ErrorPresenter {
    pub fn new(template: Box<dyn TemplateRenderer>) -> Self {
        Self {
            template,
            legacy_status: false,
        }
    }

    /// Send every error page with a `404` status line. The body still
    /// carries the real code.
    #[must_use]
    pub fn with_legacy_status(mut self, enabled: bool) -> Self {
        self.legacy_status = enabled;
        self
    }

    /// Build the error response for a request failure.
    pub fn present(&self, err: &ServeError) -> Response {
        self.render(err.status(), &err.to_string())
    }

    /// Build an error response for `code` with a plain-text `message`.
    ///
    /// Falls back to a plain-text body if the error template itself fails.
    pub fn render(&self, code: StatusCode, message: &str) -> Response {
        let status = if self.legacy_status {
            StatusCode::NOT_FOUND
        } else {
            code
        };

        let context = RenderContext::new()
            .text("title", "Error")
            .number("errorCode", i64::from(code.as_u16()))
            .html("msg", escape_html(message));

        match self.template.render(&context) {
            Ok(html) => (status, [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], html).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Error template failed, sending plain text");
                (
                    status,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    format!("{} {message}", code.as_u16()),
                )
                    .into_response()
            }
        }
    }
}
