//! Extension-based content classification.

use std::path::Path;

use mime_guess::mime;

use crate::error::ServeError;

/// Content type used for rendered pages and error pages.
pub(crate) const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Content type for files whose extension has no known mapping.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// How a file should be served.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentKind {
    /// Render to an HTML page.
    Markdown,
    /// Send the bytes unchanged with this `Content-Type`.
    Raw(String),
}

/// Classifies files by extension. Never touches the filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentTyper {
    strict: bool,
}

impl ContentTyper {
    /// Create a typer. In strict mode unknown extensions are rejected
    /// instead of served as `application/octet-stream`.
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Classify `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::UnsupportedMediaType`] in strict mode when the
    /// extension has no known MIME type.
    pub fn classify(&self, path: &Path) -> Result<ContentKind, ServeError> {
        if has_markdown_extension(path) {
            return Ok(ContentKind::Markdown);
        }

        let Some(guess) = mime_guess::from_path(path).first() else {
            if self.strict {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                return Err(ServeError::UnsupportedMediaType(name));
            }
            return Ok(ContentKind::Raw(FALLBACK_CONTENT_TYPE.to_owned()));
        };

        if matches!(guess.essence_str(), "text/markdown" | "text/x-markdown") {
            return Ok(ContentKind::Markdown);
        }

        if guess.type_() == mime::TEXT && guess.get_param(mime::CHARSET).is_none() {
            return Ok(ContentKind::Raw(format!("{guess}; charset=utf-8")));
        }
        Ok(ContentKind::Raw(guess.to_string()))
    }
}

fn has_markdown_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|md| ext.eq_ignore_ascii_case(md))
        })
}
