//! Renderer error types.

use std::path::PathBuf;

/// Failure to load or compile a template at startup.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template file could not be read.
    #[error("Failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template source is not valid template syntax.
    #[error("Failed to compile template {name}: {source}")]
    Compile {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Failure while producing a page from already-loaded templates.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Template rendering failed; carries the engine's message.
    #[error("Template render failed: {0}")]
    Template(String),
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}
