//! Markdown page rendering for docserver.
//!
//! Turns Markdown source into a complete, sanitized HTML page in three
//! steps, each behind a capability trait so the concrete library can be
//! swapped:
//!
//! 1. [`MarkdownConverter`]: Markdown to HTML fragment, with fenced code
//!    highlighted into `class`-annotated spans ([`CmarkConverter`]).
//! 2. [`HtmlSanitizer`]: strips script-capable markup while keeping every
//!    `class` attribute ([`AmmoniaSanitizer`]).
//! 3. [`TemplateRenderer`]: wraps the fragment into the page template
//!    ([`CompiledTemplate`], `MiniJinja` syntax).
//!
//! # Example
//!
//! ```
//! use docserver_renderer::{CompiledTemplate, MarkdownRenderer};
//!
//! let template = CompiledTemplate::from_source(
//!     "main",
//!     "<title>{{ title }}</title><main>{{ mdHtml }}</main>",
//! )
//! .unwrap();
//! let renderer = MarkdownRenderer::new(Box::new(template), "vs");
//! let page = renderer.render_page("guide.md", "# Hello").unwrap();
//! assert!(page.contains("<h1>Hello</h1>"));
//! ```

mod converter;
mod error;
mod highlight;
mod page;
mod sanitize;
mod template;
mod util;

pub use converter::{CmarkConverter, MarkdownConverter};
pub use error::{RenderError, TemplateError};
pub use highlight::CodeHighlighter;
pub use page::MarkdownRenderer;
pub use sanitize::{AmmoniaSanitizer, ClassPolicy, HtmlSanitizer};
pub use template::{CompiledTemplate, ContextValue, RenderContext, TemplateRenderer};
pub use util::escape_html;
