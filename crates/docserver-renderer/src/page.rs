//! Full-page Markdown rendering.

use crate::converter::{CmarkConverter, MarkdownConverter};
use crate::error::RenderError;
use crate::sanitize::{AmmoniaSanitizer, HtmlSanitizer};
use crate::template::{RenderContext, TemplateRenderer};

/// Renders Markdown source into a complete HTML document.
///
/// Pipeline: convert, sanitize, then wrap in the page template with
/// `title`, `highlightJsStyle` and `mdHtml`. Nothing is cached; every call
/// starts from the given source.
pub struct MarkdownRenderer {
    converter: Box<dyn MarkdownConverter>,
    sanitizer: Box<dyn HtmlSanitizer>,
    template: Box<dyn TemplateRenderer>,
    highlight_style: String,
}

impl MarkdownRenderer {
    /// Create a renderer with the default converter and sanitizer.
    #[must_use]
    pub fn new(template: Box<dyn TemplateRenderer>, highlight_style: impl Into<String>) -> Self {
        Self {
            converter: Box::new(CmarkConverter::new()),
            sanitizer: Box::new(AmmoniaSanitizer::new()),
            template,
            highlight_style: highlight_style.into(),
        }
    }

    /// Replace the Markdown converter.
    #[must_use]
    pub fn with_converter(mut self, converter: impl MarkdownConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    /// Replace the HTML sanitizer.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: impl HtmlSanitizer + 'static) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    /// Convert and sanitize Markdown without applying the template.
    pub fn render_fragment(&self, markdown: &str) -> String {
        let html = self.converter.convert(markdown);
        self.sanitizer.sanitize(&html)
    }

    /// Render a complete page.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if the page template fails.
    pub fn render_page(&self, title: &str, markdown: &str) -> Result<String, RenderError> {
        let context = RenderContext::new()
            .text("title", title)
            .text("highlightJsStyle", self.highlight_style.as_str())
            .html("mdHtml", self.render_fragment(markdown));
        self.template.render(&context)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sanitize::ClassPolicy;
    use crate::template::CompiledTemplate;

    const MAIN: &str = "<title>{{ title }}</title>\
                        <link rel=\"stylesheet\" href=\"{{ highlightJsStyle }}.css\">\
                        <main>{{ mdHtml }}</main>";

    fn renderer() -> MarkdownRenderer {
        let template = CompiledTemplate::from_source("main", MAIN).unwrap();
        MarkdownRenderer::new(Box::new(template), "vs")
    }

    #[test]
    fn test_render_page_wraps_fragment() {
        let page = renderer().render_page("guide.md", "# Hi").unwrap();

        assert_eq!(
            page,
            "<title>guide.md</title>\
             <link rel=\"stylesheet\" href=\"vs.css\">\
             <main><h1>Hi</h1>\n</main>"
        );
    }

    #[test]
    fn test_script_in_markdown_is_removed() {
        let page = renderer()
            .render_page("guide.md", "# Hi\n<script>alert(1)</script>")
            .unwrap();

        assert!(page.contains("<h1>Hi</h1>"));
        assert!(!page.contains("<script"));
        assert!(!page.contains("alert(1)"));
    }

    #[test]
    fn test_highlight_classes_survive_sanitizing() {
        let html = renderer().render_fragment("```rust\nfn main() {}\n```\n");

        assert!(html.contains(r#"<code class="hljs language-rust">"#));
        assert!(html.contains("<span class=\""));
    }

    #[test]
    fn test_title_is_escaped() {
        let page = renderer().render_page("<x>.md", "text").unwrap();

        assert!(page.contains("<title>&lt;x&gt;.md</title>"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let renderer = renderer();
        let source = "# Guide\n\n```python\nprint('hi')\n```\n\n| a |\n|---|\n| 1 |\n";

        let first = renderer.render_page("guide.md", source).unwrap();
        let second = renderer.render_page("guide.md", source).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_template_failure_is_render_error() {
        let template =
            CompiledTemplate::from_source("main", r#"{% include "nope.html" %}"#).unwrap();
        let renderer = MarkdownRenderer::new(Box::new(template), "vs");

        let result = renderer.render_page("guide.md", "# Hi");

        assert!(matches!(result, Err(RenderError::Template(_))));
    }

    #[test]
    fn test_custom_sanitizer() {
        let renderer = renderer().with_sanitizer(AmmoniaSanitizer::with_class_policy(ClassPolicy::Strip));

        let html = renderer.render_fragment("```rust\nfn main() {}\n```\n");

        assert!(!html.contains("class="));
    }

    struct UpperConverter;

    impl MarkdownConverter for UpperConverter {
        fn convert(&self, markdown: &str) -> String {
            format!("<p>{}</p>", markdown.to_uppercase())
        }
    }

    #[test]
    fn test_custom_converter() {
        let renderer = renderer().with_converter(UpperConverter);

        assert_eq!(renderer.render_fragment("shout"), "<p>SHOUT</p>");
    }
}
