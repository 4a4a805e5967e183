//! Server-side syntax highlighting for fenced code blocks.
//!
//! Highlighting is expressed purely through `class` attributes on `<span>`
//! elements so a stylesheet chosen by the page template decides colors.
//! syntect scopes are translated to highlight.js token classes
//! (`hljs-keyword`, `hljs-string`, ...), so any highlight.js theme styles
//! the output.

use syntect::parsing::{ParseState, Scope, ScopeStack, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::util::escape_html;

/// Scope prefixes and the highlight.js class they map to. More specific
/// prefixes come first.
const TOKEN_CLASSES: &[(&str, &str)] = &[
    ("comment", "hljs-comment"),
    ("string.regexp", "hljs-regexp"),
    ("string", "hljs-string"),
    ("constant.numeric", "hljs-number"),
    ("constant.character.escape", "hljs-char escape_"),
    ("constant", "hljs-literal"),
    ("keyword.operator", "hljs-operator"),
    ("keyword", "hljs-keyword"),
    ("storage.type", "hljs-keyword"),
    ("storage.modifier", "hljs-keyword"),
    ("entity.name.function", "hljs-title function_"),
    ("entity.name.class", "hljs-title class_"),
    ("entity.name.struct", "hljs-title class_"),
    ("entity.name.type", "hljs-title class_"),
    ("entity.name.tag", "hljs-name"),
    ("entity.name.section", "hljs-section"),
    ("entity.name", "hljs-title"),
    ("entity.other.attribute-name", "hljs-attr"),
    ("entity.other.inherited-class", "hljs-title class_"),
    ("support.function", "hljs-built_in"),
    ("support.type", "hljs-type"),
    ("support.class", "hljs-type"),
    ("variable.parameter", "hljs-params"),
    ("variable.language", "hljs-variable language_"),
    ("meta.annotation", "hljs-meta"),
    ("meta.attribute", "hljs-meta"),
    ("meta.preprocessor", "hljs-meta"),
    ("markup.heading", "hljs-section"),
    ("markup.bold", "hljs-strong"),
    ("markup.italic", "hljs-emphasis"),
    ("markup.underline.link", "hljs-link"),
    ("markup.quote", "hljs-quote"),
    ("markup.list", "hljs-bullet"),
    ("markup.inserted", "hljs-addition"),
    ("markup.deleted", "hljs-deletion"),
    ("markup.raw", "hljs-code"),
];

/// Highlights code into class-annotated HTML.
pub struct CodeHighlighter {
    syntaxes: SyntaxSet,
}

impl CodeHighlighter {
    /// Create a highlighter with the bundled syntax definitions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Render a code block as `<pre><code>` HTML.
    ///
    /// Known languages are highlighted and tagged `hljs language-{lang}`.
    /// Unknown languages keep the `language-{lang}` class with escaped,
    /// unhighlighted content. Blocks without a language are plain.
    pub fn highlight(&self, language: Option<&str>, code: &str) -> String {
        let Some(lang) = language else {
            return format!("<pre><code>{}</code></pre>\n", escape_html(code));
        };

        let class = escape_html(lang);
        let highlighted = self.syntaxes.find_syntax_by_token(lang).and_then(|syntax| {
            self.highlight_lines(syntax, code)
                .map_err(|err| {
                    tracing::warn!(language = lang, error = %err, "Syntax highlighting failed");
                })
                .ok()
        });
        match highlighted {
            Some(spans) => {
                format!("<pre><code class=\"hljs language-{class}\">{spans}</code></pre>\n")
            }
            None => format!(
                "<pre><code class=\"language-{class}\">{}</code></pre>\n",
                escape_html(code)
            ),
        }
    }

    fn highlight_lines(
        &self,
        syntax: &syntect::parsing::SyntaxReference,
        code: &str,
    ) -> Result<String, syntect::Error> {
        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut html = String::with_capacity(code.len() * 2);

        for line in LinesWithEndings::from(code) {
            let ops = state.parse_line(line, &self.syntaxes)?;
            let mut start = 0;
            for (index, op) in ops {
                push_token(&mut html, &line[start..index], &stack);
                start = index;
                stack.apply(&op)?;
            }
            push_token(&mut html, &line[start..], &stack);
        }

        Ok(html)
    }
}

/// Append `text`, wrapped in a span when the scope stack maps to a class.
fn push_token(html: &mut String, text: &str, stack: &ScopeStack) {
    if text.is_empty() {
        return;
    }
    match token_class(stack.as_slice()) {
        Some(class) => {
            html.push_str("<span class=\"");
            html.push_str(class);
            html.push_str("\">");
            html.push_str(&escape_html(text));
            html.push_str("</span>");
        }
        None => html.push_str(&escape_html(text)),
    }
}

/// The highlight.js class for the innermost scope that has one.
fn token_class(scopes: &[Scope]) -> Option<&'static str> {
    scopes.iter().rev().find_map(|scope| {
        let name = scope.build_string();
        TOKEN_CLASSES
            .iter()
            .find(|(prefix, _)| matches_prefix(&name, prefix))
            .map(|(_, class)| *class)
    })
}

/// Whether `name` equals `prefix` or extends it by whole atoms.
fn matches_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_known_language() {
        let html = CodeHighlighter::new().highlight(Some("rust"), "fn main() {}\n");

        assert!(html.starts_with(r#"<pre><code class="hljs language-rust">"#));
        assert!(html.contains("<span class=\""));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_highlight_emits_hljs_token_classes() {
        let html = CodeHighlighter::new().highlight(
            Some("js"),
            "// note\nfunction f() { return \"a<b\" + 1; }\n",
        );

        assert!(html.contains("<span class=\"hljs-comment\">"));
        assert!(html.contains("<span class=\"hljs-keyword\">function</span>"));
        assert!(html.contains("<span class=\"hljs-keyword\">return</span>"));
        assert!(html.contains("<span class=\"hljs-number\">1</span>"));
        assert!(html.contains("&lt;b"));
        assert!(!html.contains("<span class=\"source"));
        assert!(!html.contains("storage type"));
    }

    #[test]
    fn test_every_emitted_class_is_hljs() {
        let html = CodeHighlighter::new().highlight(
            Some("rust"),
            "#[derive(Debug)]\nstruct S { v: u8 }\nfn main() { let s = \"x\"; }\n",
        );

        let classes: Vec<&str> = html
            .split("<span class=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .collect();
        assert!(!classes.is_empty());
        for class in classes {
            assert!(class.starts_with("hljs-"), "unexpected class {class}");
        }
    }

    #[test]
    fn test_token_class_prefers_innermost_scope() {
        let scopes = [
            Scope::new("source.rust").unwrap(),
            Scope::new("meta.function.rust").unwrap(),
            Scope::new("string.quoted.double.rust").unwrap(),
        ];

        assert_eq!(token_class(&scopes), Some("hljs-string"));
        assert_eq!(token_class(&scopes[..1]), None);
    }

    #[test]
    fn test_prefix_matches_whole_atoms() {
        assert!(matches_prefix("keyword.control.rust", "keyword"));
        assert!(matches_prefix("keyword", "keyword"));
        assert!(!matches_prefix("keywords.other", "keyword"));
    }

    #[test]
    fn test_highlight_unknown_language_is_escaped() {
        let html = CodeHighlighter::new().highlight(Some("nosuchlang"), "<b>x</b>\n");

        assert_eq!(
            html,
            "<pre><code class=\"language-nosuchlang\">&lt;b&gt;x&lt;/b&gt;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_highlight_without_language() {
        let html = CodeHighlighter::new().highlight(None, "a < b\n");

        assert_eq!(html, "<pre><code>a &lt; b\n</code></pre>\n");
    }

    #[test]
    fn test_highlight_escapes_language_class() {
        let html = CodeHighlighter::new().highlight(Some("x\"y"), "code");

        assert!(html.contains("language-x&quot;y"));
    }
}
