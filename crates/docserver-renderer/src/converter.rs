//! Markdown to HTML fragment conversion.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};

use crate::highlight::CodeHighlighter;
use crate::util::fence_language;

/// Converts Markdown source into an (unsanitized) HTML fragment.
pub trait MarkdownConverter: Send + Sync {
    /// Convert `markdown` to HTML.
    fn convert(&self, markdown: &str) -> String;
}

/// `pulldown-cmark` based converter with server-side code highlighting.
pub struct CmarkConverter {
    highlighter: CodeHighlighter,
    gfm: bool,
}

impl CmarkConverter {
    /// Create a converter with GFM extensions enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            highlighter: CodeHighlighter::new(),
            gfm: true,
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }
}

impl Default for CmarkConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter for CmarkConverter {
    fn convert(&self, markdown: &str) -> String {
        let mut code = CodeBlockState::default();

        let events = Parser::new_ext(markdown, self.parser_options()).filter_map(|event| {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match &kind {
                        CodeBlockKind::Fenced(info) => fence_language(info).map(str::to_owned),
                        CodeBlockKind::Indented => None,
                    };
                    code.start(language);
                    None
                }
                Event::Text(text) if code.is_active() => {
                    code.push_str(&text);
                    None
                }
                Event::End(TagEnd::CodeBlock) => {
                    let (language, content) = code.end();
                    let highlighted = self.highlighter.highlight(language.as_deref(), &content);
                    Some(Event::Html(highlighted.into()))
                }
                other => Some(other),
            }
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events);
        out
    }
}

/// Buffers the text of the code block currently being parsed.
#[derive(Default)]
struct CodeBlockState {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}
