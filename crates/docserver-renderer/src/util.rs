//! Shared helpers for HTML output.

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Extract the language token from a fence info string.
///
/// Only the first whitespace-separated word is the language; the rest
/// (e.g. `rust ignore` or `python title="x.py"`) is ignored.
pub(crate) fn fence_language(info: &str) -> Option<&str> {
    info.split_whitespace()
        .next()
        .map(|lang| lang.trim_start_matches('{').trim_end_matches('}'))
        .filter(|lang| !lang.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_plain_unchanged() {
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_fence_language_only() {
        assert_eq!(fence_language("rust"), Some("rust"));
    }

    #[test]
    fn test_fence_language_with_attrs() {
        assert_eq!(fence_language("python title=\"x.py\""), Some("python"));
    }

    #[test]
    fn test_fence_language_braced() {
        assert_eq!(fence_language("{js}"), Some("js"));
    }

    #[test]
    fn test_fence_language_empty() {
        assert_eq!(fence_language(""), None);
        assert_eq!(fence_language("   "), None);
    }
}
