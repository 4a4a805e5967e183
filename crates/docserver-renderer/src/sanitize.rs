//! HTML sanitization.

/// Which `class` attributes survive sanitization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClassPolicy {
    /// Keep every class on every element. Highlighted code depends on it.
    #[default]
    AllowAll,
    /// Drop all class attributes.
    Strip,
}

/// Removes markup that could execute script from an HTML fragment.
pub trait HtmlSanitizer: Send + Sync {
    /// Return the cleaned fragment.
    fn sanitize(&self, html: &str) -> String;
}

/// `ammonia` sanitizer using its default safe tag/attribute lists.
pub struct AmmoniaSanitizer {
    builder: ammonia::Builder<'static>,
}

impl AmmoniaSanitizer {
    /// Create a sanitizer that keeps all classes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_class_policy(ClassPolicy::AllowAll)
    }

    /// Create a sanitizer with an explicit class policy.
    #[must_use]
    pub fn with_class_policy(policy: ClassPolicy) -> Self {
        let mut builder = ammonia::Builder::default();
        if policy == ClassPolicy::AllowAll {
            builder.add_generic_attributes(["class"]);
        }
        Self { builder }
    }
}

impl Default for AmmoniaSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlSanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_script_removed_with_content() {
        let clean = AmmoniaSanitizer::new().sanitize("<p>hi</p><script>alert(1)</script>");

        assert_eq!(clean, "<p>hi</p>");
    }

    #[test]
    fn test_event_handler_attribute_removed() {
        let clean = AmmoniaSanitizer::new().sanitize(r#"<img src="a.png" onerror="x()">"#);

        assert!(!clean.contains("onerror"));
        assert!(clean.contains(r#"src="a.png""#));
    }

    #[test]
    fn test_javascript_url_removed() {
        let clean = AmmoniaSanitizer::new().sanitize(r#"<a href="javascript:x()">x</a>"#);

        assert!(!clean.contains("javascript:"));
    }

    #[test]
    fn test_classes_kept_on_any_element() {
        let html = r#"<pre><code class="hljs language-rust"><span class="keyword rust">fn</span></code></pre>"#;

        assert_eq!(AmmoniaSanitizer::new().sanitize(html), html);
    }

    #[test]
    fn test_strip_policy_drops_classes() {
        let clean = AmmoniaSanitizer::with_class_policy(ClassPolicy::Strip)
            .sanitize(r#"<span class="keyword">fn</span>"#);

        assert_eq!(clean, "<span>fn</span>");
    }
}
