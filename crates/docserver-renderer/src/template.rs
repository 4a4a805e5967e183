//! Page templates.
//!
//! A [`CompiledTemplate`] is parsed once at startup and rendered many times
//! with a short-lived [`RenderContext`]. Auto-escaping is on for every field
//! except [`ContextValue::Html`], which is inserted verbatim.

use std::collections::BTreeMap;
use std::path::Path;

use minijinja::{AutoEscape, Environment, Value};

use crate::error::{RenderError, TemplateError};

/// A single named field passed to a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextValue {
    /// Plain text, escaped on output.
    Text(String),
    /// Trusted HTML, inserted without escaping.
    Html(String),
    /// Integer value.
    Number(i64),
}

impl From<ContextValue> for Value {
    fn from(value: ContextValue) -> Self {
        match value {
            ContextValue::Text(s) => Value::from(s),
            ContextValue::Html(s) => Value::from_safe_string(s),
            ContextValue::Number(n) => Value::from(n),
        }
    }
}

/// Named fields for one render.
#[derive(Clone, Debug, Default)]
pub struct RenderContext {
    fields: BTreeMap<&'static str, ContextValue>,
}

impl RenderContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an escaped text field.
    #[must_use]
    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fields.insert(name, ContextValue::Text(value.into()));
        self
    }

    /// Add a raw HTML field.
    #[must_use]
    pub fn html(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fields.insert(name, ContextValue::Html(value.into()));
        self
    }

    /// Add an integer field.
    #[must_use]
    pub fn number(mut self, name: &'static str, value: i64) -> Self {
        self.fields.insert(name, ContextValue::Number(value));
        self
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&ContextValue> {
        self.fields.get(name)
    }

    fn to_values(&self) -> BTreeMap<&'static str, Value> {
        self.fields
            .iter()
            .map(|(name, value)| (*name, Value::from(value.clone())))
            .collect()
    }
}

/// Renders a [`RenderContext`] into a string.
pub trait TemplateRenderer: Send + Sync {
    /// Render the template with the given fields.
    fn render(&self, context: &RenderContext) -> Result<String, RenderError>;
}

/// A template compiled once with `MiniJinja`.
pub struct CompiledTemplate {
    env: Environment<'static>,
    name: String,
}

impl CompiledTemplate {
    /// Read and compile a template file.
    ///
    /// The file path doubles as the template name in error messages.
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(path.display().to_string(), source)
    }

    /// Compile a template from source text.
    pub fn from_source(
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template_owned(name.clone(), source.into())
            .map_err(|source| TemplateError::Compile {
                name: name.clone(),
                source,
            })?;
        Ok(Self { env, name })
    }
}

impl TemplateRenderer for CompiledTemplate {
    fn render(&self, context: &RenderContext) -> Result<String, RenderError> {
        let template = self.env.get_template(&self.name)?;
        Ok(template.render(context.to_values())?)
    }
}
