//! Template engine for rendering pages.

use std::path::Path;

use minijinja::value::Value;
use minijinja::{
    escape_formatter, path_loader, AutoEscape, Environment, Output, State, UndefinedBehavior,
};
use serde::Serialize;

/// Extensions whose templates get HTML auto-escaping.
const ESCAPED_EXTENSIONS: &[&str] = &["html", "htm", "xml"];

/// Pick the auto-escape mode for a template by its name.
pub fn auto_escape_for(name: &str) -> AutoEscape {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    if ESCAPED_EXTENSIONS
        .iter()
        .any(|candidate| ext.eq_ignore_ascii_case(candidate))
    {
        AutoEscape::Html
    } else {
        AutoEscape::None
    }
}

/// Escape text for HTML the way markupsafe does.
///
/// Only `& < > " '` are replaced, so paths and URLs keep their slashes.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Output formatter applying [`escape_markup`] in HTML-escaped templates.
///
/// Safe strings and every other escape mode go through minijinja's default.
fn markup_formatter(
    out: &mut Output,
    state: &State,
    value: &Value,
) -> Result<(), minijinja::Error> {
    if state.auto_escape() != AutoEscape::Html || value.is_safe() {
        return escape_formatter(out, state, value);
    }

    out.write_str(&escape_markup(&value.to_string()))
        .map_err(minijinja::Error::from)
}

/// Template engine using minijinja, loading templates from a directory.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine that resolves template names inside `dir`.
    ///
    /// With `strict` set, referencing an undefined variable is a render error.
    pub fn new(dir: &Path, strict: bool) -> Self {
        let mut env = Environment::new();

        env.set_loader(path_loader(dir));
        env.set_auto_escape_callback(auto_escape_for);
        env.set_formatter(markup_formatter);

        if strict {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }

        tracing::debug!(
            "Template engine bound to {} (strict: {})",
            dir.display(),
            strict
        );

        Self { env }
    }

    /// Render the named template with `context` as its variables.
    pub fn render<S: Serialize>(
        &self,
        template: &str,
        context: S,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;
        tmpl.render(context)
    }
}
