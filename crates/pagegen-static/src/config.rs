//! Page configuration records loaded from `config.json`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One page to render.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PageConfig {
    /// Output file path, relative to the output directory
    pub path: String,

    /// Canonical identifier exposed to templates.
    ///
    /// Defaults to `path` when the key is missing. An explicit `null` is
    /// treated the same way, so templates never see a null canonical path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_path: Option<String>,

    /// Template name, relative to the templates directory
    pub template: String,

    /// Every other key, passed through to the template as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageConfig {
    /// Fill in `canonical_path` from `path` when it was not given.
    pub fn normalize(&mut self) {
        if self.canonical_path.is_none() {
            self.canonical_path = Some(self.path.clone());
        }
    }

    /// The canonical path, falling back to `path`.
    pub fn canonical_path(&self) -> &str {
        self.canonical_path.as_deref().unwrap_or(&self.path)
    }

    /// Build the variables a template sees for this page.
    ///
    /// The known fields win over same-named entries in `extra`, which can only
    /// happen when a record was built by hand rather than deserialized.
    pub fn context(&self) -> Value {
        let mut vars = self.extra.clone();
        vars.insert("path".to_string(), Value::String(self.path.clone()));
        vars.insert(
            "canonical_path".to_string(),
            Value::String(self.canonical_path().to_string()),
        );
        vars.insert("template".to_string(), Value::String(self.template.clone()));
        Value::Object(vars)
    }
}

/// Errors that can occur when loading page configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Path of the config file that failed.
    pub fn path(&self) -> &str {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Parse a JSON array of page records.
pub fn parse_pages(json: &str) -> Result<Vec<PageConfig>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Read and parse the page list at `path`.
pub fn load_pages(path: &Path) -> Result<Vec<PageConfig>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let pages = parse_pages(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    tracing::debug!("Loaded {} page configs from {}", pages.len(), path.display());

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn parses_known_and_extra_fields() {
        let pages = parse_pages(
            r#"[{"path": "index.html", "template": "index.html", "title": "Hi", "n": 3}]"#,
        )
        .unwrap();

        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page.path, "index.html");
        assert_eq!(page.template, "index.html");
        assert_eq!(page.canonical_path, None);
        assert_eq!(page.extra.get("title"), Some(&json!("Hi")));
        assert_eq!(page.extra.get("n"), Some(&json!(3)));
        assert!(!page.extra.contains_key("path"));
    }

    #[test]
    fn keeps_explicit_canonical_path() {
        let mut page = parse_pages(
            r#"[{"path": "about.html", "canonical_path": "about/", "template": "t.html"}]"#,
        )
        .unwrap()
        .remove(0);

        page.normalize();

        assert_eq!(page.canonical_path.as_deref(), Some("about/"));
    }

    #[test]
    fn normalize_defaults_canonical_path_to_path() {
        let mut page = parse_pages(r#"[{"path": "blog/post.html", "template": "t.html"}]"#)
            .unwrap()
            .remove(0);

        page.normalize();

        assert_eq!(page.canonical_path.as_deref(), Some("blog/post.html"));
    }

    #[test]
    fn context_contains_every_field() {
        let page = parse_pages(
            r#"[{"path": "a.html", "template": "a.tmpl", "tags": ["x", "y"], "meta": {"draft": false}}]"#,
        )
        .unwrap()
        .remove(0);

        assert_eq!(
            page.context(),
            json!({
                "path": "a.html",
                "canonical_path": "a.html",
                "template": "a.tmpl",
                "tags": ["x", "y"],
                "meta": {"draft": false},
            })
        );
    }

    #[test]
    fn preserves_record_order() {
        let pages = parse_pages(
            r#"[
                {"path": "c.html", "template": "t"},
                {"path": "a.html", "template": "t"},
                {"path": "b.html", "template": "t"}
            ]"#,
        )
        .unwrap();

        let paths: Vec<&str> = pages.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["c.html", "a.html", "b.html"]);
    }

    #[test]
    fn errors_on_missing_template_field() {
        let result = parse_pages(r#"[{"path": "index.html"}]"#);

        assert!(result.is_err());
    }

    #[test]
    fn errors_on_non_array() {
        let result = parse_pages(r#"{"path": "index.html", "template": "t"}"#);

        assert!(result.is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");

        let result = load_pages(&path);

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn load_reports_malformed_json() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "[{").unwrap();

        let err = load_pages(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), path.display().to_string());
    }
}
