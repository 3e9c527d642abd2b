//! Site build command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use pagegen_static::{BuildConfig, SiteBuilder};

/// Run the build command.
pub fn run(input: PathBuf, verbose: bool, strict: bool) -> Result<()> {
    tracing::debug!("Building site from {}", input.display());

    let config = BuildConfig {
        input_dir: input,
        verbose,
        strict,
    };

    let result = SiteBuilder::new(config)
        .build()
        .context("Site build failed")?;

    tracing::debug!(
        "Rendered {} pages and copied {} static files in {}ms",
        result.pages,
        result.static_files,
        result.duration_ms
    );

    tracing::debug!("Output: {}", result.output_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn builds_site_directory() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("config.json"),
            r#"[{"path": "index.html", "template": "index.tmpl", "title": "Hi"}]"#,
        )
        .unwrap();
        fs::create_dir_all(temp.path().join("templates")).unwrap();
        fs::write(
            temp.path().join("templates/index.tmpl"),
            "<h1>{{ title }}</h1>",
        )
        .unwrap();

        run(temp.path().to_path_buf(), false, false).unwrap();

        let html = fs::read_to_string(temp.path().join("www/index.html")).unwrap();
        assert_eq!(html, "<h1>Hi</h1>");
    }

    #[test]
    fn reports_missing_config() {
        let temp = tempdir().unwrap();

        let err = run(temp.path().to_path_buf(), false, false).unwrap_err();

        assert!(format!("{err:#}").contains("config.json"));
    }
}
