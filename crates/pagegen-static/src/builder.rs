//! Site builder.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::assets::{AssetError, StaticAssets};
use crate::config::{load_pages, ConfigError};
use crate::templates::TemplateEngine;

/// Name of the page list inside the input directory.
pub const CONFIG_FILE: &str = "config.json";
/// Directory holding templates.
pub const TEMPLATES_DIR: &str = "templates";
/// Optional directory copied verbatim into the output.
pub const STATIC_DIR: &str = "static";
/// Output directory, regenerated on every build.
pub const OUTPUT_DIR: &str = "www";

/// Configuration for building a site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory containing config.json, templates/ and optionally static/
    pub input_dir: PathBuf,

    /// Log progress at info level instead of debug
    pub verbose: bool,

    /// Treat undefined template variables as errors
    pub strict: bool,
}

impl BuildConfig {
    /// Verbose, lenient build of `input_dir`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            verbose: true,
            strict: false,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.input_dir.join(CONFIG_FILE)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.input_dir.join(TEMPLATES_DIR)
    }

    pub fn static_dir(&self) -> PathBuf {
        self.input_dir.join(STATIC_DIR)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.input_dir.join(OUTPUT_DIR)
    }
}

/// A unit of progress during a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// A static file was copied into the output directory
    Copied { src: PathBuf, dst: PathBuf },

    /// A page was rendered and written
    Rendered { template: String, output: PathBuf },
}

impl fmt::Display for BuildEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildEvent::Copied { src, dst } => {
                write!(f, "Copied {} --> {}", src.display(), dst.display())
            }
            BuildEvent::Rendered { template, output } => {
                write!(f, "Rendered {} --> {}", template, output.display())
            }
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Progress events in the order they happened
    pub events: Vec<BuildEvent>,

    /// Number of pages rendered
    pub pages: usize,

    /// Number of static files copied
    pub static_files: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to load config: {path}: {message}")]
    ConfigError { path: String, message: String },

    #[error("Failed to render template: {template}: {message}")]
    TemplateError { template: String, message: String },

    #[error("Failed to read input: {0}")]
    ReadError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

impl From<ConfigError> for BuildError {
    fn from(e: ConfigError) -> Self {
        let message = match &e {
            ConfigError::Read { source, .. } => source.to_string(),
            ConfigError::Parse { source, .. } => source.to_string(),
        };
        BuildError::ConfigError {
            path: e.path().to_string(),
            message,
        }
    }
}

impl From<AssetError> for BuildError {
    fn from(e: AssetError) -> Self {
        if e.is_read() {
            BuildError::ReadError(e.to_string())
        } else {
            BuildError::WriteError(e.to_string())
        }
    }
}

/// Builds a site from an input directory.
///
/// Every build starts from scratch: the output directory is deleted, refilled
/// from `static/`, and then each configured page is rendered into it in
/// config order. A failure stops the build where it is and leaves whatever was
/// already written.
pub struct SiteBuilder {
    config: BuildConfig,
}

impl SiteBuilder {
    /// Create a new site builder.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Build the site.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let mut events = Vec::new();

        let mut pages = load_pages(&self.config.config_path())?;

        let output_dir = self.config.output_dir();
        let static_files =
            StaticAssets::reset_output(&self.config.static_dir(), &output_dir, |src, dst| {
                self.record(
                    &mut events,
                    BuildEvent::Copied {
                        src: src.to_path_buf(),
                        dst: dst.to_path_buf(),
                    },
                );
            })?;

        let templates = TemplateEngine::new(&self.config.templates_dir(), self.config.strict);

        for page in &mut pages {
            page.normalize();

            let html = templates
                .render(&page.template, page.context())
                .map_err(|e| BuildError::TemplateError {
                    template: page.template.clone(),
                    message: describe(&e),
                })?;

            // Written only once rendering succeeded; a failed page leaves no file.
            let out_path = output_dir.join(&page.path);
            write_page(&out_path, &html)?;

            self.record(
                &mut events,
                BuildEvent::Rendered {
                    template: page.template.clone(),
                    output: out_path,
                },
            );
        }

        Ok(BuildResult {
            events,
            pages: pages.len(),
            static_files,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir,
        })
    }

    fn record(&self, events: &mut Vec<BuildEvent>, event: BuildEvent) {
        if self.config.verbose {
            tracing::info!("{}", event);
        } else {
            tracing::debug!("{}", event);
        }
        events.push(event);
    }
}

/// Build `input_dir` with default settings.
pub fn build(input_dir: impl Into<PathBuf>, verbose: bool) -> Result<BuildResult, BuildError> {
    let config = BuildConfig {
        verbose,
        ..BuildConfig::new(input_dir)
    };
    SiteBuilder::new(config).build()
}

/// Write a rendered page. Parent directories are not created.
fn write_page(path: &Path, contents: &str) -> Result<(), BuildError> {
    fs::write(path, contents)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}

/// Flatten a minijinja error and its causes into one line.
fn describe(err: &minijinja::Error) -> String {
    let mut message = err.to_string();
    let mut source = Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = Error::source(cause);
    }
    message
}
