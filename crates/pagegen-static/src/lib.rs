//! Config-driven static page builder.
//!
//! Reads a list of pages from `config.json`, copies `static/` into a fresh
//! `www/` and renders each page through its minijinja template.

pub mod assets;
pub mod builder;
pub mod config;
pub mod templates;

pub use assets::{AssetError, StaticAssets};
pub use builder::{build, BuildConfig, BuildError, BuildEvent, BuildResult, SiteBuilder};
pub use config::{load_pages, ConfigError, PageConfig};
pub use templates::TemplateEngine;
