//! pagegen CLI - render a site from config.json and templates.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "pagegen")]
#[command(about = "Generate site HTML")]
#[command(version)]
pub struct Cli {
    /// Path to directory containing config.json and templates/ directory
    input: PathBuf,

    /// Don't be verbose
    #[arg(short, long)]
    quiet: bool,

    /// Fail on undefined template variables
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(false)
        .without_time()
        .init();

    commands::build::run(cli.input, !cli.quiet, cli.strict)?;

    Ok(())
}
