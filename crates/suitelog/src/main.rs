//! suitelog: structured results from raw k3s/rke2 test-run logs
//!
//! Reads a test-run log from a file or stdin and prints the suites, counts
//! and failure diagnostics found in it.

use std::fs::File;
use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use suitelog::config::{Config, OutputFormat};
use suitelog::{report, run};

fn main() -> Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries the result
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(io::stderr)
        .init();

    config.validate().context("invalid configuration")?;

    info!(product = %config.product, "processing test log");
    let log = match &config.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            run::process(file, config.product, config.chunk_size)
        }
        None => run::process(io::stdin().lock(), config.product, config.chunk_size),
    }
    .context("failed to process test log")?;

    let rendered = match config.format {
        OutputFormat::Json => report::render_json(&log).context("failed to encode result")?,
        OutputFormat::Text => report::render_text(&log),
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}").context("failed to write result")?;
    Ok(())
}
