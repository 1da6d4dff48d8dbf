mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tradeplot_core::Config;

use crate::cli::Cli;

fn main() {
    init_logging();

    if let Err(error) = run() {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}

/// Events go to stderr; stdout carries the preview and summary.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.preview {
        let preview = commands::preview(&cli.csv_file, &config)?;
        println!("{preview}");
        return Ok(());
    }

    let symbol = cli
        .symbol
        .as_deref()
        .context("a symbol is required unless --preview is given")?;
    let generated = commands::generate(&cli.csv_file, symbol, cli.output.as_deref(), &config)?;
    println!("{generated}");
    if generated.skipped > 0 {
        println!("  Skipped rows: {}", generated.skipped);
    }
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(timeframe) = &cli.timeframe {
        config.matcher.timeframe = timeframe.clone();
    }
    if cli.no_labels {
        config.render.show_labels = false;
    }
    Ok(config)
}
