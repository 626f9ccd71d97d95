//! Chess report generator
//!
//! Reads PGN files, keeps one player's games, names their openings and writes
//! a JSON report of results, openings and tactical patterns.
//!
//! Usage: chess-report [--player NAME] [--output FILE] [--match exact|contains] <pgn path|dir|glob>

mod config;
mod error;
mod pipeline;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ReportConfig;

fn main() -> anyhow::Result<()> {
    // Load .env before reading RUST_LOG or report settings
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ReportConfig::load()?;
    info!(
        player = %config.player,
        input = %config.input,
        match_mode = ?config.match_mode,
        "Config loaded"
    );

    let report = pipeline::run(&config)?;
    pipeline::write_report(&report, config.output.as_deref())?;
    Ok(())
}
