//! Report binary error types

use chess_core::pgn::PgnError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PGN error: {0}")]
    Pgn(#[from] PgnError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("No PGN files match {0}")]
    NoInput(String),
}
