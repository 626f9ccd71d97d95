//! Player-level analysis on top of classified games.
//!
//! `player` turns parsed games into one player's view, `stats` and `motifs`
//! aggregate those games, and `report` gathers everything into one document.

pub mod motifs;
pub mod player;
pub mod report;
pub mod stats;

pub use player::{select_games, Outcome, PlayerFilter, PlayerGame, PlayerMatch};
pub use report::{build_report, Report, ReportOptions};
