//! PGN discovery, game loading and report output.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chess_analyzers::{build_report, select_games, PlayerFilter, Report};
use chess_core::game_data::GameData;
use chess_core::opening::attach_openings;
use chess_core::pgn::read_pgn_games;
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::error::ReportError;

/// Resolve the input to PGN files: an existing file as is, a directory's
/// `*.pgn` files, or anything else as a glob pattern. Results are sorted.
pub fn discover_inputs(input: &str) -> Result<Vec<PathBuf>, ReportError> {
    let path = Path::new(input);
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let pattern = if path.is_dir() {
        format!("{}/*.pgn", input.trim_end_matches('/'))
    } else {
        input.to_string()
    };

    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable path");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(ReportError::NoInput(pattern));
    }
    Ok(files)
}

/// Parse every game from every file, in file order, with its opening attached.
pub fn load_games(files: &[PathBuf]) -> Result<Vec<GameData>, ReportError> {
    let mut games = Vec::new();
    for path in files {
        let reader = BufReader::new(File::open(path)?);
        let parsed = read_pgn_games(reader)?;
        info!(file = %path.display(), games = parsed.len(), "Parsed PGN file");
        games.extend(parsed);
    }
    attach_openings(&mut games);
    Ok(games)
}

pub fn run(config: &ReportConfig) -> Result<Report, ReportError> {
    let start = Instant::now();

    let files = discover_inputs(&config.input)?;
    info!(files = files.len(), input = %config.input, "Found PGN files");

    let games = load_games(&files)?;
    let filter = PlayerFilter::new(&config.player, config.match_mode);
    let player_games = select_games(&filter, &games);
    if player_games.is_empty() {
        warn!(player = %config.player, games = games.len(), "No games found for player");
    }
    info!(
        games = games.len(),
        player_games = player_games.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Games classified"
    );

    Ok(build_report(filter.name(), &player_games, &config.options))
}

/// Write the report as pretty JSON to `output`, or to stdout.
pub fn write_report(report: &Report, output: Option<&Path>) -> Result<(), ReportError> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, report)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            info!(output = %path.display(), "Report written");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, report)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}
