//! Report configuration from environment variables and command-line flags.
//! Flags override the environment.

use std::env;
use std::path::PathBuf;

use chess_analyzers::{PlayerMatch, ReportOptions};
use tracing::warn;

use crate::error::ReportError;

#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Player whose games are reported
    pub player: String,

    /// PGN file path or glob pattern
    pub input: String,

    /// Report destination; stdout when unset
    pub output: Option<PathBuf>,

    pub match_mode: PlayerMatch,

    pub options: ReportOptions,
}

fn parse_count(name: &str, value: Option<String>, default: usize) -> usize {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(name, value = %raw, default, "Ignoring invalid number");
            default
        }),
    }
}

fn parse_match(value: Option<String>) -> PlayerMatch {
    match value {
        None => PlayerMatch::default(),
        Some(raw) => PlayerMatch::parse(&raw).unwrap_or_else(|| {
            warn!(value = %raw, "Unknown match mode, using exact");
            PlayerMatch::default()
        }),
    }
}

impl ReportConfig {
    /// Load configuration from the process environment and arguments.
    pub fn load() -> Result<Self, ReportError> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::from_sources(|key| env::var(key).ok(), &args)
    }

    /// Build a configuration from an environment lookup and the arguments
    /// after the program name.
    pub fn from_sources(
        lookup: impl Fn(&str) -> Option<String>,
        args: &[String],
    ) -> Result<Self, ReportError> {
        let mut player = lookup("CHESS_REPORT_PLAYER");
        let mut input = lookup("CHESS_REPORT_PGN");
        let mut output = lookup("CHESS_REPORT_OUTPUT");
        let mut match_mode = lookup("CHESS_REPORT_MATCH");
        let mut min_opening = lookup("CHESS_REPORT_MIN_OPENING_GAMES");
        let mut min_opponent = lookup("CHESS_REPORT_MIN_OPPONENT_GAMES");
        let mut min_time_control = lookup("CHESS_REPORT_MIN_TIME_CONTROL_GAMES");
        let mut top_defeated = lookup("CHESS_REPORT_TOP_DEFEATED");

        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            let slot = match arg {
                "--player" => &mut player,
                "--output" => &mut output,
                "--match" => &mut match_mode,
                "--min-opening-games" => &mut min_opening,
                "--min-opponent-games" => &mut min_opponent,
                "--min-time-control-games" => &mut min_time_control,
                "--top-defeated" => &mut top_defeated,
                flag if flag.starts_with("--") => {
                    return Err(ReportError::Config("unknown flag"));
                }
                _ => {
                    input = Some(arg.to_string());
                    i += 1;
                    continue;
                }
            };
            let value = args
                .get(i + 1)
                .ok_or(ReportError::Config("flag is missing its value"))?;
            *slot = Some(value.clone());
            i += 2;
        }

        let player = player
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or(ReportError::Config("CHESS_REPORT_PLAYER or --player not set"))?;
        let input = input
            .filter(|p| !p.trim().is_empty())
            .ok_or(ReportError::Config("CHESS_REPORT_PGN or a PGN path not set"))?;

        let defaults = ReportOptions::default();
        let options = ReportOptions {
            min_opening_games: parse_count(
                "min_opening_games",
                min_opening,
                defaults.min_opening_games,
            ),
            min_opponent_games: parse_count(
                "min_opponent_games",
                min_opponent,
                defaults.min_opponent_games,
            ),
            min_time_control_games: parse_count(
                "min_time_control_games",
                min_time_control,
                defaults.min_time_control_games,
            ),
            top_defeated: parse_count("top_defeated", top_defeated, defaults.top_defeated),
            ..defaults
        };

        Ok(Self {
            player,
            input,
            output: output.filter(|o| !o.is_empty()).map(PathBuf::from),
            match_mode: parse_match(match_mode),
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_only() {
        let env = env_of(&[
            ("CHESS_REPORT_PLAYER", "hero"),
            ("CHESS_REPORT_PGN", "games/*.pgn"),
            ("CHESS_REPORT_MATCH", "contains"),
            ("CHESS_REPORT_TOP_DEFEATED", "10"),
        ]);
        let config = ReportConfig::from_sources(env, &[]).unwrap();
        assert_eq!(config.player, "hero");
        assert_eq!(config.input, "games/*.pgn");
        assert_eq!(config.output, None);
        assert_eq!(config.match_mode, PlayerMatch::Contains);
        assert_eq!(config.options.top_defeated, 10);
        assert_eq!(config.options.min_opening_games, 3);
        assert_eq!(config.options.min_time_control_games, 10);
    }

    #[test]
    fn test_flags_override_env() {
        let env = env_of(&[
            ("CHESS_REPORT_PLAYER", "hero"),
            ("CHESS_REPORT_PGN", "old.pgn"),
        ]);
        let config = ReportConfig::from_sources(
            env,
            &args(&[
                "--player",
                "villain",
                "new.pgn",
                "--output",
                "out.json",
                "--min-opponent-games",
                "5",
            ]),
        )
        .unwrap();
        assert_eq!(config.player, "villain");
        assert_eq!(config.input, "new.pgn");
        assert_eq!(config.output, Some(PathBuf::from("out.json")));
        assert_eq!(config.options.min_opponent_games, 5);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let env = env_of(&[("CHESS_REPORT_MIN_OPENING_GAMES", "lots")]);
        let config =
            ReportConfig::from_sources(env, &args(&["--player", "hero", "a.pgn"])).unwrap();
        assert_eq!(config.options.min_opening_games, 3);
        assert_eq!(config.match_mode, PlayerMatch::Exact);
    }

    #[test]
    fn test_missing_player() {
        let err = ReportConfig::from_sources(env_of(&[]), &args(&["a.pgn"])).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_missing_input() {
        let err = ReportConfig::from_sources(env_of(&[]), &args(&["--player", "hero"])).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_flag_without_value() {
        let err = ReportConfig::from_sources(env_of(&[]), &args(&["a.pgn", "--player"])).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_unknown_flag() {
        let err = ReportConfig::from_sources(env_of(&[]), &args(&["--colour", "white"])).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }
}
