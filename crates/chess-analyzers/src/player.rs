//! Games seen from one player's side of the board.

use chess_core::game_data::{GameData, GameMetadata, GameResult};
use chess_core::opening::{classify_all, OpeningLabel};
use serde::Serialize;
use shakmaty::Color;

use crate::motifs;

/// How a player name is compared against the `White`/`Black` headers.
/// Both modes ignore case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerMatch {
    #[default]
    Exact,
    Contains,
}

impl PlayerMatch {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "exact" => Some(Self::Exact),
            "contains" => Some(Self::Contains),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerFilter {
    name: String,
    mode: PlayerMatch,
}

impl PlayerFilter {
    pub fn new(name: &str, mode: PlayerMatch) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            mode,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn is_player(&self, header: &str) -> bool {
        let header = header.to_lowercase();
        match self.mode {
            PlayerMatch::Exact => header == self.name,
            PlayerMatch::Contains => header.contains(&self.name),
        }
    }

    /// The side the player had, if they played this game. White is checked first.
    pub fn matches(&self, metadata: &GameMetadata) -> Option<Color> {
        if self.name.is_empty() {
            return None;
        }
        if self.is_player(&metadata.white) {
            Some(Color::White)
        } else if self.is_player(&metadata.black) {
            Some(Color::Black)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    Unknown,
}

impl Outcome {
    pub fn for_side(result: GameResult, color: Color) -> Self {
        match (result, color) {
            (GameResult::WhiteWins, Color::White) | (GameResult::BlackWins, Color::Black) => {
                Self::Win
            }
            (GameResult::WhiteWins, Color::Black) | (GameResult::BlackWins, Color::White) => {
                Self::Loss
            }
            (GameResult::Draw, _) => Self::Draw,
            (GameResult::Unknown, _) => Self::Unknown,
        }
    }
}

/// A classified game from the player's perspective.
#[derive(Debug, Clone)]
pub struct PlayerGame {
    pub color: Color,
    pub outcome: Outcome,
    pub opponent: String,
    pub opponent_rating: Option<u32>,
    pub opening: OpeningLabel,
    pub date: Option<String>,
    pub plies: usize,
    pub termination: String,
    pub time_control: String,
    pub movetext: String,
    pub motifs: Vec<&'static str>,
    pub link: Option<String>,
}

impl PlayerGame {
    pub fn full_moves(&self) -> usize {
        self.plies / 2
    }

    pub fn is_white(&self) -> bool {
        self.color == Color::White
    }

    fn from_game(game: &GameData, color: Color, opening: OpeningLabel) -> Self {
        let meta = &game.metadata;
        let (opponent, opponent_rating) = match color {
            Color::White => (&meta.black, meta.black_elo),
            Color::Black => (&meta.white, meta.white_elo),
        };

        Self {
            color,
            outcome: Outcome::for_side(meta.game_result(), color),
            opponent: opponent.to_lowercase(),
            opponent_rating,
            opening,
            date: meta.date.clone(),
            plies: game.plies(),
            termination: meta
                .termination
                .clone()
                .unwrap_or_else(|| "Normal".to_string()),
            time_control: meta
                .time_control
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            movetext: game.movetext.clone(),
            motifs: motifs::game_motifs(&game.movetext),
            link: meta.link.clone(),
        }
    }
}

/// Keep the player's games, classify their openings, and attach the labels.
/// A label already attached to a game is reused.
pub fn select_games(filter: &PlayerFilter, games: &[GameData]) -> Vec<PlayerGame> {
    let played: Vec<(&GameData, Color)> = games
        .iter()
        .filter_map(|game| filter.matches(&game.metadata).map(|color| (game, color)))
        .collect();

    let pending: Vec<&[String]> = played
        .iter()
        .filter(|(game, _)| game.opening.is_none())
        .map(|(game, _)| game.moves.as_slice())
        .collect();
    let mut fresh = classify_all(&pending).into_iter();

    played
        .into_iter()
        .map(|(game, color)| {
            let opening = game
                .opening
                .or_else(|| fresh.next())
                .unwrap_or(OpeningLabel::CLASSIFICATION_ERROR);
            PlayerGame::from_game(game, color, opening)
        })
        .collect()
}
