use serde::{Deserialize, Serialize};

use crate::opening::OpeningLabel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub white: String,
    pub black: String,
    pub result: String, // "1-0", "0-1", "1/2-1/2", "*"
    pub white_elo: Option<u32>,
    pub black_elo: Option<u32>,
    pub date: Option<String>, // "YYYY.MM.DD", may contain '?'
    pub time_control: Option<String>,
    pub termination: Option<String>,
    pub eco: Option<String>,
    pub event: Option<String>,
    pub site: Option<String>,
    pub link: Option<String>,
}

impl Default for GameMetadata {
    fn default() -> Self {
        Self {
            white: "Unknown".to_string(),
            black: "Unknown".to_string(),
            result: "*".to_string(),
            white_elo: None,
            black_elo: None,
            date: None,
            time_control: None,
            termination: None,
            eco: None,
            event: None,
            site: None,
            link: None,
        }
    }
}

impl GameMetadata {
    pub fn game_result(&self) -> GameResult {
        GameResult::from_tag(&self.result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Unknown,
}

impl GameResult {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "1-0" => Self::WhiteWins,
            "0-1" => Self::BlackWins,
            "1/2-1/2" => Self::Draw,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameData {
    pub metadata: GameMetadata,
    pub san_moves: Vec<String>, // SAN with check/mate suffixes
    pub moves: Vec<String>,     // coordinate form, e.g. "e2e4"
    pub movetext: String,       // mainline with comments, for pattern matching
    #[serde(skip_deserializing)]
    pub opening: Option<OpeningLabel>,
}

impl GameData {
    /// Half-moves in the recorded mainline.
    pub fn plies(&self) -> usize {
        self.san_moves.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_result_from_tag() {
        assert_eq!(GameResult::from_tag("1-0"), GameResult::WhiteWins);
        assert_eq!(GameResult::from_tag("0-1"), GameResult::BlackWins);
        assert_eq!(GameResult::from_tag("1/2-1/2"), GameResult::Draw);
        assert_eq!(GameResult::from_tag("*"), GameResult::Unknown);
        assert_eq!(GameResult::from_tag(""), GameResult::Unknown);
    }

    #[test]
    fn test_metadata_defaults() {
        let meta = GameMetadata::default();
        assert_eq!(meta.white, "Unknown");
        assert_eq!(meta.result, "*");
        assert_eq!(meta.game_result(), GameResult::Unknown);
    }
}
