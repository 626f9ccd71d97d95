//! PGN ingestion: headers, mainline SAN, and coordinate moves for each game.

use std::io::{self, Read};
use std::ops::ControlFlow;

use pgn_reader::{Nag, RawComment, RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::{Chess, Position};
use thiserror::Error;
use tracing::{debug, warn};

use crate::game_data::{GameData, GameMetadata};
use crate::moves::CoordMove;

const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Error)]
pub enum PgnError {
    #[error("failed to read PGN: {0}")]
    Io(#[from] io::Error),
}

/// Headers collected before the movetext starts.
#[derive(Default)]
struct GameTags {
    metadata: GameMetadata,
    setup: bool,
    fen: Option<String>,
}

/// Mainline state while the movetext is being read.
struct GameState {
    metadata: GameMetadata,
    board: Chess,
    san_moves: Vec<String>,
    moves: Vec<String>,
    movetext: String,
    /// Cleared at the first SAN that does not replay; later SAN is still recorded.
    replaying: bool,
}

impl GameState {
    fn new(metadata: GameMetadata) -> Self {
        Self {
            metadata,
            board: Chess::default(),
            san_moves: Vec::new(),
            moves: Vec::new(),
            movetext: String::new(),
            replaying: true,
        }
    }

    fn replay(&mut self, san_plus: &SanPlus) {
        if !self.replaying {
            return;
        }

        let ply = self.san_moves.len();
        let mv = match san_plus.san.to_move(&self.board) {
            Ok(mv) => mv,
            Err(e) => {
                warn!(
                    ply,
                    san = %san_plus,
                    white = %self.metadata.white,
                    black = %self.metadata.black,
                    error = %e,
                    "Stopping move conversion at unplayable SAN"
                );
                self.replaying = false;
                return;
            }
        };

        match CoordMove::from_move(&mv) {
            Some(coord) => self.moves.push(coord.to_string()),
            None => {
                self.replaying = false;
                return;
            }
        }
        self.board.play_unchecked(mv);
    }
}

#[derive(Default)]
struct GameCollector {
    skipped: usize,
}

fn header_value(value: RawTag<'_>) -> Option<String> {
    let text = value.decode_utf8_lossy().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn parse_rating(value: RawTag<'_>) -> Option<u32> {
    header_value(value)?.parse().ok()
}

impl Visitor for GameCollector {
    type Tags = GameTags;
    type Movetext = GameState;
    type Output = Option<GameData>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let meta = &mut tags.metadata;
        match name {
            b"White" => {
                if let Some(v) = header_value(value) {
                    meta.white = v;
                }
            }
            b"Black" => {
                if let Some(v) = header_value(value) {
                    meta.black = v;
                }
            }
            b"Result" => {
                if let Some(v) = header_value(value) {
                    meta.result = v;
                }
            }
            b"WhiteElo" => meta.white_elo = parse_rating(value),
            b"BlackElo" => meta.black_elo = parse_rating(value),
            b"Date" => meta.date = header_value(value),
            b"TimeControl" => meta.time_control = header_value(value),
            b"Termination" => meta.termination = header_value(value),
            b"ECO" => meta.eco = header_value(value),
            b"Event" => meta.event = header_value(value),
            b"Site" => meta.site = header_value(value),
            b"Link" => meta.link = header_value(value),
            b"SetUp" => tags.setup = header_value(value).as_deref() == Some("1"),
            b"FEN" => tags.fen = header_value(value),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        // Openings are only defined from the initial position
        if tags.setup {
            if let Some(fen) = tags.fen.as_deref() {
                if fen != STANDARD_START_FEN {
                    debug!(fen, "Skipping game from non-standard position");
                    self.skipped += 1;
                    return ControlFlow::Break(None);
                }
            }
        }

        ControlFlow::Continue(GameState::new(tags.metadata))
    }

    fn san(&mut self, state: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        let ply = state.san_moves.len();
        if !state.movetext.is_empty() {
            state.movetext.push(' ');
        }
        if ply % 2 == 0 {
            state.movetext.push_str(&format!("{}. ", ply / 2 + 1));
        }
        let san = san_plus.to_string();
        state.movetext.push_str(&san);

        state.replay(&san_plus);
        state.san_moves.push(san);
        ControlFlow::Continue(())
    }

    fn nag(&mut self, state: &mut Self::Movetext, nag: Nag) -> ControlFlow<Self::Output> {
        // Move annotations stay glued to the move, as written in the source
        let glyph = match nag.0 {
            1 => "!",
            2 => "?",
            3 => "!!",
            4 => "??",
            5 => "!?",
            6 => "?!",
            _ => "",
        };
        state.movetext.push_str(glyph);
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        state: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        let text = String::from_utf8_lossy(comment.as_bytes());
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            if !state.movetext.is_empty() {
                state.movetext.push(' ');
            }
            state.movetext.push_str(&format!("{{ {text} }}"));
        }
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _state: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true)) // mainline only
    }

    fn end_game(&mut self, state: Self::Movetext) -> Self::Output {
        Some(GameData {
            metadata: state.metadata,
            san_moves: state.san_moves,
            moves: state.moves,
            movetext: state.movetext,
            opening: None,
        })
    }
}

/// Read every game from a PGN stream, in file order.
pub fn read_pgn_games<R: Read>(input: R) -> Result<Vec<GameData>, PgnError> {
    let mut reader = Reader::new(input);
    let mut collector = GameCollector::default();
    let mut games = Vec::new();

    while let Some(output) = reader.read_game(&mut collector)? {
        if let Some(game) = output {
            games.push(game);
        }
    }

    if collector.skipped > 0 {
        debug!(skipped = collector.skipped, "Skipped non-standard games");
    }
    Ok(games)
}

/// Parse every game in a PGN string.
pub fn parse_pgn_games(pgn: &str) -> Result<Vec<GameData>, PgnError> {
    read_pgn_games(pgn.as_bytes())
}
