//! Core chess types for the report pipeline: game records, PGN ingestion,
//! coordinate moves, and the opening classifier.

pub mod game_data;
pub mod moves;
pub mod opening;
pub mod pgn;

pub use game_data::{GameData, GameMetadata, GameResult};
pub use moves::CoordMove;
pub use opening::{attach_openings, classify, classify_all, try_classify, OpeningLabel};
