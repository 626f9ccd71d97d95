//! Opening classification from the leading plies of a game.
//!
//! Openings are named by walking [`OPENING_TABLE`] top to bottom and taking
//! the first row whose whole prefix equals the game's leading coordinate
//! moves. Rows are ordered most specific first inside each family, so a game
//! that stops before a discriminating ply falls through to the family's
//! generic row. Only exact move order counts; transpositions are not detected.

use std::fmt;
use std::thread;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::game_data::GameData;
use crate::moves::{parse_coord, MoveParseError};

/// Plies that can influence the label. Moves past this point are never read.
pub const MAX_CLASSIFIED_PLIES: usize = 6;

/// A prefix of coordinate moves and the opening it names.
pub struct OpeningRule {
    pub prefix: &'static [&'static str],
    pub name: &'static str,
}

const fn rule(prefix: &'static [&'static str], name: &'static str) -> OpeningRule {
    OpeningRule { prefix, name }
}

/// Canonical classification table. First matching row wins.
pub const OPENING_TABLE: &[OpeningRule] = &[
    // 1. e4 e5
    rule(&["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"], "Ruy Lopez"),
    rule(&["e2e4", "e7e5", "g1f3", "b8c6", "f1c4"], "Italian Game"),
    rule(&["e2e4", "e7e5", "g1f3", "b8c6"], "King's Knight Opening"),
    rule(&["e2e4", "e7e5", "g1f3", "g8f6"], "Petroff Defense"),
    rule(&["e2e4", "e7e5", "f2f4"], "King's Gambit"),
    rule(&["e2e4", "e7e5", "b1c3"], "Vienna Game"),
    rule(&["e2e4", "e7e5", "d2d4"], "Center Game"),
    rule(&["e2e4", "e7e5"], "King's Pawn Game"),
    // 1. e4 c5
    rule(&["e2e4", "c7c5", "g1f3"], "Sicilian Defense"),
    rule(&["e2e4", "c7c5", "b1c3"], "Sicilian Closed"),
    rule(&["e2e4", "c7c5", "f2f4"], "Sicilian Grand Prix"),
    rule(&["e2e4", "c7c5", "c2c3"], "Sicilian Alapin"),
    rule(&["e2e4", "c7c5"], "Sicilian Defense"),
    // 1. e4, other replies
    rule(&["e2e4", "c7c6"], "Caro-Kann Defense"),
    rule(&["e2e4", "d7d6"], "Pirc Defense"),
    rule(&["e2e4", "g8f6"], "Alekhine's Defense"),
    rule(&["e2e4", "d7d5"], "Scandinavian Defense"),
    rule(&["e2e4", "g7g6"], "Modern Defense"),
    rule(&["e2e4", "e7e6"], "French Defense"),
    rule(&["e2e4"], "King's Pawn Opening"),
    // 1. d4
    rule(&["d2d4", "d7d5", "c2c4"], "Queen's Gambit"),
    rule(&["d2d4", "d7d5", "g1f3"], "Queen's Pawn Game"),
    rule(&["d2d4", "d7d5", "e2e3"], "Colle System"),
    rule(&["d2d4", "d7d5"], "Queen's Pawn Game"),
    rule(&["d2d4", "g8f6", "c2c4", "e7e6"], "Nimzo-Indian Defense"),
    rule(&["d2d4", "g8f6", "c2c4", "g7g6"], "King's Indian Defense"),
    rule(&["d2d4", "g8f6", "g1f3", "g7g6"], "King's Indian Attack"),
    rule(&["d2d4", "g8f6"], "Indian Defense"),
    rule(&["d2d4", "f7f5"], "Dutch Defense"),
    rule(&["d2d4", "e7e6"], "Queen's Pawn Game"),
    rule(&["d2d4"], "Queen's Pawn Opening"),
    // 1. Nf3
    rule(&["g1f3", "d7d5"], "Réti Opening"),
    rule(&["g1f3", "g8f6", "c2c4"], "English Opening"),
    rule(&["g1f3", "g8f6", "d2d4"], "Queen's Pawn Game"),
    rule(&["g1f3", "g8f6", "g2g3"], "King's Indian Attack"),
    rule(&["g1f3", "g8f6"], "Réti Opening"),
    rule(&["g1f3", "c7c5"], "English Opening"),
    rule(&["g1f3"], "Réti Opening"),
    // 1. c4
    rule(&["c2c4", "e7e5"], "English Opening"),
    rule(&["c2c4", "g8f6"], "English Opening"),
    rule(&["c2c4", "c7c5"], "English Symmetrical"),
    rule(&["c2c4"], "English Opening"),
    // Flank and irregular first moves
    rule(&["f2f4"], "Bird's Opening"),
    rule(&["b2b3"], "Nimzowitsch-Larsen Attack"),
    rule(&["g2g3"], "Benko's Opening"),
    rule(&["b1c3"], "Van't Kruijs Opening"),
    rule(&[], "Irregular Opening"),
];

/// Human-readable opening name. String identity is the whole contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpeningLabel(&'static str);

impl OpeningLabel {
    pub const TOO_SHORT: Self = Self("Too short");
    pub const UNRECOGNIZED: Self = Self("Unrecognized");
    pub const CLASSIFICATION_ERROR: Self = Self("Classification error");
    pub const IRREGULAR: Self = Self("Irregular Opening");

    const SENTINELS: [Self; 3] = [Self::TOO_SHORT, Self::UNRECOGNIZED, Self::CLASSIFICATION_ERROR];

    pub fn as_str(self) -> &'static str {
        self.0
    }

    pub fn is_sentinel(self) -> bool {
        Self::SENTINELS.contains(&self)
    }

    /// Every label a consumer can see: table names in table order, then the
    /// sentinels. Each label appears once.
    pub fn catalog() -> impl Iterator<Item = OpeningLabel> {
        let mut labels: Vec<OpeningLabel> = Vec::new();
        for rule in OPENING_TABLE {
            let label = OpeningLabel(rule.name);
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels.extend(Self::SENTINELS);
        labels.into_iter()
    }

    /// Look a name up in the catalog. Names outside it map to
    /// [`OpeningLabel::UNRECOGNIZED`].
    pub fn from_name(name: &str) -> Self {
        Self::catalog()
            .find(|label| label.0 == name)
            .unwrap_or(Self::UNRECOGNIZED)
    }
}

impl fmt::Display for OpeningLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for OpeningLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("malformed move '{text}' at ply {ply}: {source}")]
    MalformedMove {
        ply: usize,
        text: String,
        #[source]
        source: MoveParseError,
    },
}

/// Classify a move sequence, reporting why a sequence could not be read.
pub fn try_classify<S: AsRef<str>>(moves: &[S]) -> Result<OpeningLabel, ClassifyError> {
    if moves.len() < 2 {
        return Ok(OpeningLabel::TOO_SHORT);
    }

    let leading = &moves[..moves.len().min(MAX_CLASSIFIED_PLIES)];
    for (ply, mv) in leading.iter().enumerate() {
        let text = mv.as_ref();
        parse_coord(text).map_err(|source| ClassifyError::MalformedMove {
            ply,
            text: text.to_string(),
            source,
        })?;
    }

    let rule = OPENING_TABLE.iter().find(|rule| {
        rule.prefix.len() <= leading.len()
            && rule
                .prefix
                .iter()
                .zip(leading)
                .all(|(expected, actual)| *expected == actual.as_ref())
    });

    // The catch-all row has an empty prefix, so a row always matches.
    Ok(rule.map_or(OpeningLabel::IRREGULAR, |rule| OpeningLabel(rule.name)))
}

/// Classify a move sequence. Never fails: malformed input becomes
/// [`OpeningLabel::CLASSIFICATION_ERROR`].
pub fn classify<S: AsRef<str>>(moves: &[S]) -> OpeningLabel {
    match try_classify(moves) {
        Ok(label) => label,
        Err(e) => {
            debug!(error = %e, "Opening classification failed");
            OpeningLabel::CLASSIFICATION_ERROR
        }
    }
}

/// Classify many games across all CPUs. Output order follows input order.
pub fn classify_all<M, S>(games: &[M]) -> Vec<OpeningLabel>
where
    M: AsRef<[S]> + Sync,
    S: AsRef<str>,
{
    if games.is_empty() {
        return Vec::new();
    }

    let workers = num_cpus::get().max(1);
    let chunk_size = games.len().div_ceil(workers);

    thread::scope(|scope| {
        let handles: Vec<_> = games
            .chunks(chunk_size)
            .map(|chunk| {
                let handle = scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|moves| classify(moves.as_ref()))
                        .collect::<Vec<_>>()
                });
                (chunk.len(), handle)
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|(len, handle)| {
                // A lost worker still yields one label per game
                handle
                    .join()
                    .unwrap_or_else(|_| vec![OpeningLabel::CLASSIFICATION_ERROR; len])
            })
            .collect()
    })
}

/// Classify every game that has no label yet and store the result on it.
pub fn attach_openings(games: &mut [GameData]) {
    let labels = {
        let pending: Vec<&[String]> = games
            .iter()
            .filter(|game| game.opening.is_none())
            .map(|game| game.moves.as_slice())
            .collect();
        classify_all(&pending)
    };

    let unlabelled = games.iter_mut().filter(|game| game.opening.is_none());
    for (game, label) in unlabelled.zip(labels) {
        game.opening = Some(label);
    }
}
