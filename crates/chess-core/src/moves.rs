//! Coordinate move notation ("e2e4", "e7e8q").

use std::fmt;

use shakmaty::{File, Move, Role, Square};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("expected 4 or 5 characters, got {0}")]
    Length(usize),

    #[error("invalid square '{0}'")]
    Square(String),

    #[error("invalid promotion piece '{0}'")]
    Promotion(char),
}

/// A half-move as origin and destination squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl CoordMove {
    /// Convert a shakmaty move. Castling becomes the king's two-square step
    /// (`e1g1`, `e8c8`). Drops have no origin square and yield `None`.
    pub fn from_move(mv: &Move) -> Option<Self> {
        match *mv {
            Move::Normal { from, to, promotion, .. } => Some(Self { from, to, promotion }),
            Move::EnPassant { from, to } => Some(Self { from, to, promotion: None }),
            Move::Castle { king, rook } => {
                let file = if rook.file() > king.file() { File::G } else { File::C };
                Some(Self {
                    from: king,
                    to: Square::from_coords(file, king.rank()),
                    promotion: None,
                })
            }
            _ => None,
        }
    }
}

impl fmt::Display for CoordMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

fn parse_square(text: &str) -> Result<Square, MoveParseError> {
    let bytes = text.as_bytes();
    let valid = bytes.len() == 2
        && (b'a'..=b'h').contains(&bytes[0])
        && (b'1'..=b'8').contains(&bytes[1]);
    if !valid {
        return Err(MoveParseError::Square(text.to_string()));
    }
    Square::from_ascii(bytes).map_err(|_| MoveParseError::Square(text.to_string()))
}

/// Parse a normalized lowercase coordinate move.
pub fn parse_coord(text: &str) -> Result<CoordMove, MoveParseError> {
    if !text.is_ascii() {
        return Err(MoveParseError::Square(text.to_string()));
    }

    let promotion = match text.len() {
        4 => None,
        5 => match text.as_bytes()[4] {
            b'q' => Some(Role::Queen),
            b'r' => Some(Role::Rook),
            b'b' => Some(Role::Bishop),
            b'n' => Some(Role::Knight),
            other => return Err(MoveParseError::Promotion(other as char)),
        },
        n => return Err(MoveParseError::Length(n)),
    };

    Ok(CoordMove {
        from: parse_square(&text[0..2])?,
        to: parse_square(&text[2..4])?,
        promotion,
    })
}

pub fn is_coord(text: &str) -> bool {
    parse_coord(text).is_ok()
}
