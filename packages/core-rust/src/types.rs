use std::fmt;

use serde::{Deserialize, Serialize};

/// Occupant of a single board intersection.
///
/// Serializes as a small integer (`0` empty, `1` black, `2` white), which is
/// the representation used by both the HTTP payloads and persisted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Stone {
    /// No stone on the intersection.
    #[default]
    Empty,
    /// A black stone.
    Black,
    /// A white stone.
    White,
}

/// Raised when a numeric stone value is outside `0..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid stone value {0}, expected 0 (empty), 1 (black) or 2 (white)")]
pub struct InvalidStone(pub u8);

impl From<Stone> for u8 {
    fn from(stone: Stone) -> Self {
        match stone {
            Stone::Empty => 0,
            Stone::Black => 1,
            Stone::White => 2,
        }
    }
}

impl TryFrom<u8> for Stone {
    type Error = InvalidStone;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Stone::Empty),
            1 => Ok(Stone::Black),
            2 => Ok(Stone::White),
            other => Err(InvalidStone(other)),
        }
    }
}

/// Zero-based `(x, y)` intersection on a square board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    #[must_use]
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Intent by a player to place one stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Stone being placed. Callers are expected to pass `Black` or `White`.
    pub player: Stone,
    pub position: Coordinate,
}

impl Move {
    #[must_use]
    pub fn new(player: Stone, x: usize, y: usize) -> Self {
        Self {
            player,
            position: Coordinate::new(x, y),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", u8::from(self.player), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stone_numeric_values() {
        assert_eq!(u8::from(Stone::Empty), 0);
        assert_eq!(u8::from(Stone::Black), 1);
        assert_eq!(u8::from(Stone::White), 2);
        assert_eq!(Stone::try_from(2), Ok(Stone::White));
        assert_eq!(Stone::try_from(3), Err(InvalidStone(3)));
    }

    #[test]
    fn stone_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Stone::Black).unwrap(), "1");
        let white: Stone = serde_json::from_str("2").unwrap();
        assert_eq!(white, Stone::White);
        assert!(serde_json::from_str::<Stone>("7").is_err());
    }

    #[test]
    fn move_display_matches_player_and_position() {
        let mv = Move::new(Stone::White, 3, 10);
        assert_eq!(mv.to_string(), "2/(3,10)");
    }
}
