//! Square grid of stones and the single-move placement engine.
//!
//! Only occupancy is checked: captures, suicide, ko and turn order are not
//! part of this engine.

use serde::{Deserialize, Serialize};

use crate::types::{Coordinate, Move, Stone};

/// Errors produced while building boards or applying moves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("cannot perform move ({mv}), the target position is already occupied")]
    PositionOccupied { mv: Move },
    #[error("position {position} is outside a {size}x{size} board")]
    OutOfRange { position: Coordinate, size: usize },
    #[error("row {row} has {len} cells, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
}

/// Immutable-by-convention square grid of [`Stone`]s, indexed `[x][y]`.
///
/// Every row has the same length as the number of rows. Moves never modify a
/// board in place; [`Board::apply_move`] returns a new, fully independent grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Stone>>", into = "Vec<Vec<Stone>>")]
pub struct Board {
    cells: Vec<Vec<Stone>>,
}

impl Board {
    /// Creates an all-empty `size` x `size` board.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![vec![Stone::Empty; size]; size],
        }
    }

    /// Builds a board from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::NotSquare`] if any row length differs from the
    /// number of rows.
    pub fn from_rows(rows: Vec<Vec<Stone>>) -> Result<Self, BoardError> {
        let size = rows.len();
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(BoardError::NotSquare {
                row,
                len: cells.len(),
                size,
            });
        }
        Ok(Self { cells: rows })
    }

    /// Side length of the board.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Stone at `position`, or `None` when the position is off the board.
    #[must_use]
    pub fn get(&self, position: Coordinate) -> Option<Stone> {
        self.cells
            .get(position.x)
            .and_then(|row| row.get(position.y))
            .copied()
    }

    /// Read-only view of the rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Stone>] {
        &self.cells
    }

    /// Places `mv.player` at `mv.position` and returns the resulting board.
    ///
    /// `self` is left untouched. The returned board owns freshly allocated
    /// rows, so later changes to either board can never leak into the other.
    ///
    /// # Errors
    ///
    /// - [`BoardError::OutOfRange`] if the position is off the board.
    /// - [`BoardError::PositionOccupied`] if the target cell is not empty.
    pub fn apply_move(&self, mv: Move) -> Result<Board, BoardError> {
        let current = self.get(mv.position).ok_or(BoardError::OutOfRange {
            position: mv.position,
            size: self.size(),
        })?;
        if current != Stone::Empty {
            return Err(BoardError::PositionOccupied { mv });
        }

        // Vec<Vec<_>>::clone allocates every row anew.
        let mut next = self.clone();
        next.cells[mv.position.x][mv.position.y] = mv.player;
        Ok(next)
    }
}

impl TryFrom<Vec<Vec<Stone>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<Stone>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Board> for Vec<Vec<Stone>> {
    fn from(board: Board) -> Self {
        board.cells
    }
}
