//! Match aggregate: identity, players, timing and the current board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::Board;

/// State of one in-progress game.
///
/// `id` is assigned once by [`Match::new`] and must not change afterwards.
/// `grid_size` fixes the board dimensions for the lifetime of the match.
/// The move engine does not touch `turn_count`; callers own that counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub grid_size: usize,
    pub turn_count: u32,
    pub start_time: DateTime<Utc>,
    pub player_black: String,
    pub player_white: String,
    pub board: Board,
}

impl Match {
    /// Starts a new match with a random v4 UUID, the current time, zero turns
    /// and an empty `grid_size` x `grid_size` board.
    ///
    /// Grid size and player names are not validated here.
    #[must_use]
    pub fn new(
        grid_size: usize,
        player_black: impl Into<String>,
        player_white: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            grid_size,
            turn_count: 0,
            start_time: Utc::now(),
            player_black: player_black.into(),
            player_white: player_white.into(),
            board: Board::new(grid_size),
        }
    }
}
