//! `GoGo` core: stones, the board engine, the match aggregate and query filters.

pub mod board;
pub mod game;
pub mod query;
pub mod types;

pub use board::{Board, BoardError};
pub use game::Match;
pub use query::{QueryFilter, DEFAULT_LIMIT, DEFAULT_OFFSET};
pub use types::{Coordinate, InvalidStone, Move, Stone};
