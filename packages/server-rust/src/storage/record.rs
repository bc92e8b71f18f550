//! Persisted projection of a [`Match`] in the document store.
//!
//! Start times are stored as `"YYYY-MM-DD HH:MM:SS"` strings in UTC, so every
//! round trip through a record drops sub-second precision. This conversion is
//! lossy on purpose and callers comparing times must truncate to whole seconds.

use chrono::NaiveDateTime;
use gogo_core::{Board, Match, Stone};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::error::RepositoryError;

/// `strftime` layout of [`MatchRecord::start_time`].
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Field names shared by the record layout and query selectors.
pub mod fields {
    pub const RECORD_ID: &str = "_id";
    pub const MATCH_ID: &str = "match_id";
    pub const TURN_COUNT: &str = "turn_count";
    pub const GRID_SIZE: &str = "grid_size";
    pub const START_TIME: &str = "start_time";
    pub const GAME_BOARD: &str = "game_board";
    pub const PLAYER_BLACK: &str = "player_black";
    pub const PLAYER_WHITE: &str = "player_white";
}

/// One match document.
///
/// `record_id` is the store's own primary key and is invisible to callers;
/// `match_id` carries the public id. Every field defaults when absent so that
/// projected documents still decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub record_id: Option<ObjectId>,
    pub match_id: String,
    pub turn_count: u32,
    pub grid_size: usize,
    pub start_time: String,
    pub game_board: Vec<Vec<u8>>,
    pub player_black: String,
    pub player_white: String,
}

impl MatchRecord {
    /// Projects `game` into a record stored under `record_id`.
    #[must_use]
    pub fn from_match(game: &Match, record_id: ObjectId) -> Self {
        Self {
            record_id: Some(record_id),
            match_id: game.id.clone(),
            turn_count: game.turn_count,
            grid_size: game.grid_size,
            start_time: game.start_time.format(START_TIME_FORMAT).to_string(),
            game_board: game
                .board
                .rows()
                .iter()
                .map(|row| row.iter().map(|stone| u8::from(*stone)).collect())
                .collect(),
            player_black: game.player_black.clone(),
            player_white: game.player_white.clone(),
        }
    }

    /// Rebuilds the match this record describes.
    ///
    /// A record without a `game_board` (for example one fetched with a
    /// projection that excluded it) decodes to an empty grid of `grid_size`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::MalformedRecord`] if the start time does not
    /// follow [`START_TIME_FORMAT`], a cell holds an unknown stone value, or
    /// the stored grid is not `grid_size` x `grid_size`.
    pub fn into_match(self) -> Result<Match, RepositoryError> {
        let start_time = NaiveDateTime::parse_from_str(&self.start_time, START_TIME_FORMAT)
            .map_err(|e| {
                RepositoryError::MalformedRecord(format!(
                    "start_time {:?} of match {}: {e}",
                    self.start_time, self.match_id
                ))
            })?
            .and_utc();

        let board = if self.game_board.is_empty() {
            Board::new(self.grid_size)
        } else {
            let rows = self
                .game_board
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(Stone::try_from)
                        .collect::<Result<Vec<Stone>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| RepositoryError::MalformedRecord(e.to_string()))?;
            Board::from_rows(rows).map_err(|e| RepositoryError::MalformedRecord(e.to_string()))?
        };
        if board.size() != self.grid_size {
            return Err(RepositoryError::MalformedRecord(format!(
                "board of match {} is {} wide, grid size is {}",
                self.match_id,
                board.size(),
                self.grid_size
            )));
        }

        Ok(Match {
            id: self.match_id,
            grid_size: self.grid_size,
            turn_count: self.turn_count,
            start_time,
            player_black: self.player_black,
            player_white: self.player_white,
            board,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{SubsecRound, TimeZone, Utc};
    use gogo_core::{Coordinate, Move};
    use mongodb::bson;

    use super::*;

    #[test]
    fn round_trip_truncates_start_time_to_seconds() {
        let mut game = Match::new(19, "alfred", "bob");
        game.turn_count = 4;
        game.board = game
            .board
            .apply_move(Move::new(Stone::White, 3, 10))
            .unwrap();

        let record = MatchRecord::from_match(&game, ObjectId::new());
        let back = record.into_match().unwrap();

        assert_eq!(back.id, game.id);
        assert_eq!(back.grid_size, 19);
        assert_eq!(back.turn_count, 4);
        assert_eq!(back.player_black, "alfred");
        assert_eq!(back.player_white, "bob");
        assert_eq!(back.start_time, game.start_time.trunc_subsecs(0));
        assert_eq!(back.board, game.board);
    }

    #[test]
    fn start_time_uses_fixed_layout() {
        let mut game = Match::new(9, "b", "w");
        game.start_time = Utc.with_ymd_and_hms(2016, 3, 7, 14, 5, 9).unwrap();

        let record = MatchRecord::from_match(&game, ObjectId::new());
        assert_eq!(record.start_time, "2016-03-07 14:05:09");
    }

    #[test]
    fn record_layout_uses_snake_case_fields() {
        let game = Match::new(9, "b", "w");
        let id = ObjectId::new();
        let doc = bson::to_document(&MatchRecord::from_match(&game, id)).unwrap();

        assert_eq!(doc.get_object_id(fields::RECORD_ID).unwrap(), id);
        assert_eq!(doc.get_str(fields::MATCH_ID).unwrap(), game.id);
        assert_eq!(doc.get_str(fields::PLAYER_BLACK).unwrap(), "b");
        assert_eq!(doc.get_str(fields::PLAYER_WHITE).unwrap(), "w");
        assert!(doc.contains_key(fields::TURN_COUNT));
        assert!(doc.contains_key(fields::GRID_SIZE));
        assert!(doc.contains_key(fields::START_TIME));
        assert_eq!(doc.get_array(fields::GAME_BOARD).unwrap().len(), 9);
    }

    #[test]
    fn bad_start_time_is_malformed() {
        let record = MatchRecord {
            match_id: "m1".to_string(),
            grid_size: 9,
            start_time: "yesterday".to_string(),
            ..MatchRecord::default()
        };
        assert!(matches!(
            record.into_match(),
            Err(RepositoryError::MalformedRecord(_))
        ));
    }

    #[test]
    fn unknown_stone_value_is_malformed() {
        let game = Match::new(2, "b", "w");
        let mut record = MatchRecord::from_match(&game, ObjectId::new());
        record.game_board[1][1] = 9;
        assert!(matches!(
            record.into_match(),
            Err(RepositoryError::MalformedRecord(_))
        ));
    }

    #[test]
    fn missing_board_decodes_as_empty_grid() {
        let game = Match::new(13, "b", "w");
        let mut record = MatchRecord::from_match(&game, ObjectId::new());
        record.game_board.clear();

        let back = record.into_match().unwrap();
        assert_eq!(back.board.size(), 13);
        assert_eq!(back.board.get(Coordinate::new(12, 12)), Some(Stone::Empty));
    }
}
