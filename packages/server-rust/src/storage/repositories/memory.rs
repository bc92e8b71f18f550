//! In-memory [`MatchRepository`] backed by a `Vec` under a read/write lock.
//!
//! Lookups are linear scans over public ids. All four operations run under the
//! same [`RwLock`], and reads return owned snapshots so callers never observe
//! a concurrent mutation.

use async_trait::async_trait;
use gogo_core::{Match, QueryFilter};
use parking_lot::RwLock;

use crate::storage::error::RepositoryError;
use crate::storage::record::{fields, START_TIME_FORMAT};
use crate::traits::MatchRepository;

/// Process-local match store, lost on restart.
#[derive(Default)]
pub struct InMemoryMatchRepository {
    matches: RwLock<Vec<Match>>,
}

impl InMemoryMatchRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Selector semantics mirror the document store: values are compared as
/// strings against string fields only, so numeric fields never match.
fn field_matches(game: &Match, field: &str, expected: &str) -> bool {
    match field {
        fields::MATCH_ID => game.id == expected,
        fields::PLAYER_BLACK => game.player_black == expected,
        fields::PLAYER_WHITE => game.player_white == expected,
        fields::START_TIME => game.start_time.format(START_TIME_FORMAT).to_string() == expected,
        _ => false,
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn add(&self, game: Match) -> Result<(), RepositoryError> {
        let mut matches = self.matches.write();
        match matches.iter_mut().find(|m| m.id == game.id) {
            Some(existing) => *existing = game,
            None => matches.push(game),
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Match>, RepositoryError> {
        Ok(self.matches.read().clone())
    }

    /// Applies the selector only; scope, limit and offset are ignored.
    async fn find(&self, filter: &QueryFilter) -> Result<Vec<Match>, RepositoryError> {
        let matches = self.matches.read();
        Ok(matches
            .iter()
            .filter(|game| {
                filter
                    .selector
                    .iter()
                    .all(|(field, value)| field_matches(game, field, value))
            })
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Match, RepositoryError> {
        self.matches
            .read()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(id))
    }

    async fn update_by_id(&self, id: &str, game: Match) -> Result<(), RepositoryError> {
        let mut matches = self.matches.write();
        let slot = matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| RepositoryError::not_found(id))?;
        *slot = game;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
