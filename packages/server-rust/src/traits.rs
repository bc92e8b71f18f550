use async_trait::async_trait;
use gogo_core::{Match, QueryFilter};

use crate::storage::RepositoryError;

/// Pluggable match persistence.
/// Implementations: in-memory (`Vec` under a lock), `MongoDB` document store.
///
/// Both implementations honor the same contract: `add` is an upsert keyed by
/// the match's public id, lookups and updates on an unknown id fail with
/// [`RepositoryError::NotFound`], and any internal storage identity survives
/// updates. Updates are last-writer-wins; the lookup an update depends on is
/// not atomic with the write.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Insert a match, or replace the stored match with the same id.
    async fn add(&self, game: Match) -> Result<(), RepositoryError>;

    /// Every match currently stored. Order is unspecified.
    async fn list(&self) -> Result<Vec<Match>, RepositoryError>;

    /// Matches satisfying `filter`.
    ///
    /// Backends may ignore the projection and paging parts of the filter, but
    /// every backend applies the selector.
    async fn find(&self, filter: &QueryFilter) -> Result<Vec<Match>, RepositoryError>;

    /// The match whose public id is `id`.
    async fn get_by_id(&self, id: &str) -> Result<Match, RepositoryError>;

    /// Replace the stored data of the match whose public id is `id`.
    async fn update_by_id(&self, id: &str, game: Match) -> Result<(), RepositoryError>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
