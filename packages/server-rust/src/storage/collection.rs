//! Document collection seam underneath the document-store repository.
//!
//! Defines [`MatchCollection`], a trimmed-down view of one collection in the
//! document database, and [`CollectionDialer`], which opens fresh sessions.
//! The repository layers identity mapping, reconnect-on-wake and `NotFound`
//! synthesis on top of these two traits.

use std::sync::Arc;

use async_trait::async_trait;
use gogo_core::QueryFilter;
use mongodb::bson::oid::ObjectId;

use super::error::RepositoryError;
use super::record::MatchRecord;

/// Result of a [`MatchCollection::find`] call.
///
/// `total` counts every record matching the selector, regardless of paging.
/// An empty result is signalled by `total == 0`, not by an error.
#[derive(Debug, Default)]
pub struct FindResult {
    /// Number of records matching the selector.
    pub total: u64,
    /// The page selected by the filter's offset and limit.
    pub records: Vec<MatchRecord>,
}

/// One session-bound handle to the matches collection.
///
/// Used as `Arc<dyn MatchCollection>`.
#[async_trait]
pub trait MatchCollection: Send + Sync {
    /// Round-trip to the server to check the session is alive.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Query by selector, applying scope as a projection and offset/limit as
    /// the paging window.
    async fn find(&self, filter: &QueryFilter) -> Result<FindResult, RepositoryError>;

    /// Insert `record` under `id`, or replace the record already stored there.
    async fn upsert_id(&self, id: ObjectId, record: &MatchRecord) -> Result<(), RepositoryError>;
}

/// Opens new sessions to the matches collection.
#[async_trait]
pub trait CollectionDialer: Send + Sync {
    /// Dial a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ConnectionFailure`] when the backend cannot
    /// be reached or the connection settings are unusable.
    async fn dial(&self) -> Result<Arc<dyn MatchCollection>, RepositoryError>;
}
