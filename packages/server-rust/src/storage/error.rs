//! Error types raised by match repositories.

use mongodb::error::ErrorKind;
use thiserror::Error;

/// Errors surfaced by [`MatchRepository`](crate::MatchRepository) implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("match not found: {id}")]
    NotFound { id: String },

    #[error("document store unreachable: {0}")]
    ConnectionFailure(String),

    #[error("document store operation failed: {0}")]
    Backend(String),

    #[error("malformed match record: {0}")]
    MalformedRecord(String),
}

impl RepositoryError {
    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Whether the caller may reasonably retry the operation later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionFailure(_))
    }
}

/// Driver errors that mean the server could not be reached become
/// `ConnectionFailure`; everything else the server answered with is `Backend`.
impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        match *err.kind {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::ConnectionPoolCleared { .. } => Self::ConnectionFailure(err.to_string()),
            _ => Self::Backend(err.to_string()),
        }
    }
}

impl From<mongodb::bson::de::Error> for RepositoryError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        Self::MalformedRecord(err.to_string())
    }
}
