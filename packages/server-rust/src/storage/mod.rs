//! Match persistence.
//!
//! Two [`MatchRepository`](crate::MatchRepository) backends live here:
//!
//! - [`InMemoryMatchRepository`]: a process-local list, lost on restart
//! - [`DocumentMatchRepository`]: a document database reached through the
//!   [`MatchCollection`] seam, with a `MongoDB` implementation in
//!   [`collections::mongo`]
//!
//! [`init_repository`] picks one at startup from the server configuration.

pub mod collection;
pub mod collections;
pub mod error;
pub mod factory;
pub mod record;
pub mod repositories;

pub use collection::*;
pub use collections::{MongoCollection, MongoDialer};
pub use error::RepositoryError;
pub use factory::*;
pub use record::{MatchRecord, START_TIME_FORMAT};
pub use repositories::*;
