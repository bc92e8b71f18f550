//! [`MatchCollection`](super::collection::MatchCollection) backends.

pub mod mongo;

#[cfg(test)]
pub(crate) mod in_process;

pub use mongo::{MongoCollection, MongoDialer};
