//! [`MatchRepository`](crate::MatchRepository) implementations.

pub mod document;
pub mod memory;

pub use document::DocumentMatchRepository;
pub use memory::InMemoryMatchRepository;
