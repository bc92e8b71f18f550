//! `GoGo` server: HTTP match service backed by an in-memory or `MongoDB` repository.

pub mod config;
pub mod network;
pub mod storage;
pub mod traits;

pub use traits::MatchRepository;

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
