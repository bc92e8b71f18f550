//! HTTP handler definitions for the match server.
//!
//! Defines `AppState` (the shared state carried through axum extractors) and
//! re-exports every handler for router assembly.

pub mod health;
pub mod matches;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use matches::{
    add_move_handler, create_match_handler, get_match_handler, list_matches_handler, test_handler,
};

use std::sync::Arc;
use std::time::Instant;

use super::{Lifecycle, NetworkConfig};
use crate::traits::MatchRepository;

/// Shared application state passed to all axum handlers via `State` extraction.
#[derive(Clone)]
pub struct AppState {
    /// Backend selected at startup.
    pub repository: Arc<dyn MatchRepository>,
    pub lifecycle: Arc<Lifecycle>,
    pub config: Arc<NetworkConfig>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(repository: Arc<dyn MatchRepository>, config: NetworkConfig) -> Self {
        Self {
            repository,
            lifecycle: Arc::new(Lifecycle::new()),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}
