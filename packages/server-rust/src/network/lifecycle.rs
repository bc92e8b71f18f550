//! Server lifecycle as seen by health probes.

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

/// Starting -> Ready -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Repository selected, listener not yet serving.
    Starting,
    Ready,
    /// Shutdown signalled; open requests are finishing, readiness fails.
    Draining,
    Stopped,
}

impl HealthState {
    /// Lowercase name used in health JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

/// Current [`HealthState`], readable from any handler without locking.
#[derive(Debug)]
pub struct Lifecycle {
    state: ArcSwap<HealthState>,
}

impl Lifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    #[must_use]
    pub fn state(&self) -> HealthState {
        **self.state.load()
    }

    fn transition(&self, next: HealthState) {
        let previous = self.state.swap(Arc::new(next));
        info!(from = previous.as_str(), to = next.as_str(), "health state changed");
    }

    pub fn set_ready(&self) {
        self.transition(HealthState::Ready);
    }

    pub fn begin_draining(&self) {
        self.transition(HealthState::Draining);
    }

    pub fn set_stopped(&self) {
        self.transition(HealthState::Stopped);
    }

    /// Resolves once `signal` does, after moving to `Draining`.
    ///
    /// Hand the result to the server's graceful shutdown so readiness fails
    /// before the listener stops accepting.
    pub fn drain_on(
        self: Arc<Self>,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> impl Future<Output = ()> + Send + 'static {
        async move {
            signal.await;
            self.begin_draining();
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
