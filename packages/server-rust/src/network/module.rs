//! Network module with deferred startup lifecycle.
//!
//! `new()` wires shared state around the selected repository, `start()` binds
//! the TCP listener, and `serve()` accepts connections until shutdown.

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use super::config::NetworkConfig;
use super::handlers::{
    add_move_handler, create_match_handler, get_match_handler, health_handler,
    list_matches_handler, liveness_handler, readiness_handler, test_handler, AppState,
};
use super::middleware::build_http_layers;
use super::lifecycle::Lifecycle;
use crate::traits::MatchRepository;

/// Assembles every route and the middleware stack around `state`.
pub fn router(state: AppState) -> Router {
    let layers = build_http_layers(&state.config);

    Router::new()
        .route("/test", get(test_handler))
        .route("/matches", get(list_matches_handler).post(create_match_handler))
        .route("/matches/{id}", get(get_match_handler))
        .route("/matches/{id}/moves", post(add_move_handler))
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .layer(layers)
        .with_state(state)
}

/// Owns the HTTP server lifecycle.
pub struct NetworkModule {
    state: AppState,
    listener: Option<TcpListener>,
}

impl NetworkModule {
    #[must_use]
    pub fn new(config: NetworkConfig, repository: Arc<dyn MatchRepository>) -> Self {
        Self {
            state: AppState::new(repository, config),
            listener: None,
        }
    }

    /// Shared handle to the health state.
    #[must_use]
    pub fn lifecycle(&self) -> Arc<Lifecycle> {
        Arc::clone(&self.state.lifecycle)
    }

    #[must_use]
    pub fn build_router(&self) -> Router {
        router(self.state.clone())
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the bound port, which differs from the configured one when
    /// port 0 asks for an OS-assigned port.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let config = &self.state.config;
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!(host = %config.host, port, "TCP listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves.
    ///
    /// The health state moves to `Draining` as soon as the signal fires, so
    /// readiness fails while axum finishes the open requests, and to
    /// `Stopped` once they are done.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first or the server hits
    /// a fatal I/O error.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;
        let lifecycle = Arc::clone(&self.state.lifecycle);
        let backend = self.state.repository.backend();
        let router = router(self.state);

        lifecycle.set_ready();
        info!(backend, "serving match API");

        axum::serve(listener, router)
            .with_graceful_shutdown(Arc::clone(&lifecycle).drain_on(shutdown))
            .await?;

        lifecycle.set_stopped();
        Ok(())
    }
}
