//! HTTP surface: configuration, middleware, handlers and lifecycle state.

pub mod config;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod module;

pub use config::*;
pub use handlers::AppState;
pub use lifecycle::{HealthState, Lifecycle};
pub use module::NetworkModule;
