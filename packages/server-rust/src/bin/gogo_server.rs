//! Match server entry point.

use anyhow::Result;
use clap::Parser;
use gogo_server::config::{LogFormat, ServerConfig};
use gogo_server::network::NetworkModule;
use gogo_server::storage::init_repository;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_tracing(config.log_format);

    let repository = init_repository(&config).await;
    let mut module = NetworkModule::new(config.network_config(), repository);
    let port = module.start().await?;
    info!(port, "gogo-server listening");

    module.serve(shutdown_signal()).await
}
