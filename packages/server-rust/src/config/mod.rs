//! Process configuration: command line, environment and service bindings.

pub mod vcap;

use std::time::Duration;

use clap::{Parser, ValueEnum};

pub use vcap::{BindingError, ServiceBinding, VcapServices};

use crate::network::NetworkConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Match server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "gogo-server", version, about = "Go match tracking HTTP service")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Name of the bound database service in VCAP_SERVICES
    #[arg(long, env = "DB_SERVICE_NAME", default_value = "mongodb")]
    pub db_service_name: String,

    /// Credential field of the bound service carrying the connection URI
    #[arg(long, default_value = "url")]
    pub db_uri_property: String,

    /// Collection that stores matches
    #[arg(long, env = "MATCHES_COLLECTION", default_value = "matches")]
    pub collection: String,

    /// Explicit MongoDB URI; skips service binding discovery
    #[arg(long, env = "MONGO_URI")]
    pub mongo_uri: Option<String>,

    /// Maximum seconds a request may take before a 408
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Resolves the document store URI: the explicit `--mongo-uri` first,
    /// then the configured credential of the bound database service.
    ///
    /// # Errors
    ///
    /// Returns the [`BindingError`] explaining why no URI could be found.
    pub fn database_uri(&self, services: Option<&VcapServices>) -> Result<String, BindingError> {
        if let Some(uri) = self.mongo_uri.as_deref().filter(|uri| !uri.is_empty()) {
            return Ok(uri.to_string());
        }
        let services = services.ok_or(BindingError::Unset)?;
        services
            .credential(&self.db_service_name, &self.db_uri_property)
            .map(str::to_string)
    }

    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..NetworkConfig::default()
        }
    }
}
