//! Cloud Foundry service bindings from `VCAP_SERVICES`.
//!
//! The variable holds a JSON object keyed by service label, each entry a
//! list of bound service instances:
//!
//! ```json
//! { "mlab": [ { "name": "mongodb", "label": "mlab", "credentials": { "url": "mongodb://..." } } ] }
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Name of the environment variable carrying the bindings.
pub const VCAP_SERVICES_ENV: &str = "VCAP_SERVICES";

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("VCAP_SERVICES is not set")]
    Unset,

    #[error("malformed VCAP_SERVICES: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("no bound service named {0:?}")]
    MissingService(String),

    #[error("service {service:?} has no credential {property:?}")]
    MissingCredential { service: String, property: String },

    #[error("credential {property:?} of service {service:?} is not a non-empty string")]
    InvalidCredential { service: String, property: String },
}

/// One bound service instance.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceBinding {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub credentials: Map<String, Value>,
}

/// All service bindings visible to the application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct VcapServices {
    by_label: HashMap<String, Vec<ServiceBinding>>,
}

impl VcapServices {
    /// Parses a `VCAP_SERVICES` document.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Malformed`] if `raw` is not a label-keyed
    /// object of binding lists.
    pub fn parse(raw: &str) -> Result<Self, BindingError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads and parses `VCAP_SERVICES` from the process environment.
    ///
    /// # Errors
    ///
    /// [`BindingError::Unset`] when the variable is absent, otherwise as
    /// [`VcapServices::parse`].
    pub fn from_env() -> Result<Self, BindingError> {
        let raw = std::env::var(VCAP_SERVICES_ENV).map_err(|_| BindingError::Unset)?;
        Self::parse(&raw)
    }

    /// The binding whose instance name is `name`, under any label.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceBinding> {
        self.by_label
            .values()
            .flatten()
            .find(|binding| binding.name == name)
    }

    /// String credential `property` of the service named `service`.
    ///
    /// # Errors
    ///
    /// Fails when the service is not bound, the credential is absent, or it
    /// is not a non-empty string.
    pub fn credential(&self, service: &str, property: &str) -> Result<&str, BindingError> {
        let binding = self
            .service(service)
            .ok_or_else(|| BindingError::MissingService(service.to_string()))?;

        match binding.credentials.get(property) {
            None => Err(BindingError::MissingCredential {
                service: service.to_string(),
                property: property.to_string(),
            }),
            Some(Value::String(value)) if !value.is_empty() => Ok(value.as_str()),
            Some(_) => Err(BindingError::InvalidCredential {
                service: service.to_string(),
                property: property.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINDINGS: &str = r#"{
        "mlab": [
            {
                "name": "mongodb",
                "label": "mlab",
                "tags": ["document"],
                "credentials": { "url": "mongodb://db.example:27017/gogo", "port": 27017, "empty": "" }
            }
        ],
        "user-provided": [
            { "name": "other", "credentials": {} }
        ]
    }"#;

    #[test]
    fn finds_credential_by_service_name() {
        let services = VcapServices::parse(BINDINGS).unwrap();
        assert_eq!(
            services.credential("mongodb", "url").unwrap(),
            "mongodb://db.example:27017/gogo"
        );
        assert_eq!(services.service("other").unwrap().label, "");
    }

    #[test]
    fn reports_each_lookup_failure() {
        let services = VcapServices::parse(BINDINGS).unwrap();

        assert!(matches!(
            services.credential("postgres", "url"),
            Err(BindingError::MissingService(name)) if name == "postgres"
        ));
        assert!(matches!(
            services.credential("other", "url"),
            Err(BindingError::MissingCredential { .. })
        ));
        assert!(matches!(
            services.credential("mongodb", "port"),
            Err(BindingError::InvalidCredential { .. })
        ));
        assert!(matches!(
            services.credential("mongodb", "empty"),
            Err(BindingError::InvalidCredential { .. })
        ));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(
            VcapServices::parse("not json"),
            Err(BindingError::Malformed(_))
        ));
        assert!(matches!(
            VcapServices::parse(r#"{"mlab": {"name": "mongodb"}}"#),
            Err(BindingError::Malformed(_))
        ));
        assert!(VcapServices::parse("{}").unwrap().service("mongodb").is_none());
    }
}
