//! Startup repository selection.
//!
//! Picks the document store when a database URI can be resolved and dialed,
//! and falls back to the in-memory repository otherwise. Neither a missing
//! binding nor an unreachable database stops the server from starting.

use std::sync::Arc;

use tracing::{info, warn};

use super::collection::CollectionDialer;
use super::collections::MongoDialer;
use super::repositories::{DocumentMatchRepository, InMemoryMatchRepository};
use crate::config::{ServerConfig, VcapServices};
use crate::traits::MatchRepository;

/// Selects the repository for `config`, dialing `MongoDB` when configured.
pub async fn init_repository(config: &ServerConfig) -> Arc<dyn MatchRepository> {
    let services = match VcapServices::from_env() {
        Ok(services) => Some(services),
        Err(err) => {
            info!(reason = %err, "no service bindings loaded");
            None
        }
    };
    init_repository_with(config, services.as_ref(), |uri, collection| {
        Arc::new(MongoDialer::new(uri, collection))
    })
    .await
}

/// Same as [`init_repository`], with explicit bindings and dialer constructor.
pub async fn init_repository_with<F>(
    config: &ServerConfig,
    services: Option<&VcapServices>,
    make_dialer: F,
) -> Arc<dyn MatchRepository>
where
    F: FnOnce(String, String) -> Arc<dyn CollectionDialer>,
{
    let uri = match config.database_uri(services) {
        Ok(uri) => uri,
        Err(err) => {
            info!(reason = %err, "document store not configured, using in-memory repository");
            return Arc::new(InMemoryMatchRepository::new());
        }
    };

    let dialer = make_dialer(uri, config.collection.clone());
    match DocumentMatchRepository::connect(dialer).await {
        Ok(repository) => {
            info!(
                service = %config.db_service_name,
                collection = %config.collection,
                backend = "mongodb",
                "connected to document store"
            );
            Arc::new(repository)
        }
        Err(err) => {
            warn!(error = %err, "document store unreachable, using in-memory repository");
            Arc::new(InMemoryMatchRepository::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::storage::collections::in_process::InProcessDialer;

    fn config(args: &[&str]) -> ServerConfig {
        ServerConfig::try_parse_from(std::iter::once("gogo-server").chain(args.iter().copied()))
            .unwrap()
    }

    fn bindings() -> VcapServices {
        VcapServices::parse(
            r#"{"mlab": [{"name": "mongodb", "credentials": {"url": "mongodb://db:27017/gogo"}}]}"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn no_uri_falls_back_to_memory() {
        let config = config(&["--mongo-uri", ""]);
        let repo = init_repository_with(&config, None, |_, _| {
            panic!("must not dial without a URI")
        })
        .await;
        assert_eq!(repo.backend(), "memory");
    }

    #[tokio::test]
    async fn binding_uri_and_collection_reach_the_dialer() {
        let config = config(&["--mongo-uri", "", "--collection", "games"]);
        let dialer = InProcessDialer::new();
        let handle = Arc::clone(&dialer);

        let repo = init_repository_with(&config, Some(&bindings()), move |uri, collection| {
            assert_eq!(uri, "mongodb://db:27017/gogo");
            assert_eq!(collection, "games");
            dialer as Arc<dyn CollectionDialer>
        })
        .await;

        assert_eq!(repo.backend(), "mongodb");
        assert_eq!(handle.dial_count(), 1);
    }

    #[tokio::test]
    async fn unreachable_store_falls_back_to_memory() {
        let config = config(&["--mongo-uri", "mongodb://db:27017/gogo"]);
        let dialer = InProcessDialer::new();
        dialer.set_unreachable(true);

        let repo = init_repository_with(&config, None, move |_, _| {
            dialer as Arc<dyn CollectionDialer>
        })
        .await;
        assert_eq!(repo.backend(), "memory");
    }
}
