//! `MongoDB` implementation of [`MatchCollection`] and [`CollectionDialer`].

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use gogo_core::QueryFilter;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::info;

use crate::storage::collection::{CollectionDialer, FindResult, MatchCollection};
use crate::storage::error::RepositoryError;
use crate::storage::record::{fields, MatchRecord};

fn connection_failure(err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::ConnectionFailure(err.to_string())
}

/// Dials `MongoDB` sessions for one collection.
///
/// The connection URI must name a database (`mongodb://host:port/<db>`).
pub struct MongoDialer {
    uri: String,
    collection: String,
}

impl MongoDialer {
    #[must_use]
    pub fn new(uri: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl CollectionDialer for MongoDialer {
    async fn dial(&self) -> Result<Arc<dyn MatchCollection>, RepositoryError> {
        let options = ClientOptions::parse(&self.uri)
            .await
            .map_err(connection_failure)?;
        let database_name = options
            .default_database
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| connection_failure("connection URI does not name a database"))?;

        let client = Client::with_options(options).map_err(connection_failure)?;
        let database = client.database(&database_name);
        let collection = MongoCollection {
            matches: database.collection(&self.collection),
            database,
        };

        collection.ping().await?;
        collection.ensure_unique_match_id().await?;

        info!(
            database = %database_name,
            collection = %self.collection,
            "dialed MongoDB session"
        );
        Ok(Arc::new(collection))
    }
}

/// Session-bound handle to the matches collection.
pub struct MongoCollection {
    database: Database,
    matches: Collection<MatchRecord>,
}

impl MongoCollection {
    /// Public ids must map to exactly one document.
    async fn ensure_unique_match_id(&self) -> Result<(), RepositoryError> {
        let mut keys = Document::new();
        keys.insert(fields::MATCH_ID, 1);
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.matches.create_index(index).await?;
        Ok(())
    }
}

fn selector_document(filter: &QueryFilter) -> Document {
    filter
        .selector
        .iter()
        .map(|(field, value)| (field.clone(), Bson::String(value.clone())))
        .collect()
}

/// Internal ids grow with creation time, so matches added while a caller
/// pages through the collection land after the pages already read.
fn page_order() -> Document {
    doc! { "_id": 1 }
}

fn projection_document(filter: &QueryFilter) -> Option<Document> {
    if filter.scope.is_empty() {
        return None;
    }
    Some(
        filter
            .scope
            .iter()
            .map(|field| (field.clone(), Bson::Int32(1)))
            .collect(),
    )
}

#[async_trait]
impl MatchCollection for MongoCollection {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(connection_failure)
    }

    async fn find(&self, filter: &QueryFilter) -> Result<FindResult, RepositoryError> {
        let selector = selector_document(filter);
        let total = self.matches.count_documents(selector.clone()).await?;

        let mut query = self
            .matches
            .find(selector)
            .sort(page_order())
            .skip(u64::try_from(filter.offset).unwrap_or(u64::MAX))
            .limit(i64::try_from(filter.limit).unwrap_or(i64::MAX));
        if let Some(projection) = projection_document(filter) {
            query = query.projection(projection);
        }

        let records: Vec<MatchRecord> = query.await?.try_collect().await?;
        Ok(FindResult { total, records })
    }

    async fn upsert_id(&self, id: ObjectId, record: &MatchRecord) -> Result<(), RepositoryError> {
        self.matches
            .replace_one(doc! { "_id": id }, record)
            .upsert(true)
            .await?;
        Ok(())
    }
}
