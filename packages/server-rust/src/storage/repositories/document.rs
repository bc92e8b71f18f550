//! Document-store [`MatchRepository`] on top of a [`MatchCollection`].
//!
//! Every operation first wakes the session: it pings the current collection
//! handle and, only if the ping fails, dials a fresh one. Reconnects are
//! serialized so concurrent callers never dial twice for the same failure.
//!
//! Public ids live in the `match_id` field; the document's own `_id` is an
//! internal key that is generated on first insert and reused by every later
//! write, so updates replace the existing document instead of adding one.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use gogo_core::{Match, QueryFilter};
use mongodb::bson::oid::ObjectId;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::storage::collection::{CollectionDialer, MatchCollection};
use crate::storage::error::RepositoryError;
use crate::storage::record::{fields, MatchRecord};
use crate::traits::MatchRepository;

/// Fields a projected query must still fetch to rebuild a [`Match`].
const REQUIRED_FIELDS: [&str; 3] = [fields::MATCH_ID, fields::GRID_SIZE, fields::START_TIME];

struct Session {
    collection: Arc<dyn MatchCollection>,
    generation: u64,
}

/// Match repository persisted in a document database.
pub struct DocumentMatchRepository {
    dialer: Arc<dyn CollectionDialer>,
    session: ArcSwap<Session>,
    reconnect: Mutex<()>,
}

impl DocumentMatchRepository {
    /// Dials the initial session.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ConnectionFailure`] if the first dial fails.
    pub async fn connect(dialer: Arc<dyn CollectionDialer>) -> Result<Self, RepositoryError> {
        let collection = dialer.dial().await?;
        Ok(Self {
            dialer,
            session: ArcSwap::from_pointee(Session {
                collection,
                generation: 0,
            }),
            reconnect: Mutex::new(()),
        })
    }

    /// Returns a live collection handle, redialing only if the current one
    /// fails its ping.
    async fn wake(&self) -> Result<Arc<dyn MatchCollection>, RepositoryError> {
        let current = self.session.load_full();
        if current.collection.ping().await.is_ok() {
            return Ok(Arc::clone(&current.collection));
        }

        let _guard = self.reconnect.lock().await;
        let latest = self.session.load_full();
        if latest.generation != current.generation {
            // Another caller already reconnected while we waited.
            return Ok(Arc::clone(&latest.collection));
        }

        warn!(
            generation = current.generation,
            "document store ping failed, dialing a fresh session"
        );
        let collection = self.dialer.dial().await?;
        self.session.store(Arc::new(Session {
            collection: Arc::clone(&collection),
            generation: current.generation + 1,
        }));
        Ok(collection)
    }

    /// Looks up the record carrying public id `id`.
    ///
    /// The backend reports emptiness through the match count, so `NotFound`
    /// is synthesized here.
    async fn find_record(
        collection: &dyn MatchCollection,
        id: &str,
    ) -> Result<MatchRecord, RepositoryError> {
        let result = collection
            .find(&QueryFilter::by_field(fields::MATCH_ID, id))
            .await?;
        if result.total > 1 {
            warn!(match_id = %id, count = result.total, "duplicate match_id records");
        }
        if result.total == 0 {
            return Err(RepositoryError::not_found(id));
        }
        result
            .records
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::not_found(id))
    }

    async fn upsert(
        collection: &dyn MatchCollection,
        record_id: ObjectId,
        game: &Match,
    ) -> Result<(), RepositoryError> {
        let record = MatchRecord::from_match(game, record_id);
        collection.upsert_id(record_id, &record).await
    }
}

#[async_trait]
impl MatchRepository for DocumentMatchRepository {
    async fn add(&self, game: Match) -> Result<(), RepositoryError> {
        let collection = self.wake().await?;
        let record_id = match Self::find_record(collection.as_ref(), &game.id).await {
            Ok(existing) => existing.record_id.unwrap_or_else(ObjectId::new),
            Err(RepositoryError::NotFound { .. }) => ObjectId::new(),
            Err(err) => return Err(err),
        };
        debug!(match_id = %game.id, %record_id, "upserting match");
        Self::upsert(collection.as_ref(), record_id, &game).await
    }

    /// Pages through the whole collection with the default page size.
    async fn list(&self) -> Result<Vec<Match>, RepositoryError> {
        let collection = self.wake().await?;
        let mut filter = QueryFilter::default();
        let mut matches = Vec::new();

        loop {
            let result = collection.find(&filter).await?;
            let fetched = result.records.len();
            for record in result.records {
                matches.push(record.into_match()?);
            }
            filter.offset += fetched;
            if fetched < filter.limit || filter.offset as u64 >= result.total {
                break;
            }
        }
        Ok(matches)
    }

    /// Applies the whole filter. When a scope is given, the fields needed to
    /// rebuild a match are fetched as well and every other excluded field
    /// comes back with its default value.
    async fn find(&self, filter: &QueryFilter) -> Result<Vec<Match>, RepositoryError> {
        let collection = self.wake().await?;
        let mut filter = filter.clone();
        if !filter.scope.is_empty() {
            filter
                .scope
                .extend(REQUIRED_FIELDS.iter().map(|field| (*field).to_string()));
        }

        collection
            .find(&filter)
            .await?
            .records
            .into_iter()
            .map(MatchRecord::into_match)
            .collect()
    }

    async fn get_by_id(&self, id: &str) -> Result<Match, RepositoryError> {
        let collection = self.wake().await?;
        Self::find_record(collection.as_ref(), id).await?.into_match()
    }

    async fn update_by_id(&self, id: &str, game: Match) -> Result<(), RepositoryError> {
        let collection = self.wake().await?;
        let existing = Self::find_record(collection.as_ref(), id).await?;
        let record_id = existing.record_id.unwrap_or_else(ObjectId::new);
        Self::upsert(collection.as_ref(), record_id, &game).await
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
