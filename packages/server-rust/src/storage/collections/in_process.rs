//! In-process document collection used to exercise the document-store
//! repository without a database server.
//!
//! Documents are kept as BSON in a shared `Vec`, so every dialed session sees
//! the same data. Sessions can be killed to simulate a dropped connection, and
//! the dialer can be made unreachable.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gogo_core::QueryFilter;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Document};
use parking_lot::Mutex;

use crate::storage::collection::{CollectionDialer, FindResult, MatchCollection};
use crate::storage::error::RepositoryError;
use crate::storage::record::{fields, MatchRecord};

type Documents = Arc<Mutex<Vec<Document>>>;

pub(crate) struct InProcessCollection {
    documents: Documents,
    alive: Arc<AtomicBool>,
}

impl InProcessCollection {
    fn check_alive(&self) -> Result<(), RepositoryError> {
        if self.alive.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::ConnectionFailure("session closed".to_string()))
        }
    }
}

fn project(document: &Document, filter: &QueryFilter) -> Document {
    if filter.scope.is_empty() {
        return document.clone();
    }
    document
        .iter()
        .filter(|(key, _)| key.as_str() == fields::RECORD_ID || filter.scope.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[async_trait]
impl MatchCollection for InProcessCollection {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_alive()
    }

    async fn find(&self, filter: &QueryFilter) -> Result<FindResult, RepositoryError> {
        self.check_alive()?;
        let documents = self.documents.lock();
        let matching: Vec<&Document> = documents
            .iter()
            .filter(|doc| {
                filter
                    .selector
                    .iter()
                    .all(|(field, value)| doc.get_str(field).is_ok_and(|found| found == value.as_str()))
            })
            .collect();

        let total = matching.len() as u64;
        // Same convention as MongoDB: a zero limit means no limit.
        let limit = if filter.limit == 0 { usize::MAX } else { filter.limit };
        let records = matching
            .into_iter()
            .skip(filter.offset)
            .take(limit)
            .map(|doc| bson::from_document::<MatchRecord>(project(doc, filter)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FindResult { total, records })
    }

    async fn upsert_id(&self, id: ObjectId, record: &MatchRecord) -> Result<(), RepositoryError> {
        self.check_alive()?;
        let document =
            bson::to_document(record).map_err(|e| RepositoryError::Backend(e.to_string()))?;
        let mut documents = self.documents.lock();

        let same_id = |doc: &Document| doc.get_object_id(fields::RECORD_ID).ok() == Some(id);
        if documents
            .iter()
            .any(|doc| !same_id(doc) && doc.get_str(fields::MATCH_ID).ok() == Some(record.match_id.as_str()))
        {
            return Err(RepositoryError::Backend(format!(
                "duplicate key: match_id {}",
                record.match_id
            )));
        }

        match documents.iter_mut().find(|doc| same_id(doc)) {
            Some(slot) => *slot = document,
            None => documents.push(document),
        }
        Ok(())
    }
}

/// Dials [`InProcessCollection`] sessions over one shared document list.
#[derive(Default)]
pub(crate) struct InProcessDialer {
    documents: Documents,
    sessions: Mutex<Vec<Arc<AtomicBool>>>,
    unreachable: AtomicBool,
    dials: AtomicUsize,
}

impl InProcessDialer {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drops every session dialed so far; their pings start failing.
    pub(crate) fn kill_sessions(&self) {
        for alive in self.sessions.lock().iter() {
            alive.store(false, Ordering::SeqCst);
        }
    }

    pub(crate) fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub(crate) fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    pub(crate) fn document_count(&self) -> usize {
        self.documents.lock().len()
    }

    /// Stores a raw document, bypassing the unique `match_id` check.
    pub(crate) fn insert_raw(&self, record: &MatchRecord) {
        let document = bson::to_document(record).expect("record serializes");
        self.documents.lock().push(document);
    }
}

#[async_trait]
impl CollectionDialer for InProcessDialer {
    async fn dial(&self) -> Result<Arc<dyn MatchCollection>, RepositoryError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RepositoryError::ConnectionFailure(
                "in-process store unreachable".to_string(),
            ));
        }
        let alive = Arc::new(AtomicBool::new(true));
        self.sessions.lock().push(Arc::clone(&alive));
        Ok(Arc::new(InProcessCollection {
            documents: Arc::clone(&self.documents),
            alive,
        }))
    }
}

#[cfg(test)]
mod tests {
    use gogo_core::Match;

    use super::*;

    fn record(game: &Match) -> MatchRecord {
        MatchRecord::from_match(game, ObjectId::new())
    }

    #[tokio::test]
    async fn find_counts_all_matches_but_pages_records() {
        let dialer = InProcessDialer::new();
        let collection = dialer.dial().await.unwrap();
        for _ in 0..5 {
            let r = record(&Match::new(9, "alfred", "bob"));
            collection.upsert_id(r.record_id.unwrap(), &r).await.unwrap();
        }
        let other = record(&Match::new(9, "carol", "bob"));
        collection.upsert_id(other.record_id.unwrap(), &other).await.unwrap();

        let filter = QueryFilter::extract([("player_black", "alfred"), ("limit", "2"), ("offset", "4")]);
        let result = collection.find(&filter).await.unwrap();

        assert_eq!(result.total, 5);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].player_black, "alfred");
    }

    #[tokio::test]
    async fn find_applies_scope_projection() {
        let dialer = InProcessDialer::new();
        let collection = dialer.dial().await.unwrap();
        let r = record(&Match::new(13, "alfred", "bob"));
        collection.upsert_id(r.record_id.unwrap(), &r).await.unwrap();

        let filter = QueryFilter::extract([("scope", "player_white")]);
        let found = collection.find(&filter).await.unwrap().records.remove(0);

        assert_eq!(found.record_id, r.record_id);
        assert_eq!(found.player_white, "bob");
        assert!(found.player_black.is_empty());
        assert_eq!(found.grid_size, 0);
    }

    #[tokio::test]
    async fn upsert_replaces_by_record_id_and_rejects_duplicate_match_id() {
        let dialer = InProcessDialer::new();
        let collection = dialer.dial().await.unwrap();
        let game = Match::new(9, "b", "w");
        let first = record(&game);
        let id = first.record_id.unwrap();

        collection.upsert_id(id, &first).await.unwrap();
        collection.upsert_id(id, &first).await.unwrap();
        assert_eq!(dialer.document_count(), 1);

        let clash = record(&game);
        let err = collection
            .upsert_id(clash.record_id.unwrap(), &clash)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Backend(_)));
    }

    #[tokio::test]
    async fn killed_session_fails_ping() {
        let dialer = InProcessDialer::new();
        let collection = dialer.dial().await.unwrap();
        assert!(collection.ping().await.is_ok());

        dialer.kill_sessions();
        assert!(collection.ping().await.is_err());
        assert!(dialer.dial().await.unwrap().ping().await.is_ok());
    }
}
