//! Persistence seam: the record store trait and its in-memory backend.
//!
//! The pipeline never owns a store: it receives one by reference, and the
//! boundary layer owns the lifecycle. Collection replacement is
//! delete-then-insert with no transaction: a failure between the two can
//! leave the collection empty. That gap is part of the contract and is
//! spelled out on [`RecordStore::replace_all`].

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::StoreResult;
use crate::models::OutputRecord;

/// Storage backend for flat output records, keyed by collection name.
///
/// Synchronous by design: the pipeline is single-threaded batch work with
/// no suspension points. Implementations must be shareable across the HTTP
/// handlers, hence `Send + Sync`.
pub trait RecordStore: Send + Sync {
    /// Remove every record of the collection. Returns the removed count.
    /// An unknown collection is empty, not an error.
    fn delete_all(&self, collection: &str) -> StoreResult<usize>;

    /// Append records to the collection, creating it if needed. Returns the
    /// inserted count.
    fn insert_many(&self, collection: &str, records: Vec<OutputRecord>) -> StoreResult<usize>;

    /// All records of the collection, in insertion order.
    fn fetch_all(&self, collection: &str) -> StoreResult<Vec<OutputRecord>>;

    /// First record whose `cityCode` equals `city_code`, if any.
    fn find_by_city_code(
        &self,
        collection: &str,
        city_code: &str,
    ) -> StoreResult<Option<OutputRecord>>;

    /// Replace the collection contents: delete everything, then bulk-insert.
    ///
    /// Not transactional: an insert failure after the delete leaves the
    /// collection empty. Callers are told so through the store error text.
    fn replace_all(&self, collection: &str, records: Vec<OutputRecord>) -> StoreResult<usize> {
        self.delete_all(collection)?;
        self.insert_many(collection, records)
    }
}

/// Serialize records to the flat document mappings the store and the API
/// expose: exactly the eight output columns, with `ownerships` kept as a
/// structured sub-document.
pub fn records_to_documents(records: &[OutputRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|record| serde_json::to_value(record).unwrap_or(Value::Null))
        .collect()
}

/// In-memory store, for tests, the CLI one-shot mode, and development runs.
pub struct InMemoryStore {
    collections: Mutex<HashMap<String, Vec<OutputRecord>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self { collections: Mutex::new(HashMap::new()) }
    }
}

impl RecordStore for InMemoryStore {
    fn delete_all(&self, collection: &str) -> StoreResult<usize> {
        let mut collections = self.collections.lock().unwrap();
        Ok(collections.remove(collection).map(|records| records.len()).unwrap_or(0))
    }

    fn insert_many(&self, collection: &str, records: Vec<OutputRecord>) -> StoreResult<usize> {
        let mut collections = self.collections.lock().unwrap();
        let slot = collections.entry(collection.to_string()).or_default();
        let inserted = records.len();
        slot.extend(records);
        Ok(inserted)
    }

    fn fetch_all(&self, collection: &str) -> StoreResult<Vec<OutputRecord>> {
        let collections = self.collections.lock().unwrap();
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    fn find_by_city_code(
        &self,
        collection: &str,
        city_code: &str,
    ) -> StoreResult<Option<OutputRecord>> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| r.city_code == city_code))
            .cloned())
    }
}
