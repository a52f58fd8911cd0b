//! Memory-backed store.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, trace, warn};
use upside_core::{
    error::StoreError,
    store::{FeedUpdate, RealtimeStore, StoredRecord, Subscription, SubscriptionCallback},
};
use upside_proto::{Document, RawRecord, RecordId};

type SharedCallback = Arc<dyn Fn(FeedUpdate) + Send + Sync + 'static>;

struct Subscriber {
    collection: String,
    callback: SharedCallback,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<(RecordId, Bytes)>>,
    subscribers: HashMap<u64, Subscriber>,
    next_record: u64,
    next_subscriber: u64,
}

impl Inner {
    fn insert(&mut self, collection: &str, bytes: Bytes) -> RecordId {
        let id = RecordId::new(format!("rec-{:08}", self.next_record));
        self.next_record += 1;
        self.collections.entry(collection.to_string()).or_default().push((id.clone(), bytes));
        id
    }

    /// Decoded collection, newest first; ties keep insertion order.
    fn query(&self, collection: &str) -> Vec<StoredRecord> {
        let mut records: Vec<StoredRecord> = self
            .collections
            .get(collection)
            .map(|docs| docs.iter().map(|(id, bytes)| decode(id, bytes)).collect())
            .unwrap_or_default();

        records.sort_by(|a, b| b.record.timestamp.unwrap_or(0).cmp(&a.record.timestamp.unwrap_or(0)));
        records
    }

    fn watchers(&self, collection: &str) -> Vec<SharedCallback> {
        self.subscribers
            .values()
            .filter(|s| s.collection == collection)
            .map(|s| Arc::clone(&s.callback))
            .collect()
    }
}

fn decode(id: &RecordId, bytes: &[u8]) -> StoredRecord {
    let record = match Document::from_cbor(bytes) {
        Ok(doc) => RawRecord::from_document(&doc),
        Err(error) => {
            warn!(%id, %error, "undecodable document, delivering empty record");
            RawRecord::default()
        },
    };
    StoredRecord { id: id.clone(), record }
}

/// In-memory real-time store.
///
/// Cloning shares the same underlying collections.
///
/// Deliveries are serialized: each one queries the collection and runs every
/// callback while holding the delivery lock, so subscribers see snapshots in
/// the order they were taken and the last delivery is always the newest.
/// Callbacks may read the store but must not write to it.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    delivery: Arc<Mutex<()>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn delivering(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an arbitrary document, as another client might.
    ///
    /// Useful for partially written documents; missing fields surface as
    /// defaults in the feed.
    pub fn insert_document(&self, collection: &str, doc: &Document) -> Result<RecordId, StoreError> {
        let bytes = doc.to_cbor()?;
        Ok(self.insert_bytes(collection, bytes))
    }

    /// Store raw bytes as a document without validating them.
    pub fn insert_bytes(&self, collection: &str, bytes: Bytes) -> RecordId {
        let id = self.lock().insert(collection, bytes);
        self.notify(collection);
        id
    }

    /// Current contents of `collection`, newest first.
    pub fn query(&self, collection: &str) -> Vec<StoredRecord> {
        self.lock().query(collection)
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.lock().collections.get(collection).map_or(0, Vec::len)
    }

    /// True if `collection` holds no documents.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Number of live subscriptions across all collections.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn notify(&self, collection: &str) {
        let _delivering = self.delivering();
        let (records, watchers) = {
            let inner = self.lock();
            (inner.query(collection), inner.watchers(collection))
        };

        trace!(collection, watchers = watchers.len(), records = records.len(), "delivering snapshot");
        for callback in watchers {
            callback(Ok(records.clone()));
        }
    }
}

#[async_trait]
impl RealtimeStore for MemoryStore {
    async fn append(&self, collection: &str, record: RawRecord) -> Result<RecordId, StoreError> {
        let id = self.insert_document(collection, &record.to_document())?;
        debug!(collection, %id, "record appended");
        Ok(id)
    }

    fn subscribe(&self, collection: &str, callback: SubscriptionCallback) -> Subscription {
        let callback: SharedCallback = Arc::from(callback);

        let delivering = self.delivering();
        let (key, records) = {
            let mut inner = self.lock();
            let key = inner.next_subscriber;
            inner.next_subscriber += 1;
            inner.subscribers.insert(
                key,
                Subscriber { collection: collection.to_string(), callback: Arc::clone(&callback) },
            );
            (key, inner.query(collection))
        };

        debug!(collection, subscriber = key, "subscribed");
        callback(Ok(records));
        drop(delivering);

        let inner = Arc::clone(&self.inner);
        Subscription::new(move || {
            inner.lock().unwrap_or_else(PoisonError::into_inner).subscribers.remove(&key);
        })
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryStore")
            .field("collections", &inner.collections.len())
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}
