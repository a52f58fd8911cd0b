//! Real-time store abstraction.
//!
//! Models a hosted document collection with live queries: records are
//! appended, the store assigns their identity, and every subscriber receives
//! the full, current result set each time it changes.
//!
//! Callbacks arrive on the store's own schedule, possibly from another
//! thread. Implementations of the callback are expected to hand the update to
//! the session timeline (a channel, typically) rather than touching feed state
//! directly.

use async_trait::async_trait;
use upside_proto::{RawRecord, RecordId};

use crate::error::StoreError;

/// A record together with the identity the store gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    /// Store-assigned identity
    pub id: RecordId,
    /// Field values as stored
    pub record: RawRecord,
}

/// One subscription delivery: the whole collection, or an error.
pub type FeedUpdate = Result<Vec<StoredRecord>, StoreError>;

/// Receives subscription deliveries.
pub type SubscriptionCallback = Box<dyn Fn(FeedUpdate) + Send + Sync + 'static>;

/// Live subscription handle. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    /// Handle that runs `cancel` when dropped.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// Handle with nothing to release.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Stop receiving deliveries.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.cancel.is_some()).finish()
    }
}

/// Abstract real-time document store.
#[async_trait]
pub trait RealtimeStore: Send + Sync + 'static {
    /// Append `record` to `collection` and return its new identity.
    ///
    /// The record becomes visible to readers only through subscription
    /// deliveries.
    async fn append(&self, collection: &str, record: RawRecord) -> Result<RecordId, StoreError>;

    /// Watch `collection`. The callback receives the current contents once
    /// immediately and again after every change.
    fn subscribe(&self, collection: &str, callback: SubscriptionCallback) -> Subscription;
}
