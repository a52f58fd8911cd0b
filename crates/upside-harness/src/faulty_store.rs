//! Fault-injecting store wrapper.
//!
//! Passes everything through to an inner [`RealtimeStore`] and, on demand,
//! fails appends or pushes error deliveries to subscribers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use tracing::debug;
use upside_core::{
    error::StoreError,
    store::{FeedUpdate, RealtimeStore, Subscription, SubscriptionCallback},
};
use upside_proto::{RawRecord, RecordId};

type SharedCallback = Arc<dyn Fn(FeedUpdate) + Send + Sync + 'static>;

#[derive(Default)]
struct Faults {
    failing_appends: Option<StoreError>,
    watchers: Vec<(String, Weak<dyn Fn(FeedUpdate) + Send + Sync + 'static>)>,
    rejected_appends: usize,
}

/// Store wrapper with injectable failures. Clones share the same faults.
pub struct FaultyStore<S> {
    inner: Arc<S>,
    faults: Arc<Mutex<Faults>>,
}

impl<S> Clone for FaultyStore<S> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner), faults: Arc::clone(&self.faults) }
    }
}

impl<S: RealtimeStore> FaultyStore<S> {
    /// Wrap `inner` with no faults active.
    pub fn new(inner: Arc<S>) -> Self {
        Self { inner, faults: Arc::default() }
    }

    /// Wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn lock(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail every append with `error` until cleared with `None`.
    pub fn fail_appends(&self, error: Option<StoreError>) {
        self.lock().failing_appends = error;
    }

    /// Appends refused so far.
    pub fn rejected_appends(&self) -> usize {
        self.lock().rejected_appends
    }

    /// Deliver `error` to every live subscriber of `collection`.
    pub fn inject_error(&self, collection: &str, error: StoreError) {
        let watchers: Vec<SharedCallback> = {
            let mut faults = self.lock();
            faults.watchers.retain(|(_, weak)| weak.strong_count() > 0);
            faults
                .watchers
                .iter()
                .filter(|(c, _)| c == collection)
                .filter_map(|(_, weak)| weak.upgrade())
                .collect()
        };

        debug!(collection, %error, watchers = watchers.len(), "injecting delivery error");
        for callback in watchers {
            callback(Err(error.clone()));
        }
    }
}

#[async_trait]
impl<S: RealtimeStore> RealtimeStore for FaultyStore<S> {
    async fn append(&self, collection: &str, record: RawRecord) -> Result<RecordId, StoreError> {
        let failure = {
            let mut faults = self.lock();
            let failure = faults.failing_appends.clone();
            if failure.is_some() {
                faults.rejected_appends += 1;
            }
            failure
        };

        match failure {
            Some(error) => Err(error),
            None => self.inner.append(collection, record).await,
        }
    }

    fn subscribe(&self, collection: &str, callback: SubscriptionCallback) -> Subscription {
        let callback: SharedCallback = Arc::from(callback);
        self.lock().watchers.push((collection.to_string(), Arc::downgrade(&callback)));
        self.inner.subscribe(collection, Box::new(move |update| callback(update)))
    }
}
