//! Broadcast feed sync.
//!
//! Holds the locally observed copy of the shared broadcast collection. Each
//! subscription delivery either replaces the whole snapshot or, on error,
//! leaves it exactly as it was. There is no merge step and no optimistic
//! insert: a message this session sends shows up only when the store delivers
//! it back.
//!
//! # Atomic replacement
//!
//! The snapshot is an immutable [`FeedSnapshot`] behind an `Arc`. Applying an
//! update builds a new snapshot and swaps the pointer, so a reader holding the
//! old `Arc` keeps a complete old view and never sees a mix of old and new
//! entries.

use std::{collections::HashSet, sync::Arc};

use tracing::{debug, warn};
use upside_proto::{Message, Mode, RawRecord, RecordId};

use crate::{
    error::StoreError,
    store::{FeedUpdate, StoredRecord},
};

/// Collection the feed watches unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "broadcast";

/// Feed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Store collection key
    pub collection: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { collection: DEFAULT_COLLECTION.to_string() }
    }
}

/// A feed message and its store identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Store-assigned identity
    pub id: RecordId,
    /// Message with defaults applied
    pub message: Message,
}

/// Immutable view of the feed at one point in time.
///
/// Entries are ordered newest first and unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    version: u64,
    entries: Vec<FeedEntry>,
}

impl FeedSnapshot {
    /// Number of successful updates applied before this snapshot existed.
    /// The initial empty snapshot is version 0.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&FeedEntry> {
        self.entries.get(index)
    }

    /// Entry with identity `id`.
    pub fn find(&self, id: &RecordId) -> Option<&FeedEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of applying one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The snapshot was replaced
    Replaced {
        /// New snapshot version
        version: u64,
        /// Entries in the new snapshot
        len: usize,
    },
    /// The delivery was an error; the previous snapshot is kept
    Retained {
        /// The error the store reported
        error: StoreError,
    },
}

/// Feed snapshot owner.
#[derive(Debug, Clone)]
pub struct BroadcastSync {
    config: FeedConfig,
    snapshot: Arc<FeedSnapshot>,
}

impl BroadcastSync {
    /// Create with an empty snapshot.
    pub fn new(config: FeedConfig) -> Self {
        Self { config, snapshot: Arc::new(FeedSnapshot::default()) }
    }

    /// Watched collection key.
    pub fn collection(&self) -> &str {
        &self.config.collection
    }

    /// Current snapshot. Cheap; holds the view even across later updates.
    pub fn snapshot(&self) -> Arc<FeedSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Apply one subscription delivery.
    ///
    /// Errors are absorbed. Successful deliveries are mapped to messages with
    /// defaults, deduplicated by id (first occurrence wins), stably sorted
    /// newest first, and swapped in as a new snapshot.
    pub fn apply(&mut self, update: FeedUpdate) -> FeedOutcome {
        let records = match update {
            Ok(records) => records,
            Err(error) => {
                warn!(collection = %self.config.collection, %error, "feed update failed, keeping snapshot");
                return FeedOutcome::Retained { error };
            },
        };

        let entries = build_entries(records);
        let version = self.snapshot.version + 1;
        let len = entries.len();

        self.snapshot = Arc::new(FeedSnapshot { version, entries });
        debug!(collection = %self.config.collection, version, len, "feed snapshot replaced");

        FeedOutcome::Replaced { version, len }
    }

    /// Record for a new outgoing message.
    ///
    /// Appending it is the caller's job; the feed itself is not touched.
    pub fn compose(sender_id: &str, content: &str, mode: Mode, timestamp: i64) -> RawRecord {
        Message::new(sender_id, content, mode, timestamp).to_record()
    }
}

impl Default for BroadcastSync {
    fn default() -> Self {
        Self::new(FeedConfig::default())
    }
}

fn build_entries(records: Vec<StoredRecord>) -> Vec<FeedEntry> {
    let mut seen = HashSet::with_capacity(records.len());

    let mut entries: Vec<FeedEntry> = records
        .into_iter()
        .filter(|stored| seen.insert(stored.id.clone()))
        .map(|stored| FeedEntry { message: Message::from_record(&stored.record), id: stored.id })
        .collect();

    entries.sort_by(|a, b| b.message.timestamp().cmp(&a.message.timestamp()));
    entries
}
