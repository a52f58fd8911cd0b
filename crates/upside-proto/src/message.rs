//! Broadcast messages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{mode::Mode, record::RawRecord};

/// Store-assigned record identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an identity string handed out by a store.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transmitted message.
///
/// Immutable once created; the mode is fixed at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    sender_id: String,
    content: String,
    mode: Mode,
    timestamp: i64,
}

impl Message {
    /// Create a message.
    pub fn new(
        sender_id: impl Into<String>,
        content: impl Into<String>,
        mode: Mode,
        timestamp: i64,
    ) -> Self {
        Self { sender_id: sender_id.into(), content: content.into(), mode, timestamp }
    }

    /// Build from a raw store record, defaulting every missing field.
    ///
    /// `from` and `content` default to empty, `mode` to MORSE (also for
    /// unknown names), `timestamp` to 0.
    pub fn from_record(record: &RawRecord) -> Self {
        Self {
            sender_id: record.from.clone().unwrap_or_default(),
            content: record.content.clone().unwrap_or_default(),
            mode: Mode::from_wire(record.mode.as_deref()),
            timestamp: record.timestamp.unwrap_or(0),
        }
    }

    /// Raw record with every field present.
    pub fn to_record(&self) -> RawRecord {
        RawRecord {
            from: Some(self.sender_id.clone()),
            content: Some(self.content.clone()),
            mode: Some(self.mode.as_str().to_string()),
            timestamp: Some(self.timestamp),
        }
    }

    /// Sender id.
    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    /// Plaintext content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Mode fixed at send time.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Send time in Unix milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
