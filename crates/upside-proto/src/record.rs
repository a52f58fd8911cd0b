//! Store documents and raw records.
//!
//! The real-time store is schemaless. A [`Document`] is a CBOR map keyed by
//! field name; a [`RawRecord`] is the typed view of the four fields a
//! broadcast uses, with every field optional.
//!
//! # Field lookup
//!
//! Lookups are per field and never fail as a whole: a field that is missing,
//! or present with the wrong CBOR type, reads as `None`. This mirrors how a
//! document store hands back partially written or foreign documents.

use bytes::Bytes;
use ciborium::Value;
use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, Result};

/// Field holding the sender id.
pub const FIELD_FROM: &str = "from";
/// Field holding the plaintext content.
pub const FIELD_CONTENT: &str = "content";
/// Field holding the mode wire name.
pub const FIELD_MODE: &str = "mode";
/// Field holding the send time in Unix milliseconds.
pub const FIELD_TIMESTAMP: &str = "timestamp";

/// A schemaless store document (CBOR map).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    entries: Vec<(Value, Value)>,
}

impl Document {
    /// Empty document.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Wrap an arbitrary CBOR value.
    ///
    /// # Errors
    ///
    /// `NotAMap` if the value is not a CBOR map.
    pub fn from_value(value: Value) -> Result<Self> {
        value.into_map().map(|entries| Self { entries }).map_err(|_| ProtocolError::NotAMap)
    }

    /// Unwrap into a CBOR map value.
    pub fn into_value(self) -> Value {
        Value::Map(self.entries)
    }

    /// Set `key`, replacing any existing entry.
    pub fn insert(&mut self, key: &str, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k.as_text() == Some(key)) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((Value::Text(key.to_string()), value)),
        }
    }

    /// Raw value at `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k.as_text() == Some(key)).map(|(_, v)| v)
    }

    /// Text value at `key`, `None` if missing or not text.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    /// Integer value at `key`, `None` if missing, not an integer, or out of
    /// `i64` range.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_integer).and_then(|i| i64::try_from(i).ok())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to CBOR bytes.
    pub fn to_cbor(&self) -> Result<Bytes> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(&Value::Map(self.entries.clone()), &mut buf)
            .map_err(|e| ProtocolError::CborEncode(e.to_string()))?;
        Ok(Bytes::from(buf))
    }

    /// Deserialize from CBOR bytes.
    ///
    /// # Errors
    ///
    /// - `CborDecode` if the bytes are not valid CBOR
    /// - `NotAMap` if the root value is not a map
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let value: Value = ciborium::de::from_reader(bytes)
            .map_err(|e| ProtocolError::CborDecode(e.to_string()))?;
        Self::from_value(value)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed view of a broadcast record with every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Sender id
    pub from: Option<String>,
    /// Plaintext content
    pub content: Option<String>,
    /// Mode wire name; unknown names are kept verbatim
    pub mode: Option<String>,
    /// Unix milliseconds
    pub timestamp: Option<i64>,
}

impl RawRecord {
    /// Read the broadcast fields out of a document.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            from: doc.get_str(FIELD_FROM).map(str::to_string),
            content: doc.get_str(FIELD_CONTENT).map(str::to_string),
            mode: doc.get_str(FIELD_MODE).map(str::to_string),
            timestamp: doc.get_i64(FIELD_TIMESTAMP),
        }
    }

    /// Build a document holding the present fields.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        if let Some(from) = &self.from {
            doc.insert(FIELD_FROM, Value::Text(from.clone()));
        }
        if let Some(content) = &self.content {
            doc.insert(FIELD_CONTENT, Value::Text(content.clone()));
        }
        if let Some(mode) = &self.mode {
            doc.insert(FIELD_MODE, Value::Text(mode.clone()));
        }
        if let Some(timestamp) = self.timestamp {
            doc.insert(FIELD_TIMESTAMP, Value::Integer(timestamp.into()));
        }
        doc
    }
}
