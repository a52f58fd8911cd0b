//! Error types for the data model.

use thiserror::Error;

/// Result alias for document encoding.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Document encoding and decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// CBOR serialization failed
    #[error("CBOR encode failed: {0}")]
    CborEncode(String),

    /// CBOR deserialization failed
    #[error("CBOR decode failed: {0}")]
    CborDecode(String),

    /// Decoded value was valid CBOR but not a map
    #[error("document root is not a map")]
    NotAMap,
}

/// Input named a mode outside MORSE, COLOR, BEEP, GRID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode: {input:?}")]
pub struct ParseModeError {
    /// The rejected input.
    pub input: String,
}

/// Input was not an 8-character string of '0' and '1'.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid symbol: {input:?}")]
pub struct ParseSymbolError {
    /// The rejected input.
    pub input: String,
}
