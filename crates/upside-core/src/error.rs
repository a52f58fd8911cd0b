//! Store error types.

use thiserror::Error;
use upside_proto::ProtocolError;

/// Failures reported by a real-time store.
///
/// None of these are fatal: [`crate::feed::BroadcastSync`] keeps its previous
/// snapshot and appends are fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend cannot be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Caller may not read or write the collection
    #[error("permission denied on collection {collection}")]
    PermissionDenied {
        /// Collection that was refused
        collection: String,
    },

    /// Record could not be encoded as a document
    #[error("document encoding failed: {0}")]
    Encoding(#[from] ProtocolError),
}
