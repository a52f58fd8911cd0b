//! In-process real-time store.
//!
//! A [`RealtimeStore`] that keeps every collection in memory. It behaves like
//! a hosted document store with live queries: appends get a store-assigned
//! identity, documents are held as encoded CBOR, and every subscriber receives
//! the full collection, newest first, right after subscribing and after each
//! change.
//!
//! Callbacks run on the appending thread, outside the store lock, so a
//! callback may call back into the store.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod memory;

pub use memory::MemoryStore;
pub use upside_core::store::RealtimeStore;
