//! Data model for the Upside signal feed.
//!
//! Everything that crosses a component boundary lives here: the rendering
//! [`Mode`] a message was sent with, the 8-bit [`Symbol`] the codec produces,
//! the immutable [`Message`], and the schemaless [`Document`] form a record
//! takes inside the real-time store.
//!
//! Documents are CBOR maps. Stores are free to hand back documents with
//! missing or mistyped fields, so [`RawRecord`] reads each field on its own and
//! treats anything unexpected as absent. Defaults are applied one layer up when
//! a raw record becomes a [`Message`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod message;
pub mod mode;
pub mod record;
pub mod symbol;

pub use errors::{ParseModeError, ParseSymbolError, ProtocolError, Result};
pub use message::{Message, RecordId};
pub use mode::Mode;
pub use record::{Document, RawRecord};
pub use symbol::{Bit, Symbol};
