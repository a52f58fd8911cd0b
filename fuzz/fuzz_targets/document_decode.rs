//! Fuzz target: store document decoding.
//!
//! Arbitrary bytes must decode to a document or an error, never panic. Any
//! document that decodes must yield a message with defaults applied and
//! survive a re-encode.

#![no_main]

use libfuzzer_sys::fuzz_target;
use upside_proto::{Document, Message, RawRecord};

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = Document::from_cbor(data) else {
        return;
    };

    let record = RawRecord::from_document(&doc);
    let message = Message::from_record(&record);

    let stored = message.to_record().to_document();
    let bytes = stored.to_cbor().expect("re-encode decoded document");
    let again = Document::from_cbor(&bytes).expect("decode re-encoded document");
    assert_eq!(Message::from_record(&RawRecord::from_document(&again)), message);
});
