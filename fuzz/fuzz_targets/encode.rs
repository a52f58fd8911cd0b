//! Fuzz target: signal encoding.
//!
//! Every input char yields exactly one 8-bit symbol, and encoding is
//! case-insensitive.

#![no_main]

use libfuzzer_sys::fuzz_target;
use upside_core::codec;

fuzz_target!(|text: &str| {
    let symbols = codec::encode(text);
    assert_eq!(symbols.len(), text.chars().count());

    for symbol in &symbols {
        assert_eq!(symbol.to_string().len(), 8);
    }

    if text.is_ascii() {
        assert_eq!(codec::encode(&text.to_ascii_uppercase()), symbols);
    }
});
