//! Text to signal transform.
//!
//! Each input character becomes one [`Symbol`]:
//!
//! 1. uppercase
//! 2. ROT13 on `A..=Z`, everything else passes through
//! 3. code point XOR 23, formatted as 8 zero-padded bits
//!
//! The transform is total and length preserving. It is not a cipher and no
//! decode path is exposed.

use upside_proto::Symbol;

/// Caesar shift applied to `A..=Z`.
pub const ROTATION: u8 = 13;

/// Mask applied to every code point after rotation.
pub const XOR_MASK: u32 = 23;

/// Encode `text` into one symbol per character.
pub fn encode(text: &str) -> Vec<Symbol> {
    text.chars().map(encode_char).collect()
}

/// Encode a single character.
///
/// Code points above `0xFF` keep their low 8 bits after the XOR so the
/// result is always a valid symbol.
pub fn encode_char(c: char) -> Symbol {
    let rotated = rotate(uppercase(c));
    Symbol::new((u32::from(rotated) ^ XOR_MASK) as u8)
}

// Characters whose uppercase form is more than one char stay as they are,
// otherwise the output would stop lining up with the input.
fn uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn rotate(c: char) -> char {
    if c.is_ascii_uppercase() {
        let offset = (c as u8 - b'A' + ROTATION) % 26;
        char::from(b'A' + offset)
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn render(symbols: &[Symbol]) -> String {
        symbols.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn empty_input_gives_empty_signal() {
        assert!(encode("").is_empty());
    }

    #[test]
    fn single_letter() {
        // 'A' -> 'N' (78), 78 ^ 23 = 89
        assert_eq!(encode("A"), vec![Symbol::new(89)]);
        assert_eq!(encode("A")[0].to_string(), "01011001");
    }

    #[test]
    fn lowercase_folds_to_uppercase() {
        assert_eq!(encode("hello"), encode("HELLO"));
    }

    #[test]
    fn rotation_wraps_around_the_alphabet() {
        // 'Z' -> 'M' (77), 77 ^ 23 = 90
        assert_eq!(encode("Z"), vec![Symbol::new(90)]);
    }

    #[test]
    fn non_letters_pass_through_rotation() {
        // ' ' (32) ^ 23 = 55, '1' (49) ^ 23 = 38
        assert_eq!(encode(" 1"), vec![Symbol::new(55), Symbol::new(38)]);
    }

    #[test]
    fn hello_signal() {
        insta::assert_snapshot!(
            render(&encode("HELLO")),
            @"01000010 01000101 01001110 01001110 01010101"
        );
    }

    #[test]
    fn wide_characters_keep_one_symbol_each() {
        assert_eq!(encode("ß✓").len(), 2);
    }

    proptest! {
        #[test]
        fn length_matches_char_count(text in "\\PC{0,64}") {
            prop_assert_eq!(encode(&text).len(), text.chars().count());
        }

        #[test]
        fn printable_ascii_symbols_are_eight_binary_digits(text in "[ -~]{0,64}") {
            let symbols = encode(&text);
            prop_assert_eq!(symbols.len(), text.len());
            for symbol in symbols {
                let rendered = symbol.to_string();
                prop_assert_eq!(rendered.len(), 8);
                prop_assert!(rendered.chars().all(|c| c == '0' || c == '1'));
            }
        }

        #[test]
        fn encoding_is_positionwise(a in "[ -~]{0,16}", b in "[ -~]{0,16}") {
            let mut joined = encode(&a);
            joined.extend(encode(&b));
            prop_assert_eq!(encode(&format!("{a}{b}")), joined);
        }
    }
}
