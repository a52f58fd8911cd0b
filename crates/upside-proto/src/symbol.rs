//! Fixed-width binary symbols.
//!
//! A [`Symbol`] is one transformed input character. Storing it as a `u8`
//! makes the "exactly 8 bits of '0'/'1'" invariant structural: the textual
//! form is always produced by zero-padded formatting, MSB first.

use std::{fmt, str::FromStr};

use crate::errors::ParseSymbolError;

/// A single bit of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bit {
    /// '0'
    Zero,
    /// '1'
    One,
}

impl Bit {
    /// True for '1'.
    pub const fn is_one(self) -> bool {
        matches!(self, Self::One)
    }

    /// Character form.
    pub const fn as_char(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
        }
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value { Self::One } else { Self::Zero }
    }
}

/// One 8-bit symbol, rendered MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u8);

impl Symbol {
    /// Width of every symbol in bits.
    pub const BITS: usize = 8;

    /// Wrap a raw byte.
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Raw byte value.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Bit at `index`, counting from the most significant bit.
    pub fn bit(self, index: usize) -> Option<Bit> {
        (index < Self::BITS).then(|| Bit::from(self.0 & (0x80 >> index) != 0))
    }

    /// All eight bits, MSB first.
    pub fn bits(self) -> impl Iterator<Item = Bit> {
        (0..Self::BITS).map(move |i| Bit::from(self.0 & (0x80 >> i) != 0))
    }

    /// Number of '1' bits.
    pub const fn ones(self) -> u32 {
        self.0.count_ones()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08b}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = ParseSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSymbolError { input: s.to_string() };

        if s.len() != Self::BITS || !s.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(invalid());
        }

        u8::from_str_radix(s, 2).map(Self).map_err(|_| invalid())
    }
}
