//! Rendering modes.
//!
//! The mode is fixed when a message is sent. It never changes playback timing;
//! it only tells the renderer how to interpret each event.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::ParseModeError;

/// How a signal is presented during playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Pulsing dot, long for '1' and short for '0'
    #[default]
    Morse,
    /// Full-screen color wash per bit
    Color,
    /// Text flash per bit
    Beep,
    /// Symbol grid; needs the whole 8-bit symbol, not just the current bit
    Grid,
}

impl Mode {
    /// Every mode, in selection order.
    pub const ALL: [Self; 4] = [Self::Morse, Self::Color, Self::Beep, Self::Grid];

    /// Wire name stored in records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morse => "MORSE",
            Self::Color => "COLOR",
            Self::Beep => "BEEP",
            Self::Grid => "GRID",
        }
    }

    /// Lenient decode for values read back from the store.
    ///
    /// Missing or unrecognized names fall back to [`Mode::Morse`].
    pub fn from_wire(value: Option<&str>) -> Self {
        value.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    /// Strict, case-insensitive parse used at input boundaries.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseModeError { input: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("grid".parse::<Mode>(), Ok(Mode::Grid));
        assert_eq!(" Beep ".parse::<Mode>(), Ok(Mode::Beep));
        assert_eq!("COLOR".parse::<Mode>(), Ok(Mode::Color));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!("SMOKE".parse::<Mode>(), Err(ParseModeError { input: "SMOKE".into() }));
    }

    #[test]
    fn wire_decode_defaults_to_morse() {
        assert_eq!(Mode::from_wire(None), Mode::Morse);
        assert_eq!(Mode::from_wire(Some("")), Mode::Morse);
        assert_eq!(Mode::from_wire(Some("SMOKE")), Mode::Morse);
        assert_eq!(Mode::from_wire(Some("GRID")), Mode::Grid);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>(), Ok(mode));
        }
    }
}
