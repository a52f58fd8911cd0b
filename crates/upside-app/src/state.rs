//! View state
//!
//! What the renderer needs to draw the current screen.

use upside_core::{
    noise::GridPattern,
    playback::{PlaybackEvent, RunId},
};
use upside_proto::{Bit, Mode, Symbol};

/// Screen the app is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    /// Waiting for a user id
    #[default]
    Login,
    /// Writing a message
    Compose,
    /// Browsing the broadcast feed
    Feed,
    /// Showing a transmission
    Playback,
}

/// The bit currently lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LitBit {
    /// Bit value
    pub bit: Bit,
    /// Position of the symbol in the transmission
    pub symbol_index: usize,
    /// Position of the bit within its symbol, MSB = 0
    pub bit_index: usize,
    /// The whole symbol
    pub symbol: Symbol,
}

/// Progress of the transmission on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackView {
    /// Scheduler run being shown
    pub run: RunId,
    /// Rendering mode
    pub mode: Mode,
    /// Text being transmitted
    pub content: String,
    /// Encoded form of `content`
    pub symbols: Vec<Symbol>,
    /// Lit bit, `None` between bits
    pub lit: Option<LitBit>,
    /// Symbol the last event referred to
    pub symbol_index: usize,
    /// Noise bands drawn above and below the grid; GRID mode only
    pub noise: Option<[GridPattern; 2]>,
}

impl PlaybackView {
    /// Fold one event into the view. Events from other runs are ignored.
    pub fn apply(&mut self, event: &PlaybackEvent) {
        if event.run() != self.run {
            return;
        }

        match *event {
            PlaybackEvent::Active { bit, symbol_index, bit_index, symbol, .. } => {
                self.symbol_index = symbol_index;
                self.lit = Some(LitBit { bit, symbol_index, bit_index, symbol });
            },
            PlaybackEvent::Inactive { symbol_index, .. } => {
                self.symbol_index = symbol_index;
                self.lit = None;
            },
            PlaybackEvent::Finished { .. } => self.lit = None,
        }
    }

    /// True while a bit is lit.
    pub fn is_active(&self) -> bool {
        self.lit.is_some()
    }
}
