//! Reference models.
//!
//! Deliberately naive restatements of the session, feed, and playback rules.
//! Property tests run the same operations against a model and the real state
//! machine and compare observable state after every step.

use std::time::Duration;

use upside_core::{
    playback::PlaybackConfig,
    session::{RECOVERY_SEQUENCE, RecoveryToken},
    store::StoredRecord,
};
use upside_proto::{Message, RecordId, Symbol};

/// Operation applied to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOp {
    /// One decay period elapses
    Decay,
    /// A recovery token is entered
    Input(RecoveryToken),
}

/// Reference session with the default configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSession {
    /// Current sanity
    pub sanity: u8,
    /// Whether the session is possessed
    pub possessed: bool,
    /// Recent tokens, oldest first
    pub window: Vec<RecoveryToken>,
}

impl Default for ModelSession {
    fn default() -> Self {
        Self { sanity: 100, possessed: false, window: Vec::new() }
    }
}

impl ModelSession {
    /// Apply one operation.
    pub fn apply(&mut self, op: SessionOp) {
        match op {
            SessionOp::Decay if !self.possessed => {
                self.sanity = self.sanity.saturating_sub(1);
                if self.sanity == 0 {
                    self.possessed = true;
                    self.window.clear();
                }
            },
            SessionOp::Decay => {},
            SessionOp::Input(token) if self.possessed => {
                self.window.push(token);
                if self.window.len() > RECOVERY_SEQUENCE.len() {
                    self.window.remove(0);
                }
                if self.window == RECOVERY_SEQUENCE {
                    self.possessed = false;
                    self.sanity = 100;
                    self.window.clear();
                }
            },
            SessionOp::Input(_) => {},
        }
    }
}

/// Reference feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelFeed {
    /// Entries, newest first
    pub entries: Vec<(RecordId, Message)>,
}

impl ModelFeed {
    /// Replace the entries from a successful delivery.
    pub fn apply(&mut self, records: &[StoredRecord]) {
        let mut unique: Vec<(RecordId, Message)> = Vec::new();
        for stored in records {
            if !unique.iter().any(|(id, _)| *id == stored.id) {
                unique.push((stored.id.clone(), Message::from_record(&stored.record)));
            }
        }

        let mut timestamps: Vec<i64> = unique.iter().map(|(_, m)| m.timestamp()).collect();
        timestamps.sort_unstable();
        timestamps.dedup();

        self.entries = timestamps
            .into_iter()
            .rev()
            .flat_map(|ts| unique.iter().filter(move |(_, m)| m.timestamp() == ts).cloned())
            .collect();
    }
}

/// What a renderer sees at one point of a transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A bit lights up; `true` for '1'
    On(bool),
    /// The bit goes dark
    Off,
    /// The transmission is over
    Finished,
}

/// Expected cues for `symbols` with offsets from the start of playback.
pub fn playback_timeline(symbols: &[Symbol], config: &PlaybackConfig) -> Vec<(Duration, Cue)> {
    let mut timeline = Vec::new();
    let mut at = Duration::ZERO;

    for symbol in symbols {
        for index in 0..Symbol::BITS {
            let one = symbol.value() & (0x80 >> index) != 0;
            timeline.push((at, Cue::On(one)));
            at += if one { config.one_hold } else { config.zero_hold };
            timeline.push((at, Cue::Off));
            at += config.off_hold;
        }
        at += config.symbol_gap;
    }

    timeline.push((at, Cue::Finished));
    timeline
}
