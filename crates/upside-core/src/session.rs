//! Sanity state machine.
//!
//! # State Machine
//!
//! ```text
//!            sanity hits 0 on a decay tick
//! ┌────────┐ ─────────────────────────────> ┌───────────┐
//! │ Normal │                                │ Possessed │
//! └────────┘ <───────────────────────────── └───────────┘
//!             recovery window matches
//!             (sanity = 100, window cleared)
//! ```
//!
//! There is no terminal state; a session cycles for as long as it lives.
//!
//! # Decay
//!
//! In `Normal`, every `decay_period` takes one point of sanity. The decay
//! deadline disappears on possession and is re-armed from the moment of
//! recovery, so a possessed session never decays.
//!
//! # Recovery
//!
//! In `Possessed`, each token is pushed onto a sliding window holding the last
//! `recovery_sequence.len()` inputs. The session recovers only when the whole
//! window equals the sequence. Wrong tokens are not reset early; they simply
//! slide out of the window.

use std::{
    collections::VecDeque,
    fmt,
    str::FromStr,
    time::{Duration, Instant},
};

use thiserror::Error;
use tracing::{debug, info};

/// Input accepted while possessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryToken {
    /// Up
    Up,
    /// Down
    Down,
    /// Left
    Left,
    /// Right
    Right,
    /// A button
    A,
    /// B button
    B,
}

impl RecoveryToken {
    /// Every token, in pad order.
    pub const ALL: [Self; 6] = [Self::Up, Self::Down, Self::Left, Self::Right, Self::A, Self::B];

    /// Display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for RecoveryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input outside the recovery vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a recovery token: {input:?}")]
pub struct ParseTokenError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for RecoveryToken {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|token| token.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseTokenError { input: s.to_string() })
    }
}

/// The fixed recovery sequence.
pub const RECOVERY_SEQUENCE: [RecoveryToken; 10] = [
    RecoveryToken::Up,
    RecoveryToken::Up,
    RecoveryToken::Down,
    RecoveryToken::Down,
    RecoveryToken::Left,
    RecoveryToken::Right,
    RecoveryToken::Left,
    RecoveryToken::Right,
    RecoveryToken::B,
    RecoveryToken::A,
];

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sanity at session start and after recovery
    pub initial_sanity: u8,
    /// Time between decay ticks
    pub decay_period: Duration,
    /// Sequence that ends possession; its length is the window capacity
    pub recovery_sequence: Vec<RecoveryToken>,
    /// Sanity below this is critical
    pub critical_threshold: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_sanity: 100,
            decay_period: Duration::from_secs(2),
            recovery_sequence: RECOVERY_SEQUENCE.to_vec(),
            critical_threshold: 30,
        }
    }
}

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Sanity is decaying
    Normal,
    /// Sanity hit zero; waiting for the recovery sequence
    Possessed,
}

/// Transitions reported by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Sanity dropped by one
    SanityChanged {
        /// New value
        sanity: u8,
    },
    /// Entered `Possessed`
    Possessed,
    /// Left `Possessed`; sanity is back to its initial value
    Recovered,
}

/// Sanity state machine.
///
/// Pure state machine: time is passed to methods that need it.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    sanity: u8,
    window: VecDeque<RecoveryToken>,
    next_decay: Option<Instant>,
}

impl Session {
    /// Create a session in `Normal` with full sanity; the first decay is due
    /// one period after `now`.
    pub fn new(config: SessionConfig, now: Instant) -> Self {
        let capacity = config.recovery_sequence.len();
        Self {
            sanity: config.initial_sanity,
            next_decay: Some(now + config.decay_period),
            window: VecDeque::with_capacity(capacity + 1),
            state: SessionState::Normal,
            config,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current sanity.
    pub fn sanity(&self) -> u8 {
        self.sanity
    }

    /// True while possessed.
    pub fn is_possessed(&self) -> bool {
        self.state == SessionState::Possessed
    }

    /// True when sanity is below the critical threshold.
    pub fn is_critical(&self) -> bool {
        self.sanity < self.config.critical_threshold
    }

    /// Recovery window contents, oldest first.
    pub fn recovery_window(&self) -> impl Iterator<Item = RecoveryToken> + '_ {
        self.window.iter().copied()
    }

    /// Next decay deadline; `None` while possessed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_decay
    }

    /// Configuration in use.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Apply every decay tick due at or before `now`.
    ///
    /// Stops at possession even if more periods have elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        while let Some(deadline) = self.next_decay {
            if deadline > now {
                break;
            }
            self.next_decay = Some(deadline + self.config.decay_period);
            actions.extend(self.decay());
        }

        actions
    }

    /// Apply a single decay tick, ignoring the clock.
    ///
    /// No effect while possessed.
    pub fn decay(&mut self) -> Vec<SessionAction> {
        if self.state != SessionState::Normal {
            return Vec::new();
        }

        let mut actions = Vec::new();

        if self.sanity > 0 {
            self.sanity -= 1;
            actions.push(SessionAction::SanityChanged { sanity: self.sanity });
        }

        if self.sanity == 0 {
            info!("sanity exhausted, session possessed");
            self.state = SessionState::Possessed;
            self.next_decay = None;
            self.window.clear();
            actions.push(SessionAction::Possessed);
        }

        actions
    }

    /// Feed one recovery token.
    ///
    /// Ignored unless possessed. On a full-window match the session returns to
    /// `Normal` with initial sanity and an empty window, and decay restarts one
    /// period after `now`.
    pub fn input(&mut self, token: RecoveryToken, now: Instant) -> Vec<SessionAction> {
        if self.state != SessionState::Possessed {
            debug!(%token, "recovery token ignored outside possession");
            return Vec::new();
        }

        self.window.push_back(token);
        if self.window.len() > self.config.recovery_sequence.len() {
            self.window.pop_front();
        }

        if !self.window.iter().eq(self.config.recovery_sequence.iter()) {
            return Vec::new();
        }

        info!("recovery sequence matched");
        self.state = SessionState::Normal;
        self.sanity = self.config.initial_sanity;
        self.window.clear();
        self.next_decay = Some(now + self.config.decay_period);

        vec![SessionAction::Recovered]
    }
}
