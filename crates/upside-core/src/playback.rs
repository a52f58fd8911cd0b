//! Timed playback scheduler.
//!
//! Turns a symbol sequence into an ordered stream of presentation events. A
//! run is an explicit schedulable task: [`PlaybackScheduler::start`] lays out
//! every event against a monotonic deadline, [`PlaybackScheduler::poll`]
//! releases the ones that are due, and [`PlaybackScheduler::cancel`] drops the
//! rest synchronously.
//!
//! # Timeline
//!
//! ```text
//! for each symbol:
//!   for each bit (MSB first):
//!     Active   hold 600ms ('1') or 250ms ('0')
//!     Inactive hold 150ms
//!   gap 500ms
//! Finished
//! ```
//!
//! The mode never changes timing; it is carried only so the renderer knows how
//! to draw each event.
//!
//! # Supersession
//!
//! At most one run is active. Starting a new run discards the old queue before
//! anything else happens, so no event and no `Finished` from the old run can
//! be observed afterwards.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use tracing::debug;
use upside_proto::{Bit, Mode, Symbol};

/// Playback timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Hold after an active '1'
    pub one_hold: Duration,
    /// Hold after an active '0'
    pub zero_hold: Duration,
    /// Hold after every inactive event
    pub off_hold: Duration,
    /// Extra hold after the eighth bit of each symbol
    pub symbol_gap: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            one_hold: Duration::from_millis(600),
            zero_hold: Duration::from_millis(250),
            off_hold: Duration::from_millis(150),
            symbol_gap: Duration::from_millis(500),
        }
    }
}

impl PlaybackConfig {
    /// Active hold for `bit`.
    pub fn bit_hold(&self, bit: Bit) -> Duration {
        if bit.is_one() { self.one_hold } else { self.zero_hold }
    }

    /// Time from start until `Finished` for `symbols`.
    pub fn total_duration(&self, symbols: &[Symbol]) -> Duration {
        symbols
            .iter()
            .flat_map(|symbol| symbol.bits())
            .map(|bit| self.bit_hold(bit) + self.off_hold)
            .sum::<Duration>()
            + self.symbol_gap * symbols.len() as u32
    }
}

/// Identity of one playback run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl RunId {
    /// Raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Event released by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A bit turns on
    Active {
        /// Run that produced this event
        run: RunId,
        /// The bit being shown
        bit: Bit,
        /// Position of the symbol in the sequence
        symbol_index: usize,
        /// Position of the bit within its symbol, MSB = 0
        bit_index: usize,
        /// Whole symbol, for renderers that draw all eight bits
        symbol: Symbol,
    },
    /// The bit turns off
    Inactive {
        /// Run that produced this event
        run: RunId,
        /// Position of the symbol in the sequence
        symbol_index: usize,
        /// Position of the bit within its symbol
        bit_index: usize,
    },
    /// Every bit has been shown; always the last event of a run
    Finished {
        /// Run that produced this event
        run: RunId,
    },
}

impl PlaybackEvent {
    /// Run that produced this event.
    pub fn run(&self) -> RunId {
        match self {
            Self::Active { run, .. } | Self::Inactive { run, .. } | Self::Finished { run } => *run,
        }
    }

    /// True for [`PlaybackEvent::Finished`].
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

#[derive(Debug, Clone)]
struct Scheduled {
    at: Instant,
    event: PlaybackEvent,
}

#[derive(Debug, Clone)]
struct Run {
    id: RunId,
    mode: Mode,
    queue: VecDeque<Scheduled>,
}

/// Single-run playback scheduler.
///
/// Pure state machine: time is passed to every method that needs it.
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    config: PlaybackConfig,
    run: Option<Run>,
    next_run: u64,
}

impl PlaybackScheduler {
    /// Create an idle scheduler.
    pub fn new(config: PlaybackConfig) -> Self {
        Self { config, run: None, next_run: 0 }
    }

    /// Timing in use.
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Start playing `symbols` at `now`, superseding any active run.
    ///
    /// The first event is due at `now`. An empty sequence schedules only
    /// `Finished`, also at `now`.
    pub fn start(&mut self, symbols: &[Symbol], mode: Mode, now: Instant) -> RunId {
        if let Some(old) = self.run.take() {
            debug!(run = old.id.0, dropped = old.queue.len(), "playback superseded");
        }

        let id = RunId(self.next_run);
        self.next_run += 1;

        let mut queue = VecDeque::with_capacity(symbols.len() * Symbol::BITS * 2 + 1);
        let mut at = now;

        for (symbol_index, &symbol) in symbols.iter().enumerate() {
            for (bit_index, bit) in symbol.bits().enumerate() {
                queue.push_back(Scheduled {
                    at,
                    event: PlaybackEvent::Active { run: id, bit, symbol_index, bit_index, symbol },
                });
                at += self.config.bit_hold(bit);

                queue.push_back(Scheduled {
                    at,
                    event: PlaybackEvent::Inactive { run: id, symbol_index, bit_index },
                });
                at += self.config.off_hold;
            }
            at += self.config.symbol_gap;
        }

        queue.push_back(Scheduled { at, event: PlaybackEvent::Finished { run: id } });

        debug!(run = id.0, symbols = symbols.len(), %mode, "playback started");
        self.run = Some(Run { id, mode, queue });
        id
    }

    /// Cancel the active run, if any.
    ///
    /// Pending events are dropped before this returns; `Finished` is never
    /// released for a cancelled run. Returns the cancelled run.
    pub fn cancel(&mut self) -> Option<RunId> {
        let run = self.run.take()?;
        debug!(run = run.id.0, dropped = run.queue.len(), "playback cancelled");
        Some(run.id)
    }

    /// Release every event due at or before `now`, in schedule order.
    ///
    /// The run ends with its `Finished` event.
    pub fn poll(&mut self, now: Instant) -> Vec<PlaybackEvent> {
        let mut due = Vec::new();

        let Some(run) = self.run.as_mut() else {
            return due;
        };

        while run.queue.front().is_some_and(|next| next.at <= now) {
            if let Some(scheduled) = run.queue.pop_front() {
                due.push(scheduled.event);
            }
        }

        if run.queue.is_empty() {
            debug!(run = run.id.0, "playback finished");
            self.run = None;
        }

        due
    }

    /// Deadline of the next pending event.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.run.as_ref().and_then(|run| run.queue.front()).map(|next| next.at)
    }

    /// Active run, if any.
    pub fn active_run(&self) -> Option<RunId> {
        self.run.as_ref().map(|run| run.id)
    }

    /// Mode of the active run.
    pub fn mode(&self) -> Option<Mode> {
        self.run.as_ref().map(|run| run.mode)
    }

    /// True while a run has events left.
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Drive the scheduler to completion, returning `(offset, event)` pairs.
    fn drain(scheduler: &mut PlaybackScheduler, t0: Instant) -> Vec<(Duration, PlaybackEvent)> {
        let mut out = Vec::new();
        while let Some(deadline) = scheduler.next_deadline() {
            for event in scheduler.poll(deadline) {
                out.push((deadline - t0, event));
            }
        }
        out
    }

    #[test]
    fn empty_sequence_finishes_immediately() {
        let t0 = Instant::now();
        let mut scheduler = PlaybackScheduler::default();
        let run = scheduler.start(&[], Mode::Morse, t0);

        assert_eq!(scheduler.poll(t0), vec![PlaybackEvent::Finished { run }]);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn single_symbol_timeline() {
        let t0 = Instant::now();
        let mut scheduler = PlaybackScheduler::default();
        let symbol = Symbol::new(0b1000_0000);
        let run = scheduler.start(&[symbol], Mode::Grid, t0);

        let events = drain(&mut scheduler, t0);
        assert_eq!(events.len(), 8 * 2 + 1);

        assert_eq!(
            events[0],
            (
                ms(0),
                PlaybackEvent::Active { run, bit: Bit::One, symbol_index: 0, bit_index: 0, symbol }
            )
        );
        assert_eq!(
            events[1],
            (ms(600), PlaybackEvent::Inactive { run, symbol_index: 0, bit_index: 0 })
        );
        assert_eq!(events[2].0, ms(750));
        assert!(matches!(events[2].1, PlaybackEvent::Active { bit: Bit::Zero, bit_index: 1, .. }));
        assert_eq!(events[3].0, ms(1000));

        // 600 + 7 * 250 + 8 * 150 + 500
        assert_eq!(events[16], (ms(4050), PlaybackEvent::Finished { run }));
    }

    #[test]
    fn poll_before_deadline_releases_nothing() {
        let t0 = Instant::now();
        let mut scheduler = PlaybackScheduler::default();
        scheduler.start(&[Symbol::new(0xFF)], Mode::Morse, t0);

        assert_eq!(scheduler.poll(t0).len(), 1);
        assert!(scheduler.poll(t0 + ms(599)).is_empty());
        assert_eq!(scheduler.poll(t0 + ms(600)).len(), 1);
    }

    #[test]
    fn late_poll_releases_everything_in_order() {
        let t0 = Instant::now();
        let mut scheduler = PlaybackScheduler::default();
        let run = scheduler.start(&[Symbol::new(1), Symbol::new(2)], Mode::Color, t0);

        let events = scheduler.poll(t0 + Duration::from_secs(3600));
        assert_eq!(events.len(), 2 * 16 + 1);
        assert_eq!(events.last(), Some(&PlaybackEvent::Finished { run }));
        assert!(!scheduler.is_running());
    }

    #[test]
    fn cancel_drops_pending_events_and_finished() {
        let t0 = Instant::now();
        let mut scheduler = PlaybackScheduler::default();
        let run = scheduler.start(&[Symbol::new(0x41)], Mode::Beep, t0);
        assert_eq!(scheduler.poll(t0).len(), 1);

        assert_eq!(scheduler.cancel(), Some(run));
        assert!(scheduler.poll(t0 + Duration::from_secs(3600)).is_empty());
        assert_eq!(scheduler.cancel(), None);
    }

    #[test]
    fn restart_supersedes_previous_run() {
        let t0 = Instant::now();
        let mut scheduler = PlaybackScheduler::default();
        let first = scheduler.start(&[Symbol::new(0xAA), Symbol::new(0x55)], Mode::Morse, t0);
        scheduler.poll(t0 + ms(700));

        let t1 = t0 + ms(800);
        let second = scheduler.start(&[Symbol::new(0x0F)], Mode::Grid, t1);
        assert_ne!(first, second);
        assert_eq!(scheduler.mode(), Some(Mode::Grid));

        let events = drain(&mut scheduler, t1);
        assert!(events.iter().all(|(_, e)| e.run() == second));
        assert_eq!(events.iter().filter(|(_, e)| e.is_finished()).count(), 1);
    }

    #[test]
    fn run_ids_increase() {
        let t0 = Instant::now();
        let mut scheduler = PlaybackScheduler::default();
        let a = scheduler.start(&[], Mode::Morse, t0);
        let b = scheduler.start(&[], Mode::Morse, t0);
        assert!(b > a);
    }

    proptest! {
        #[test]
        fn finished_lands_at_total_duration(bytes in prop::collection::vec(any::<u8>(), 0..12)) {
            let symbols: Vec<Symbol> = bytes.iter().copied().map(Symbol::new).collect();
            let t0 = Instant::now();
            let mut scheduler = PlaybackScheduler::default();
            scheduler.start(&symbols, Mode::Morse, t0);

            let events = drain(&mut scheduler, t0);

            let n = symbols.len() as u64;
            let h: u64 = symbols.iter().map(|s| u64::from(s.ones())).sum();
            let expected = ms(250 * (8 * n - h) + 600 * h + 150 * 8 * n + 500 * n);

            let finished: Vec<_> = events.iter().filter(|(_, e)| e.is_finished()).collect();
            prop_assert_eq!(finished.len(), 1);
            prop_assert_eq!(finished[0].0, expected);
            prop_assert!(events.last().is_some_and(|(_, e)| e.is_finished()));
            prop_assert_eq!(events.len() as u64, 16 * n + 1);
            prop_assert_eq!(PlaybackConfig::default().total_duration(&symbols), expected);
        }

        #[test]
        fn events_are_in_nondecreasing_time(bytes in prop::collection::vec(any::<u8>(), 0..8)) {
            let symbols: Vec<Symbol> = bytes.iter().copied().map(Symbol::new).collect();
            let t0 = Instant::now();
            let mut scheduler = PlaybackScheduler::default();
            scheduler.start(&symbols, Mode::Grid, t0);

            let events = drain(&mut scheduler, t0);
            prop_assert!(events.windows(2).all(|w| w[0].0 <= w[1].0));
        }
    }
}
