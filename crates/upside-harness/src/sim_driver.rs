//! Scripted driver.
//!
//! Replays input at fixed virtual times and records every render and playback
//! signal. Waiting for input moves the [`SimEnv`] clock instead of sleeping,
//! so a session that spans minutes of decay runs in microseconds.

use std::{collections::VecDeque, convert::Infallible, future::Future, time::Duration};

use upside_app::{App, AppEvent, Command, Driver, LitBit, View, commands};
use upside_core::{env::Environment, playback::PlaybackEvent};
use upside_proto::Mode;

use crate::SimEnv;

/// Virtual time after which an unscripted session is told to quit.
pub const DEFAULT_HORIZON: Duration = Duration::from_secs(3600);

/// A scripted step.
pub enum Step {
    /// Deliver an event to the app
    Event(AppEvent),
    /// Run a side effect, such as another client writing to the store
    Hook(Box<dyn FnMut() + Send>),
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event(event) => f.debug_tuple("Event").field(event).finish(),
            Self::Hook(_) => f.write_str("Hook"),
        }
    }
}

/// What the app showed at one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Virtual time of the render
    pub at: Duration,
    /// Screen
    pub view: View,
    /// Sanity meter
    pub sanity: u8,
    /// Possession overlay shown
    pub possessed: bool,
    /// Feed entries available
    pub feed_len: usize,
    /// Lit bit, if a transmission is on screen
    pub lit: Option<LitBit>,
    /// Notice line
    pub status: Option<String>,
}

/// Driver fed from a script on a virtual clock.
#[derive(Debug)]
pub struct SimDriver {
    env: SimEnv,
    script: VecDeque<(Duration, Step)>,
    horizon: Duration,
    frames: Vec<Frame>,
    signals: Vec<(Duration, PlaybackEvent)>,
    stopped: bool,
}

impl SimDriver {
    /// Empty script on `env`'s clock.
    pub fn new(env: SimEnv) -> Self {
        Self {
            env,
            script: VecDeque::new(),
            horizon: DEFAULT_HORIZON,
            frames: Vec::new(),
            signals: Vec::new(),
            stopped: false,
        }
    }

    /// Schedule `step` at virtual time `at`. Steps at the same time keep the
    /// order they were added in.
    pub fn step(mut self, at: Duration, step: Step) -> Self {
        let position = self.script.partition_point(|(t, _)| *t <= at);
        self.script.insert(position, (at, step));
        self
    }

    /// Deliver `event` at `at`.
    pub fn event(self, at: Duration, event: impl Into<AppEvent>) -> Self {
        self.step(at, Step::Event(event.into()))
    }

    /// Type `line` at `at`, parsed like terminal input.
    pub fn line(self, at: Duration, line: &str) -> Self {
        self.event(at, commands::parse(line))
    }

    /// Run `hook` at `at`.
    pub fn hook(self, at: Duration, hook: impl FnMut() + Send + 'static) -> Self {
        self.step(at, Step::Hook(Box::new(hook)))
    }

    /// Quit at `at` if the script has not ended the session before.
    pub fn horizon(mut self, at: Duration) -> Self {
        self.horizon = at;
        self
    }

    /// Every render so far.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Every playback signal so far, with its virtual time.
    pub fn signals(&self) -> &[(Duration, PlaybackEvent)] {
        &self.signals
    }

    /// True once the runtime released the driver.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Steps not yet delivered.
    pub fn pending(&self) -> usize {
        self.script.len()
    }

    fn advance(&mut self, timeout: Duration) -> Vec<AppEvent> {
        let now = self.env.elapsed();
        let mut until = (now + timeout).min(self.horizon.max(now));
        if let Some((at, _)) = self.script.front() {
            until = until.min((*at).max(now));
        }
        self.env.advance(until - now);

        let mut events = Vec::new();
        while self.script.front().is_some_and(|(at, _)| *at <= until) {
            let Some((_, step)) = self.script.pop_front() else {
                break;
            };
            match step {
                Step::Event(event) => events.push(event),
                Step::Hook(mut hook) => hook(),
            }
        }

        if events.is_empty() && until >= self.horizon {
            events.push(AppEvent::Command(Command::Quit));
        }
        events
    }
}

impl Driver for SimDriver {
    type Error = Infallible;

    fn poll_event(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<AppEvent>, Self::Error>> + Send {
        std::future::ready(Ok(self.advance(timeout)))
    }

    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error> {
        self.frames.push(Frame {
            at: self.env.elapsed(),
            view: app.view(),
            sanity: app.session().sanity(),
            possessed: app.session().is_possessed(),
            feed_len: app.feed().len(),
            lit: app.playback().and_then(|p| p.lit),
            status: app.status().map(str::to_string),
        });
        Ok(())
    }

    fn signal(&mut self, _mode: Mode, event: &PlaybackEvent) -> Result<(), Self::Error> {
        self.signals.push((self.env.elapsed(), event.clone()));
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_stops_at_next_step() {
        let env = SimEnv::with_seed(0);
        let mut driver =
            SimDriver::new(env.clone()).line(Duration::from_millis(30), "/feed");

        assert!(driver.advance(Duration::from_millis(10)).is_empty());
        assert_eq!(env.elapsed(), Duration::from_millis(10));

        let events = driver.advance(Duration::from_millis(50));
        assert_eq!(events, [AppEvent::Command(Command::ShowFeed)]);
        assert_eq!(env.elapsed(), Duration::from_millis(30));
    }

    #[test]
    fn same_time_steps_keep_insertion_order() {
        let env = SimEnv::with_seed(0);
        let mut driver = SimDriver::new(env)
            .line(Duration::ZERO, "/login will")
            .line(Duration::ZERO, "/feed");

        let events = driver.advance(Duration::ZERO);
        assert_eq!(
            events,
            [
                AppEvent::Command(Command::Login { user_id: "will".into() }),
                AppEvent::Command(Command::ShowFeed),
            ]
        );
    }

    #[test]
    fn horizon_quits() {
        let env = SimEnv::with_seed(0);
        let mut driver = SimDriver::new(env.clone()).horizon(Duration::from_millis(20));

        assert!(driver.advance(Duration::from_millis(10)).is_empty());
        assert_eq!(driver.advance(Duration::from_millis(50)), [AppEvent::Command(Command::Quit)]);
        assert_eq!(env.elapsed(), Duration::from_millis(20));
    }
}
