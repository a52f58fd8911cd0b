//! Application state machine.
//!
//! Composes the session, the playback scheduler, and the broadcast feed behind
//! one event handler. Pure apart from the [`Environment`] it reads time and
//! seeds from: I/O is requested through [`AppAction`]s.

use std::{sync::Arc, time::Instant};

use tracing::{debug, info, warn};
use upside_core::{
    codec,
    env::Environment,
    feed::{BroadcastSync, FeedConfig, FeedOutcome, FeedSnapshot},
    noise::GridPattern,
    playback::{PlaybackConfig, PlaybackScheduler},
    session::{RecoveryToken, Session, SessionAction, SessionConfig},
};
use upside_proto::Mode;

use crate::{
    AppAction, AppEvent,
    commands::Command,
    state::{PlaybackView, View},
};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Transmission timing
    pub playback: PlaybackConfig,
    /// Sanity decay and recovery
    pub session: SessionConfig,
    /// Watched collection
    pub feed: FeedConfig,
    /// Mode selected for outgoing messages at startup
    pub initial_mode: Mode,
}

/// Application state machine.
#[derive(Debug)]
pub struct App<E: Environment> {
    env: E,
    view: View,
    user: Option<String>,
    draft_mode: Mode,
    session: Session,
    scheduler: PlaybackScheduler,
    feed: BroadcastSync,
    playback: Option<PlaybackView>,
    status: Option<String>,
}

impl<E: Environment> App<E> {
    /// Start at the login view. Sanity starts decaying immediately.
    pub fn new(config: AppConfig, env: E) -> Self {
        let now = env.now();
        Self {
            view: View::Login,
            user: None,
            draft_mode: config.initial_mode,
            session: Session::new(config.session, now),
            scheduler: PlaybackScheduler::new(config.playback),
            feed: BroadcastSync::new(config.feed),
            playback: None,
            status: None,
            env,
        }
    }

    /// Environment in use.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Current screen.
    pub fn view(&self) -> View {
        self.view
    }

    /// Logged in user id.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Mode for the next transmission.
    pub fn draft_mode(&self) -> Mode {
        self.draft_mode
    }

    /// Sanity state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current feed snapshot.
    pub fn feed(&self) -> Arc<FeedSnapshot> {
        self.feed.snapshot()
    }

    /// Collection the feed watches.
    pub fn collection(&self) -> &str {
        self.feed.collection()
    }

    /// Transmission on screen.
    pub fn playback(&self) -> Option<&PlaybackView> {
        self.playback.as_ref()
    }

    /// Last notice for the user.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Earliest pending playback or decay deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.scheduler.next_deadline(), self.session.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Handle one event.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Command(command) => self.handle_command(command),
            AppEvent::FeedUpdate(update) => match self.feed.apply(update) {
                FeedOutcome::Replaced { .. } => vec![AppAction::Render],
                FeedOutcome::Retained { error } => {
                    self.notice(format!("feed unavailable: {error}"))
                },
            },
        }
    }

    /// Release everything due by now: decay ticks and playback events.
    pub fn tick(&mut self) -> Vec<AppAction> {
        let now = self.env.now();
        let mut actions = Vec::new();

        let session_actions = self.session.tick(now);
        let mut dirty = !session_actions.is_empty();
        self.apply_session(session_actions);

        let mode = self.scheduler.mode().unwrap_or_default();
        for event in self.scheduler.poll(now) {
            if let Some(view) = self.playback.as_mut() {
                view.apply(&event);
            }
            if event.is_finished() {
                debug!(run = event.run().value(), "transmission finished");
                self.playback = None;
                self.view = View::Feed;
            }
            actions.push(AppAction::Signal { mode, event });
            dirty = true;
        }

        if dirty {
            actions.push(AppAction::Render);
        }
        actions
    }

    fn handle_command(&mut self, command: Command) -> Vec<AppAction> {
        if command == Command::Quit {
            return vec![AppAction::Quit];
        }

        self.status = None;

        if self.session.is_possessed() {
            return self.handle_possessed(command);
        }

        match command {
            Command::Login { user_id } => self.login(user_id),
            Command::SetMode { mode } => {
                self.draft_mode = mode;
                self.notice(format!("transmitting in {mode}"))
            },
            Command::Message { content } if self.view == View::Login => self.login(content),
            Command::Message { content } => self.transmit(content),
            Command::ShowFeed => {
                if self.user.is_none() {
                    return self.notice("log in first");
                }
                self.stop_playback();
                self.view = View::Feed;
                vec![AppAction::Render]
            },
            Command::Replay { index } => self.replay(index),
            Command::Back => self.back(),
            Command::Stop => {
                if self.stop_playback() {
                    self.view = View::Feed;
                    vec![AppAction::Render]
                } else {
                    self.notice("nothing is playing")
                }
            },
            Command::Unknown { input } => self.notice(format!("unknown command: {input}")),
            Command::InvalidArgs { command, error } => self.notice(format!("/{command}: {error}")),
            Command::Quit => vec![AppAction::Quit],
        }
    }

    /// While possessed every line is a run of recovery tokens and nothing else
    /// gets through.
    fn handle_possessed(&mut self, command: Command) -> Vec<AppAction> {
        let Command::Message { content } = command else {
            return self.notice("possessed: enter the sequence");
        };

        let tokens: Result<Vec<RecoveryToken>, _> =
            content.split_whitespace().map(str::parse::<RecoveryToken>).collect();

        let tokens = match tokens {
            Ok(tokens) => tokens,
            Err(error) => return self.notice(error.to_string()),
        };

        let now = self.env.now();
        for token in tokens {
            let actions = self.session.input(token, now);
            self.apply_session(actions);
        }
        vec![AppAction::Render]
    }

    fn apply_session(&mut self, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::SanityChanged { sanity } => {
                    debug!(sanity, "sanity decayed");
                },
                SessionAction::Possessed => {
                    self.status = Some("possessed: enter the sequence".into());
                },
                SessionAction::Recovered => {
                    self.status = Some("recovered".into());
                },
            }
        }
    }

    fn login(&mut self, user_id: String) -> Vec<AppAction> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return self.notice("user id must not be empty");
        }

        info!(user = user_id, "logged in");
        self.stop_playback();
        self.user = Some(user_id.to_string());
        self.view = View::Compose;
        vec![AppAction::Render]
    }

    fn transmit(&mut self, content: String) -> Vec<AppAction> {
        let Some(user) = self.user.as_deref() else {
            return self.notice("log in first");
        };

        let record = BroadcastSync::compose(user, &content, self.draft_mode, self.env.unix_millis());
        let collection = self.feed.collection().to_string();
        debug!(%collection, mode = %self.draft_mode, len = content.len(), "transmitting");

        self.start_playback(content, self.draft_mode);
        vec![AppAction::Append { collection, record }, AppAction::Render]
    }

    fn replay(&mut self, index: usize) -> Vec<AppAction> {
        if self.user.is_none() {
            return self.notice("log in first");
        }

        let snapshot = self.feed.snapshot();
        let Some(entry) = snapshot.get(index) else {
            warn!(index, len = snapshot.len(), "replay of missing feed entry");
            return self.notice(format!("no feed entry {}", index + 1));
        };

        self.start_playback(entry.message.content().to_string(), entry.message.mode());
        vec![AppAction::Render]
    }

    fn back(&mut self) -> Vec<AppAction> {
        self.view = match self.view {
            View::Login | View::Compose => View::Login,
            View::Feed => View::Compose,
            View::Playback => {
                self.stop_playback();
                View::Compose
            },
        };
        vec![AppAction::Render]
    }

    fn start_playback(&mut self, content: String, mode: Mode) {
        let symbols = codec::encode(&content);
        let run = self.scheduler.start(&symbols, mode, self.env.now());
        let noise = (mode == Mode::Grid)
            .then(|| [GridPattern::from_env(&self.env), GridPattern::from_env(&self.env)]);

        self.playback =
            Some(PlaybackView { run, mode, content, symbols, lit: None, symbol_index: 0, noise });
        self.view = View::Playback;
    }

    fn stop_playback(&mut self) -> bool {
        self.playback = None;
        self.scheduler.cancel().is_some()
    }

    fn notice(&mut self, text: impl Into<String>) -> Vec<AppAction> {
        let text = text.into();
        debug!(%text, "notice");
        self.status = Some(text);
        vec![AppAction::Render]
    }
}
