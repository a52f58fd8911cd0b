//! Generic runtime.
//!
//! The single timeline every component runs on. Each turn of the loop:
//!
//! 1. Drain feed updates the store subscription queued.
//! 2. Wait for driver input, at most until the next deadline.
//! 3. Feed input to the [`App`], then release due decay ticks and playback
//!    events with [`App::tick`].
//! 4. Execute the resulting actions, rendering at most once.
//!
//! Store callbacks never touch the app directly; they only push onto the
//! channel drained in step 1.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tracing::{debug, warn};
use upside_core::{
    env::Environment,
    store::{FeedUpdate, RealtimeStore, Subscription},
};

use crate::{App, AppAction, AppEvent, Driver};

/// Longest wait for input, so queued feed updates are seen promptly.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Orchestrates an [`App`], a [`Driver`], and a [`RealtimeStore`].
pub struct Runtime<D, S, E>
where
    D: Driver,
    S: RealtimeStore,
    E: Environment,
{
    app: App<E>,
    driver: D,
    store: Arc<S>,
    inbox: mpsc::UnboundedReceiver<FeedUpdate>,
    subscription: Subscription,
    pending: Vec<AppAction>,
}

impl<D, S, E> Runtime<D, S, E>
where
    D: Driver,
    S: RealtimeStore,
    E: Environment,
{
    /// Subscribe to the app's collection and take ownership of all parts.
    pub fn new(app: App<E>, driver: D, store: Arc<S>) -> Self {
        let (tx, inbox) = mpsc::unbounded_channel();

        let subscription = store.subscribe(
            app.collection(),
            Box::new(move |update| {
                if tx.send(update).is_err() {
                    debug!("runtime gone, dropping feed update");
                }
            }),
        );

        Self { app, driver, store, inbox, subscription, pending: vec![AppAction::Render] }
    }

    /// Queue actions the app produced before the runtime took it over, such
    /// as the result of a startup login. They run first, ahead of any input.
    pub fn queue(&mut self, actions: impl IntoIterator<Item = AppAction>) {
        self.pending.extend(actions);
    }

    /// The app being driven.
    pub fn app(&self) -> &App<E> {
        &self.app
    }

    /// Run until the app asks to quit. Returns the final app state and the
    /// stopped driver.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if input or rendering fails. Store failures
    /// are logged and never end the loop.
    pub async fn run(mut self) -> Result<(App<E>, D), D::Error> {
        let mut pending = std::mem::take(&mut self.pending);

        loop {
            if self.execute(std::mem::take(&mut pending)).await? {
                break;
            }

            while let Ok(update) = self.inbox.try_recv() {
                pending.extend(self.app.handle(AppEvent::FeedUpdate(update)));
            }

            let timeout = self.poll_timeout();
            for event in self.driver.poll_event(timeout).await? {
                pending.extend(self.app.handle(event));
            }

            pending.extend(self.app.tick());
        }

        self.subscription.unsubscribe();
        self.driver.stop();
        Ok((self.app, self.driver))
    }

    fn poll_timeout(&self) -> Duration {
        self.app.next_deadline().map_or(MAX_POLL_INTERVAL, |deadline| {
            deadline.saturating_duration_since(self.app.env().now()).min(MAX_POLL_INTERVAL)
        })
    }

    /// Returns true when the app asked to quit.
    async fn execute(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut render = false;

        for action in actions {
            match action {
                AppAction::Render => render = true,
                AppAction::Quit => {
                    debug!("quit requested");
                    return Ok(true);
                },
                AppAction::Append { collection, record } => {
                    if let Err(error) = self.store.append(&collection, record).await {
                        warn!(%collection, %error, "append failed");
                    }
                },
                AppAction::Signal { mode, event } => self.driver.signal(mode, &event)?,
            }
        }

        if render {
            self.driver.render(&self.app)?;
        }
        Ok(false)
    }
}
