//! Scenario builder API.
//!
//! Provides a declarative API for constructing scenario tests that enforce
//! the Oracle Pattern.

use std::{sync::Arc, time::Duration};

use tracing::warn;
use upside_app::{App, AppConfig, Runtime};
use upside_core::{env::Environment, error::StoreError, feed::BroadcastSync};
use upside_proto::Mode;
use upside_store::MemoryStore;

use crate::{
    FaultyStore, SimDriver, SimEnv,
    scenario::{OracleFn, World},
};

#[derive(Debug, Clone)]
enum Action {
    Input(String),
    Remote { from: String, content: String, mode: Mode },
    FeedError(StoreError),
    FailAppends(Option<StoreError>),
}

/// Scenario builder.
///
/// Script user input and outside events against virtual time. Must call
/// `.oracle()` to get a RunnableScenario that can be executed.
pub struct Scenario {
    name: String,
    seed: u64,
    config: AppConfig,
    horizon: Option<Duration>,
    actions: Vec<(Duration, Action)>,
}

impl Scenario {
    /// Create a new scenario with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seed: 0,
            config: AppConfig::default(),
            horizon: None,
            actions: Vec::new(),
        }
    }

    /// Seed for the simulated RNG.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Use a custom app configuration.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// End the session at `at` if nothing quits earlier.
    pub fn horizon(mut self, at: Duration) -> Self {
        self.horizon = Some(at);
        self
    }

    /// The user types `line` at `at`.
    pub fn input(mut self, at: Duration, line: impl Into<String>) -> Self {
        self.actions.push((at, Action::Input(line.into())));
        self
    }

    /// Another client appends a message at `at`.
    pub fn remote(
        mut self,
        at: Duration,
        from: impl Into<String>,
        content: impl Into<String>,
        mode: Mode,
    ) -> Self {
        self.actions.push((
            at,
            Action::Remote { from: from.into(), content: content.into(), mode },
        ));
        self
    }

    /// The store delivers `error` instead of a snapshot at `at`.
    pub fn feed_error(mut self, at: Duration, error: StoreError) -> Self {
        self.actions.push((at, Action::FeedError(error)));
        self
    }

    /// From `at` on, appends fail with `error`; `None` heals the store.
    pub fn fail_appends(mut self, at: Duration, error: Option<StoreError>) -> Self {
        self.actions.push((at, Action::FailAppends(error)));
        self
    }

    /// Set the oracle function and return a runnable scenario.
    ///
    /// The oracle is mandatory - you cannot run a scenario without
    /// verification.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle function that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute the scenario.
    ///
    /// Builds a fresh store and virtual clock, schedules every scripted
    /// action on a [`SimDriver`], runs the real runtime until it quits, then
    /// runs the oracle against the final world.
    pub async fn run(self) -> Result<(), String> {
        let Scenario { name, seed, config, horizon, actions } = self.scenario;

        let env = SimEnv::with_seed(seed);
        let memory = Arc::new(MemoryStore::new());
        let store = FaultyStore::new(Arc::clone(&memory));
        let collection = config.feed.collection.clone();

        let mut driver = SimDriver::new(env.clone());
        if let Some(horizon) = horizon {
            driver = driver.horizon(horizon);
        }

        for (at, action) in actions {
            driver = match action {
                Action::Input(line) => driver.line(at, &line),
                Action::Remote { from, content, mode } => {
                    let memory = Arc::clone(&memory);
                    let collection = collection.clone();
                    let env = env.clone();
                    driver.hook(at, move || {
                        let record = BroadcastSync::compose(&from, &content, mode, env.unix_millis());
                        if let Err(error) = memory.insert_document(&collection, &record.to_document()) {
                            warn!(%error, "remote append failed");
                        }
                    })
                },
                Action::FeedError(error) => {
                    let store = store.clone();
                    let collection = collection.clone();
                    driver.hook(at, move || store.inject_error(&collection, error.clone()))
                },
                Action::FailAppends(error) => {
                    let store = store.clone();
                    driver.hook(at, move || store.fail_appends(error.clone()))
                },
            };
        }

        let app = App::new(config, env.clone());
        let runtime = Runtime::new(app, driver, Arc::new(store.clone()));
        let (app, driver) = match runtime.run().await {
            Ok(finished) => finished,
            Err(never) => match never {},
        };

        let world = World::new(name, env, app, driver, store);
        (self.oracle)(&world).map_err(|e| format!("Scenario '{}': {e}", world.name()))
    }
}
