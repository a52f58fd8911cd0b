//! World state for scenario verification.
//!
//! The World holds everything a finished scenario left behind: the final app,
//! the driver's recordings, and the store. Oracles inspect it.

use std::time::Duration;

use upside_app::{App, View};
use upside_core::{playback::PlaybackEvent, store::StoredRecord};
use upside_store::MemoryStore;

use crate::{FaultyStore, Frame, SimDriver, SimEnv};

/// Final state of a scenario.
pub struct World {
    name: String,
    env: SimEnv,
    app: App<SimEnv>,
    driver: SimDriver,
    store: FaultyStore<MemoryStore>,
}

impl World {
    pub(crate) fn new(
        name: String,
        env: SimEnv,
        app: App<SimEnv>,
        driver: SimDriver,
        store: FaultyStore<MemoryStore>,
    ) -> Self {
        Self { name, env, app, driver, store }
    }

    /// Scenario name, for oracle messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Virtual time at which the session ended.
    pub fn elapsed(&self) -> Duration {
        self.env.elapsed()
    }

    /// The app as it was when the session ended.
    pub fn app(&self) -> &App<SimEnv> {
        &self.app
    }

    /// Every render.
    pub fn frames(&self) -> &[Frame] {
        self.driver.frames()
    }

    /// Every playback signal with its virtual time.
    pub fn signals(&self) -> &[(Duration, PlaybackEvent)] {
        self.driver.signals()
    }

    /// Store wrapper the app talked to.
    pub fn store(&self) -> &FaultyStore<MemoryStore> {
        &self.store
    }

    /// Contents of `collection`, newest first.
    pub fn records(&self, collection: &str) -> Vec<StoredRecord> {
        self.store.inner().query(collection)
    }

    /// Number of `Finished` signals seen.
    pub fn finished_runs(&self) -> usize {
        self.signals().iter().filter(|(_, event)| event.is_finished()).count()
    }

    /// Views in the order they first appeared, consecutive repeats collapsed.
    pub fn view_history(&self) -> Vec<View> {
        let mut views: Vec<View> = Vec::new();
        for frame in self.frames() {
            if views.last() != Some(&frame.view) {
                views.push(frame.view);
            }
        }
        views
    }

    /// Lowest sanity any render showed.
    pub fn min_sanity(&self) -> Option<u8> {
        self.frames().iter().map(|f| f.sanity).min()
    }

    /// Virtual time of the first render showing the possession overlay.
    pub fn possessed_at(&self) -> Option<Duration> {
        self.frames().iter().find(|f| f.possessed).map(|f| f.at)
    }

    /// Whether the driver was released.
    pub fn driver_stopped(&self) -> bool {
        self.driver.is_stopped()
    }
}
