//! Virtual-clock environment.
//!
//! Time only moves when something calls [`SimEnv::advance`], typically the
//! [`crate::SimDriver`] while it waits for the next scripted step. Randomness
//! comes from a ChaCha stream seeded at construction.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use upside_core::env::Environment;

/// Wall clock reading at virtual time zero.
pub const UNIX_EPOCH_MILLIS: i64 = 1_700_000_000_000;

#[derive(Debug)]
struct SimState {
    origin: Instant,
    elapsed: Duration,
    rng: ChaCha8Rng,
}

/// Deterministic environment. Clones share the same clock and RNG.
#[derive(Debug, Clone)]
pub struct SimEnv {
    state: Arc<Mutex<SimState>>,
}

impl SimEnv {
    /// Fresh clock at zero with an RNG seeded from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        let state =
            SimState { origin: Instant::now(), elapsed: Duration::ZERO, rng: ChaCha8Rng::seed_from_u64(seed) };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        self.lock().elapsed += duration;
    }

    /// Virtual time since construction.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        let state = self.lock();
        state.origin + state.elapsed
    }

    fn unix_millis(&self) -> i64 {
        let elapsed = self.elapsed().as_millis();
        UNIX_EPOCH_MILLIS + i64::try_from(elapsed).unwrap_or(i64::MAX - UNIX_EPOCH_MILLIS)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.lock().rng.fill_bytes(buffer);
    }
}
