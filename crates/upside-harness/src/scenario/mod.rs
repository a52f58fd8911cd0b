//! Scenario testing with mandatory oracles.
//!
//! A scenario scripts one user's session against a shared in-memory store,
//! runs it through the real [`upside_app::Runtime`] on a virtual clock, and
//! hands the final [`World`] to an oracle. There is no way to run a scenario
//! without one.

mod builder;
mod world;

pub use builder::{RunnableScenario, Scenario};
pub use world::World;

/// Verifies a finished scenario.
pub type OracleFn = Box<dyn FnOnce(&World) -> Result<(), String>>;
