//! Deterministic simulation harness for Upside.
//!
//! Virtual-clock implementations of the Environment and Driver traits, a
//! fault-injecting store wrapper, reference models for property tests, and a
//! scenario builder that drives the real [`upside_app::Runtime`] end to end.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod faulty_store;
pub mod model;
pub mod scenario;
pub mod sim_driver;
pub mod sim_env;

pub use faulty_store::FaultyStore;
pub use model::{ModelFeed, ModelSession, SessionOp};
pub use scenario::{OracleFn, Scenario, World};
pub use sim_driver::{Frame, SimDriver};
pub use sim_env::SimEnv;
