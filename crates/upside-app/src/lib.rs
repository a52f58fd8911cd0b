//! Application layer for Upside
//!
//! Pure state machines and generic runtime for UI orchestration, enabling
//! deterministic simulation testing with the same code that runs in the
//! terminal.
//!
//! # Components
//!
//! - [`App`]: Application state (view, user, session, playback, feed)
//! - [`commands`]: Text command parsing
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

mod action;
mod app;
pub mod commands;
mod driver;
mod event;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::{App, AppConfig};
pub use commands::Command;
pub use driver::Driver;
pub use event::AppEvent;
pub use runtime::{MAX_POLL_INTERVAL, Runtime};
pub use state::{LitBit, PlaybackView, View};
