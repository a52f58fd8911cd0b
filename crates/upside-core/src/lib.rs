//! Upside core logic
//!
//! Pure state machine logic for the Upside signal toy, completely decoupled
//! from I/O. This enables deterministic testing of every timed behavior.
//!
//! # Architecture
//!
//! Components in this crate are deterministic state machines isolated from
//! I/O, time, randomness, and scheduling. The current instant is passed in by
//! the caller; randomness arrives through [`env::Environment`].
//!
//! State transitions produce declarative actions or events that describe what
//! happened rather than acting on it. A runtime or test harness decides when
//! to call in (usually at [`playback::PlaybackScheduler::next_deadline`] or
//! [`session::Session::next_deadline`]) and what to do with the output.
//!
//! All four components share one logical timeline. None of them lock; the
//! only asynchronous input, store subscription callbacks, must be marshaled
//! onto that timeline before it reaches [`feed::BroadcastSync`].
//!
//! # Components
//!
//! - [`codec`]: Text to symbol transform
//! - [`playback`]: Timed playback scheduler (start, poll, cancel)
//! - [`session`]: Sanity decay, possession, and recovery
//! - [`feed`]: Broadcast feed snapshot sync
//! - [`store`]: Real-time store abstraction
//! - [`noise`]: Seeded grid noise for GRID rendering
//! - [`mod@env`]: Environment abstraction (time, RNG)
//! - [`error`]: Store error types

pub mod codec;
pub mod env;
pub mod error;
pub mod feed;
pub mod noise;
pub mod playback;
pub mod session;
pub mod store;
