//! App events
//!
//! Inputs to the App state machine. Timer expiry is not an event: the runtime
//! calls [`crate::App::tick`] on every turn of its loop.

use upside_core::store::FeedUpdate;

use crate::commands::Command;

/// Events consumed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Parsed user input.
    Command(Command),

    /// Subscription delivery from the store, already marshaled onto the
    /// runtime's timeline.
    FeedUpdate(FeedUpdate),
}

impl From<Command> for AppEvent {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}
