//! App actions
//!
//! Actions produced by the App state machine for the runtime to execute.

use upside_core::playback::PlaybackEvent;
use upside_proto::{Mode, RawRecord};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Append a record to the store. Fire-and-forget: the new entry reaches
    /// the feed through the subscription, not through this action.
    Append {
        /// Collection key.
        collection: String,
        /// Record to store.
        record: RawRecord,
    },

    /// A playback event was released; renderers with their own output
    /// (audio, lights) act on it directly.
    Signal {
        /// Mode of the run that produced the event.
        mode: Mode,
        /// The event.
        event: PlaybackEvent,
    },
}
