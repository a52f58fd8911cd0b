//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, time::Duration};

use upside_core::{env::Environment, playback::PlaybackEvent};
use upside_proto::Mode;

use crate::{App, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`crate::Runtime`] handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal and in simulation.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait up to `timeout` for input and return the events it produced.
    ///
    /// Returns an empty vector if no input arrived in time.
    ///
    /// # Errors
    ///
    /// Returns an error if the input source failed.
    fn poll_event(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<AppEvent>, Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error>;

    /// Present one playback event of a run in `mode`. Drivers that only
    /// redraw from app state can leave this as a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the output device failed.
    fn signal(&mut self, mode: Mode, event: &PlaybackEvent) -> Result<(), Self::Error> {
        let _ = (mode, event);
        Ok(())
    }

    /// Release input and output resources.
    fn stop(&mut self);
}
