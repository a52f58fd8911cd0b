//! Terminal driver.
//!
//! Reads one command per line and prints text screens. Waiting for input is
//! bounded by the runtime's poll timeout, so playback and decay keep running
//! while the user types.

use std::{future::Future, io::Write, time::Duration};

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;
use upside_app::{App, AppEvent, Command, Driver, commands};
use upside_core::{env::Environment, playback::PlaybackEvent};
use upside_proto::Mode;

use crate::render;

/// Terminal I/O failure.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Reading input or writing output failed
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Line-oriented driver over any async reader and blocking writer.
pub struct TerminalDriver<R, W> {
    lines: Lines<R>,
    out: W,
    last_screen: Option<String>,
    closed: bool,
}

impl<R, W> TerminalDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    /// Read commands from `input`, print to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { lines: input.lines(), out: output, last_screen: None, closed: false }
    }

    /// Consume the driver and return the output sink.
    pub fn into_output(self) -> W {
        self.out
    }
}

impl<R, W> Driver for TerminalDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    type Error = TerminalError;

    fn poll_event(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<AppEvent>, Self::Error>> + Send {
        async move {
            if self.closed {
                return Ok(vec![AppEvent::Command(Command::Quit)]);
            }

            match tokio::time::timeout(timeout, self.lines.next_line()).await {
                Err(_elapsed) => Ok(Vec::new()),
                Ok(Ok(Some(line))) if line.trim().is_empty() => Ok(Vec::new()),
                Ok(Ok(Some(line))) => Ok(vec![AppEvent::Command(commands::parse(&line))]),
                Ok(Ok(None)) => {
                    debug!("input closed");
                    self.closed = true;
                    Ok(vec![AppEvent::Command(Command::Quit)])
                },
                Ok(Err(e)) => Err(TerminalError::Io(e)),
            }
        }
    }

    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error> {
        let screen = render::screen(app);
        if self.last_screen.as_ref() == Some(&screen) {
            return Ok(());
        }

        writeln!(self.out)?;
        self.out.write_all(screen.as_bytes())?;
        self.out.flush()?;
        self.last_screen = Some(screen);
        Ok(())
    }

    fn signal(&mut self, mode: Mode, event: &PlaybackEvent) -> Result<(), Self::Error> {
        if let Some(line) = render::cue(mode, event) {
            writeln!(self.out, "{line}")?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Err(e) = self.out.flush() {
            debug!(error = %e, "flush on stop failed");
        }
    }
}
