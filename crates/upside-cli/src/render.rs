//! Text rendering.
//!
//! [`screen`] turns app state into the text block printed whenever it
//! changes. [`cue`] turns one playback event into the line printed the moment
//! the scheduler releases it, so a transmission plays out over time below the
//! screen that started it.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use upside_app::{App, PlaybackView, View};
use upside_core::{env::Environment, noise::GridPattern, playback::PlaybackEvent};
use upside_proto::{Bit, Mode};

/// Cells in the sanity meter.
pub const METER_CELLS: usize = 10;

const MODE_HINT: &str = "  /mode <morse|color|beep|grid>  /feed  /back  /quit";
const FEED_HINT: &str = "  /play <n>  /back  /quit";
const PLAYBACK_HINT: &str = "  /stop  /back";
const TOKEN_HINT: &str = "  [UP] [DOWN] [LEFT] [RIGHT] [A] [B]";

/// Sanity meter, e.g. `[#######---]`.
///
/// Any sanity above zero keeps at least one cell filled.
pub fn meter(sanity: u8, full: u8) -> String {
    let filled = if full == 0 {
        0
    } else {
        let cells = usize::from(sanity) * METER_CELLS / usize::from(full);
        if sanity > 0 { cells.max(1) } else { cells }
    }
    .min(METER_CELLS);

    format!("[{}{}]", "#".repeat(filled), "-".repeat(METER_CELLS - filled))
}

/// Shown for timestamps outside the representable range.
pub const UNKNOWN_CLOCK: &str = "--:--:--";

/// Local time of day for a Unix millisecond timestamp.
pub fn clock(timestamp: i64) -> String {
    clock_in(timestamp, &Local)
}

/// Time of day for a Unix millisecond timestamp in `zone`.
pub fn clock_in<Tz>(timestamp: i64, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    DateTime::from_timestamp_millis(timestamp).map_or_else(
        || UNKNOWN_CLOCK.to_string(),
        |t| t.with_timezone(zone).format("%H:%M:%S").to_string(),
    )
}

/// Full screen for the current app state.
pub fn screen<E: Environment>(app: &App<E>) -> String {
    let session = app.session();
    let mut lines = Vec::new();

    let mut header = format!(
        "SANITY {} {:>3}",
        meter(session.sanity(), session.config().initial_sanity),
        session.sanity()
    );
    if session.is_critical() {
        header.push_str("  CRITICAL");
    }
    lines.push(header);
    if let Some(user) = app.user() {
        lines.push(format!("ID: {user}"));
    }

    if session.is_possessed() {
        lines.push("!!! SYSTEM COMPROMISED !!!".to_string());
        lines.push("> ENTER THE SEQUENCE:".to_string());
        lines.push(TOKEN_HINT.to_string());
        let window: Vec<_> = session.recovery_window().map(|t| t.as_str()).collect();
        if !window.is_empty() {
            lines.push(format!("> INPUT: {}", window.join(" ")));
        }
    } else {
        match app.view() {
            View::Login => lines.push("> IDENTIFY YOURSELF:".to_string()),
            View::Compose => {
                lines.push("> BROADCAST MESSAGE:".to_string());
                lines.push(format!("> SIGNAL TYPE: {}", app.draft_mode()));
                lines.push(MODE_HINT.to_string());
            },
            View::Feed => feed(app, &mut lines),
            View::Playback => {
                if let Some(playback) = app.playback() {
                    transmission(playback, &mut lines);
                }
            },
        }
    }

    if let Some(status) = app.status() {
        lines.push(format!("! {status}"));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn feed<E: Environment>(app: &App<E>, lines: &mut Vec<String>) {
    lines.push("> GLOBAL BROADCAST FEED (ALL USERS):".to_string());

    let snapshot = app.feed();
    if snapshot.is_empty() {
        lines.push("  (no signals yet)".to_string());
    }
    for (i, entry) in snapshot.entries().iter().enumerate() {
        let message = &entry.message;
        let from = if message.sender_id().is_empty() { "ANONYMOUS" } else { message.sender_id() };
        lines.push(format!(
            "{:>3}. {from}  SIGNAL: {}  {}",
            i + 1,
            message.mode(),
            clock(message.timestamp())
        ));
        lines.push(format!("     {}", message.content()));
    }
    lines.push(FEED_HINT.to_string());
}

fn transmission(playback: &PlaybackView, lines: &mut Vec<String>) {
    lines.push(format!("> RECEIVING {} SIGNAL:", playback.mode));
    match &playback.noise {
        Some([above, below]) => {
            noise(above, lines);
            lines.push(format!("  {}", playback.content));
            noise(below, lines);
        },
        None => lines.push(format!("  {}", playback.content)),
    }
    lines.push(PLAYBACK_HINT.to_string());
}

fn noise(pattern: &GridPattern, lines: &mut Vec<String>) {
    for row in pattern.row_iter() {
        let cells: String = row.iter().map(|&lit| if lit { '#' } else { '.' }).collect();
        lines.push(format!("  {cells}"));
    }
}

/// Line printed for one playback event, if the mode shows it.
///
/// Only lit bits and the end of a run print; dark gaps are silent.
pub fn cue(mode: Mode, event: &PlaybackEvent) -> Option<String> {
    match *event {
        PlaybackEvent::Active { bit, bit_index, symbol, .. } => Some(match mode {
            Mode::Morse => match bit {
                Bit::One => "  (#####)".to_string(),
                Bit::Zero => "  (#)".to_string(),
            },
            Mode::Color => match bit {
                Bit::One => "  [RED]".to_string(),
                Bit::Zero => "  [CYAN]".to_string(),
            },
            Mode::Beep => "  POISON ON THE INSIDE".to_string(),
            Mode::Grid => {
                let cells: String = symbol
                    .bits()
                    .enumerate()
                    .map(|(i, b)| {
                        if i == bit_index {
                            format!("[{}]", b.as_char())
                        } else {
                            format!(" {} ", b.as_char())
                        }
                    })
                    .collect();
                format!("  {}", cells.trim_end())
            },
        }),
        PlaybackEvent::Inactive { .. } => None,
        PlaybackEvent::Finished { .. } => Some("  -- END OF SIGNAL --".to_string()),
    }
}
