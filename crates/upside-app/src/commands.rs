//! Command parsing for the terminal and other text-based interfaces.
//!
//! This module parses command strings into structured [`Command`] values.
//! Parsing is context free: whether a plain line is a user id, a message, or a
//! run of recovery tokens is decided by the [`crate::App`] from its current
//! view and session state.

use upside_proto::Mode;

/// Parsed command from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in under a user id.
    Login {
        /// Sender id stamped on outgoing messages.
        user_id: String,
    },

    /// Select the mode for outgoing messages.
    SetMode {
        /// New draft mode.
        mode: Mode,
    },

    /// Show the broadcast feed.
    ShowFeed,

    /// Replay a feed entry in the mode it was sent with.
    Replay {
        /// Zero-based position in the feed, newest first.
        index: usize,
    },

    /// Navigate back one screen.
    Back,

    /// Stop the active playback.
    Stop,

    /// Quit the application.
    Quit,

    /// Plain text: a message, a login id, or recovery tokens.
    Message {
        /// Text as typed.
        content: String,
    },

    /// Unknown or invalid command.
    Unknown {
        /// The original input.
        input: String,
    },

    /// Command with missing or invalid arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// Error message.
        error: String,
    },
}

/// Parse a user input string into a command.
///
/// Commands start with `/`. Anything else is treated as a message.
pub fn parse(input: &str) -> Command {
    let input = input.trim();

    if input.is_empty() {
        return Command::Message { content: String::new() };
    }

    let Some(cmd_str) = input.strip_prefix('/') else {
        return Command::Message { content: input.to_string() };
    };

    let (command, rest) = match cmd_str.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (cmd_str, ""),
    };

    match command {
        "login" => match rest.split_whitespace().next() {
            Some(user_id) => Command::Login { user_id: user_id.to_string() },
            None => Command::InvalidArgs {
                command: "login".into(),
                error: "Usage: /login <user_id>".into(),
            },
        },

        "mode" => match rest {
            "" => Command::InvalidArgs {
                command: "mode".into(),
                error: "Usage: /mode <morse|color|beep|grid>".into(),
            },
            name => match name.parse::<Mode>() {
                Ok(mode) => Command::SetMode { mode },
                Err(e) => Command::InvalidArgs { command: "mode".into(), error: e.to_string() },
            },
        },

        "send" => Command::Message { content: rest.to_string() },

        "feed" => Command::ShowFeed,

        "play" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Replay { index: n - 1 },
            _ if rest.is_empty() => Command::InvalidArgs {
                command: "play".into(),
                error: "Usage: /play <n>".into(),
            },
            _ => Command::InvalidArgs {
                command: "play".into(),
                error: "Invalid feed position".into(),
            },
        },

        "back" => Command::Back,

        "stop" => Command::Stop,

        "quit" | "q" => Command::Quit,

        _ => Command::Unknown { input: input.to_string() },
    }
}
