//! Terminal front end for Upside
//!
//! A thin shell over [`upside_app::Driver`] that reads command lines and
//! prints text screens. All orchestration lives in the generic
//! [`upside_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod args;
pub mod render;
pub mod terminal;

pub use args::Args;
pub use terminal::{TerminalDriver, TerminalError};
pub use upside_app::{App, AppAction, AppEvent, Command, Driver, Runtime};
