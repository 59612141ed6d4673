//! Command-line layer
//!
//! Argument structs live in the binary; this module holds the command
//! implementations and terminal output helpers they share.

pub mod commands;
pub mod ui;
pub mod util;

pub use util::{CommandContext, ConnectionOverrides, OutputFormat, runtime};
