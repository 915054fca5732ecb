//! Presentation layer for thinktank
//!
//! CLI argument parsing, the interactive chat REPL, console formatting,
//! and progress reporting.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

pub use chat::repl::ChatRepl;
pub use cli::commands::Cli;
pub use output::formatter::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
