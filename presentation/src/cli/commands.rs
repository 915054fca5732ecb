//! Command-line interface definition

use clap::Parser;
use std::path::PathBuf;

/// ThinkTank - multi-model group chat
#[derive(Parser, Debug)]
#[command(name = "thinktank", version, about)]
pub struct Cli {
    /// Message to send (omit with --chat for interactive mode)
    pub message: Option<String>,

    /// Start an interactive chat session
    #[arg(long)]
    pub chat: bool,

    /// Generation mode: eco, budget, balanced, deluxe, council
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Participant model ids (repeatable, max 4); overrides the thread's set
    #[arg(short = 'M', long = "model")]
    pub model: Vec<String>,

    /// Thread to post into
    #[arg(long, default_value = "default")]
    pub thread: String,

    /// Skip the council debate round
    #[arg(long)]
    pub no_debate: bool,

    /// Print replies as they arrive instead of waiting for the full turn
    #[arg(long)]
    pub stream: bool,

    /// Verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Explicit config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ignore all config files and use built-in defaults
    #[arg(long)]
    pub no_config: bool,
}
