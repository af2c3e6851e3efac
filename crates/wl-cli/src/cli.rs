//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Links tracked work sessions to tickets.
///
/// Groups time-tracking records into work sessions, summarizes them, and
/// matches each one to the most likely open ticket.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Segment records into sessions and match them to tickets.
    Analyze(AnalyzeArgs),

    /// Segment records into sessions without matching.
    Sessions(RecordArgs),
}

/// Where records come from and how output is shaped.
#[derive(Debug, Args)]
pub struct RecordArgs {
    /// JSON file of activity records (`-` for stdin).
    #[arg(long)]
    pub records: PathBuf,

    /// Only use records starting at or after this time.
    /// ISO 8601 or relative (e.g. "2 hours ago").
    #[arg(long)]
    pub since: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// Idle minutes that split two sessions (overrides config).
    #[arg(long)]
    pub max_gap: Option<i64>,

    /// Minimum session length in seconds (overrides config).
    #[arg(long)]
    pub min_duration: Option<i64>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: RecordArgs,

    /// JSON file of candidate tickets. Without it no session is matched.
    #[arg(long)]
    pub tickets: Option<PathBuf>,

    /// Match threshold; a score must be strictly above it (overrides config).
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Only consider tickets assigned to this person.
    #[arg(long)]
    pub assignee: Option<String>,
}
