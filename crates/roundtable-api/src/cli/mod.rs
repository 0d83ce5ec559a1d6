//! CLI command definitions for the `rtbl` binary.

pub mod roster;
pub mod talk;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use roundtable_types::conversation::TurnMode;

/// Let a table of AI agents talk about a topic, out loud.
#[derive(Parser)]
#[command(name = "rtbl", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ~/.roundtable/roundtable.toml).
    #[arg(long, global = true, env = "ROUNDTABLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed log output (-v for verbose, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a conversation about a topic.
    Talk(talk::TalkArgs),

    /// Show configured agents, their eligibility, and credential status.
    #[command(alias = "agents")]
    Roster,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// `--turn-mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TurnModeArg {
    RoundRobin,
    Random,
}

impl From<TurnModeArg> for TurnMode {
    fn from(arg: TurnModeArg) -> Self {
        match arg {
            TurnModeArg::RoundRobin => TurnMode::RoundRobin,
            TurnModeArg::Random => TurnMode::Random,
        }
    }
}
