//! Interactive terminal conversation.
//!
//! Prints the transcript as agents speak, treats typed lines as moderator
//! interjections, and maps slash commands onto the orchestrator's control
//! surface. Entry point: [`run_talk`].

pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;

use std::path::PathBuf;

use clap::Args;

use super::TurnModeArg;

pub use loop_runner::run_talk;

#[derive(Debug, Args)]
pub struct TalkArgs {
    /// Topic to discuss (quotes optional).
    #[arg(required = true, num_args = 1..)]
    pub topic: Vec<String>,

    /// Start with speech muted (toggle later with /unmute).
    #[arg(long)]
    pub mute: bool,

    /// How the next speaker is chosen.
    #[arg(long, value_enum)]
    pub turn_mode: Option<TurnModeArg>,

    /// Utterance length, 1 (a few words) to 10 (exhaustive).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub length: Option<u8>,

    /// Audio player command; the clip path is appended (e.g. "mpv --really-quiet").
    #[arg(long, env = "ROUNDTABLE_PLAYER")]
    pub player: Option<String>,

    /// Directory for spooled audio clips.
    #[arg(long)]
    pub audio_dir: Option<PathBuf>,
}
