//! Audio playback through an external command-line player.
//!
//! - `command`: [`CommandPlaybackSink`] and player discovery

pub mod command;

pub use command::{CommandPlaybackSink, PlayerCommand};
