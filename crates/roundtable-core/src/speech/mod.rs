//! Speech synthesis and playback boundaries.
//!
//! - `client`: turns text into encoded audio (or skips it)
//! - `playback`: plays one buffer at a time and can be force-stopped

pub mod client;
pub mod playback;
