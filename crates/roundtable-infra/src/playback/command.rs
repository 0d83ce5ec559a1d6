//! [`PlaybackSink`] that hands each clip to an external player process.
//!
//! Each clip is spooled to a temporary `.mp3` file and played with the
//! configured command (`ffplay`, `mpv`, `afplay`, `mpg123`, ...).
//! `force_stop` kills the running player.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use roundtable_core::speech::playback::PlaybackSink;
use roundtable_types::agent::AgentId;

/// Players probed by [`PlayerCommand::detect`], in order.
const KNOWN_PLAYERS: &[(&str, &[&str])] = &[
    ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]),
    ("mpv", &["--no-video", "--really-quiet"]),
    ("afplay", &[]),
    ("mpg123", &["-q"]),
];

/// Program plus leading arguments; the clip path is appended last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PlayerCommand {
    /// Split a command line on whitespace (`"mpv --really-quiet"`).
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// First known player found on `PATH`.
    pub fn detect() -> Option<Self> {
        let path = std::env::var_os("PATH")?;
        let dirs: Vec<PathBuf> = std::env::split_paths(&path).collect();
        KNOWN_PLAYERS
            .iter()
            .find(|(program, _)| dirs.iter().any(|dir| dir.join(program).is_file()))
            .map(|(program, args)| Self {
                program: (*program).to_string(),
                args: args.iter().map(|a| (*a).to_string()).collect(),
            })
    }
}

/// Removes the spooled clip however playback ends.
struct SpoolFile(PathBuf);

impl Drop for SpoolFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// Playback sink backed by an external player.
#[derive(Debug)]
pub struct CommandPlaybackSink {
    player: PlayerCommand,
    spool_dir: PathBuf,
    stop: watch::Sender<u64>,
}

impl CommandPlaybackSink {
    /// Create a sink spooling clips under `spool_dir` (created if missing).
    pub fn new(player: PlayerCommand, spool_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let spool_dir = spool_dir.into();
        std::fs::create_dir_all(&spool_dir)?;
        let (stop, _) = watch::channel(0);
        Ok(Self {
            player,
            spool_dir,
            stop,
        })
    }

    /// Spool directory under the system temp dir.
    pub fn default_spool_dir() -> PathBuf {
        std::env::temp_dir().join("roundtable-audio")
    }

    pub fn player(&self) -> &PlayerCommand {
        &self.player
    }
}

impl PlaybackSink for CommandPlaybackSink {
    async fn play(&self, audio: Vec<u8>, speaker: AgentId) {
        // Only stops requested after this point apply to this clip.
        let mut stop = self.stop.subscribe();

        let spool = SpoolFile(self.spool_dir.join(format!("{}.mp3", Uuid::now_v7())));
        if let Err(e) = tokio::fs::write(&spool.0, &audio).await {
            warn!(path = %spool.0.display(), error = %e, "failed to spool audio");
            return;
        }

        let spawned = tokio::process::Command::new(&self.player.program)
            .args(&self.player.args)
            .arg(&spool.0)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!(player = %self.player.program, error = %e, "failed to start audio player");
                return;
            }
        };

        debug!(%speaker, bytes = audio.len(), "playback started");
        tokio::select! {
            status = child.wait() => match status {
                Ok(status) if !status.success() => {
                    warn!(player = %self.player.program, %status, "audio player exited with failure");
                }
                Ok(_) => debug!(%speaker, "playback finished"),
                Err(e) => warn!(player = %self.player.program, error = %e, "failed to wait for audio player"),
            },
            _ = stop.changed() => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                debug!(%speaker, "playback stopped");
            }
        }
    }

    fn force_stop(&self) {
        self.stop.send_modify(|n| *n = n.wrapping_add(1));
    }
}
