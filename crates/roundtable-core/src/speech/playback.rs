//! Audio playback boundary.
//!
//! The playback device is a single shared resource: the orchestrator keeps
//! at most one `play` call in flight and calls `force_stop` before any
//! other turn's audio could start.

use std::future::Future;
use std::pin::Pin;

use roundtable_types::agent::AgentId;

/// Trait for audio output devices.
pub trait PlaybackSink: Send + Sync {
    /// Play `audio` to completion. Resolves early after `force_stop`.
    ///
    /// Decode or device errors are the sink's own business: it logs them
    /// and resolves as if playback finished.
    fn play(&self, audio: Vec<u8>, speaker: AgentId) -> impl Future<Output = ()> + Send;

    /// Silence the device immediately. Must not block.
    fn force_stop(&self);
}

/// Object-safe version of [`PlaybackSink`] with boxed futures.
pub trait PlaybackSinkDyn: Send + Sync {
    fn play_boxed(
        &self,
        audio: Vec<u8>,
        speaker: AgentId,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    fn force_stop_dyn(&self);
}

impl<T: PlaybackSink> PlaybackSinkDyn for T {
    fn play_boxed(
        &self,
        audio: Vec<u8>,
        speaker: AgentId,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.play(audio, speaker))
    }

    fn force_stop_dyn(&self) {
        self.force_stop();
    }
}

/// Type-erased playback sink.
pub struct BoxPlaybackSink {
    inner: Box<dyn PlaybackSinkDyn + Send + Sync>,
}

impl BoxPlaybackSink {
    pub fn new<T: PlaybackSink + 'static>(sink: T) -> Self {
        Self {
            inner: Box::new(sink),
        }
    }

    pub async fn play(&self, audio: Vec<u8>, speaker: AgentId) {
        self.inner.play_boxed(audio, speaker).await
    }

    pub fn force_stop(&self) {
        self.inner.force_stop_dyn();
    }
}

impl std::fmt::Debug for BoxPlaybackSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxPlaybackSink").finish_non_exhaustive()
    }
}

/// A sink that plays nothing and finishes immediately.
///
/// Useful when speech is muted for the whole session.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayback;

impl PlaybackSink for SilentPlayback {
    async fn play(&self, _audio: Vec<u8>, _speaker: AgentId) {}

    fn force_stop(&self) {}
}
