//! Prefetch slot: the "next" turn being prepared while the current one is
//! voiced.
//!
//! The slot holds at most one pending generation and one pending synthesis.
//! It is either consumed with [`PrefetchSlot::take`] once the text is ready
//! or dropped with [`PrefetchSlot::discard`]; nothing it holds reaches the
//! log until it has been taken.

use tokio::task::{JoinError, JoinHandle};

use roundtable_types::agent::Agent;
use roundtable_types::error::ProviderError;

/// Background generation call.
pub type TextTask = JoinHandle<Result<String, ProviderError>>;

/// Background synthesis call. `Ok(None)` means the turn has no audio.
pub type AudioTask = JoinHandle<Result<Option<Vec<u8>>, ProviderError>>;

/// Collapse a joined generation task into the provider's result.
pub fn join_text(
    joined: Result<Result<String, ProviderError>, JoinError>,
) -> Result<String, ProviderError> {
    joined.unwrap_or_else(|err| Err(ProviderError::Transport(format!("generation task failed: {err}"))))
}

/// Collapse a joined synthesis task into the provider's result.
pub fn join_audio(
    joined: Result<Result<Option<Vec<u8>>, ProviderError>, JoinError>,
) -> Result<Option<Vec<u8>>, ProviderError> {
    joined.unwrap_or_else(|err| Err(ProviderError::Transport(format!("speech task failed: {err}"))))
}

#[derive(Debug, Default)]
enum NextText {
    #[default]
    Empty,
    Pending(TextTask),
    Ready(String),
    Failed(ProviderError),
}

/// A fully generated turn handed from the slot to the loop.
#[derive(Debug)]
pub struct PreparedTurn {
    pub agent: Agent,
    pub text: String,
    pub audio: Option<AudioTask>,
}

#[derive(Debug, Default)]
pub struct PrefetchSlot {
    agent: Option<Agent>,
    text: NextText,
    audio: Option<AudioTask>,
}

impl PrefetchSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.agent.is_none()
    }

    /// Start preparing `agent`'s turn. Anything still in the slot is
    /// discarded first.
    pub fn begin(&mut self, agent: Agent, text: TextTask) {
        self.discard();
        self.agent = Some(agent);
        self.text = NextText::Pending(text);
    }

    pub fn is_text_pending(&self) -> bool {
        matches!(self.text, NextText::Pending(_))
    }

    /// Wait for the pending generation, if any, and keep its outcome.
    ///
    /// Cancel safe: dropping the future leaves the task pending in the slot.
    pub async fn resolve_text(&mut self) {
        if let NextText::Pending(handle) = &mut self.text {
            let outcome = match join_text(handle.await) {
                Ok(text) => NextText::Ready(text),
                Err(err) => NextText::Failed(err),
            };
            self.text = outcome;
        }
    }

    /// Agent and text of a resolved turn that has no synthesis yet.
    pub fn awaiting_speech(&self) -> Option<(&Agent, &str)> {
        match (&self.agent, &self.text, &self.audio) {
            (Some(agent), NextText::Ready(text), None) => Some((agent, text.as_str())),
            _ => None,
        }
    }

    pub fn attach_audio(&mut self, audio: AudioTask) {
        if let Some(previous) = self.audio.replace(audio) {
            previous.abort();
        }
    }

    /// The generation error, if the prefetch failed. Empties the slot.
    pub fn take_failure(&mut self) -> Option<(Agent, ProviderError)> {
        if !matches!(self.text, NextText::Failed(_)) {
            return None;
        }
        let text = std::mem::take(&mut self.text);
        let agent = self.agent.take();
        self.discard();
        match (agent, text) {
            (Some(agent), NextText::Failed(err)) => Some((agent, err)),
            _ => None,
        }
    }

    /// The prepared turn, once its text is ready. Empties the slot.
    pub fn take(&mut self) -> Option<PreparedTurn> {
        if !matches!(self.text, NextText::Ready(_)) {
            return None;
        }
        let text = std::mem::take(&mut self.text);
        let agent = self.agent.take();
        let audio = self.audio.take();
        match (agent, text) {
            (Some(agent), NextText::Ready(text)) => Some(PreparedTurn { agent, text, audio }),
            _ => None,
        }
    }

    /// Drop everything, aborting background calls that are still running.
    pub fn discard(&mut self) {
        if let NextText::Pending(handle) = std::mem::take(&mut self.text) {
            handle.abort();
        }
        if let Some(audio) = self.audio.take() {
            audio.abort();
        }
        self.agent = None;
    }
}

impl Drop for PrefetchSlot {
    fn drop(&mut self) {
        self.discard();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_types::agent::GenerationProvider;
    use std::time::Duration;

    fn bo() -> Agent {
        Agent::new("Bo", "skeptic", GenerationProvider::Claude)
    }

    #[tokio::test]
    async fn test_take_after_resolve() {
        let mut slot = PrefetchSlot::new();
        assert!(slot.take().is_none());

        slot.begin(bo(), tokio::spawn(async { Ok("x2".to_string()) }));
        assert!(slot.is_text_pending());
        assert!(slot.take().is_none());

        slot.resolve_text().await;
        assert!(!slot.is_text_pending());
        assert_eq!(slot.awaiting_speech().map(|(a, t)| (a.name.as_str(), t)), Some(("Bo", "x2")));

        let turn = slot.take().unwrap();
        assert_eq!(turn.agent.name, "Bo");
        assert_eq!(turn.text, "x2");
        assert!(turn.audio.is_none());
        assert!(slot.is_empty());
    }

    #[tokio::test]
    async fn test_audio_travels_with_turn() {
        let mut slot = PrefetchSlot::new();
        slot.begin(bo(), tokio::spawn(async { Ok("x2".to_string()) }));
        slot.resolve_text().await;
        slot.attach_audio(tokio::spawn(async { Ok(Some(vec![1, 2, 3])) }));
        assert!(slot.awaiting_speech().is_none());

        let turn = slot.take().unwrap();
        let audio = join_audio(turn.audio.unwrap().await).unwrap();
        assert_eq!(audio, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_failure_is_reported_once() {
        let mut slot = PrefetchSlot::new();
        slot.begin(
            bo(),
            tokio::spawn(async { Err(ProviderError::Provider("boom".to_string())) }),
        );
        slot.resolve_text().await;
        assert!(slot.take().is_none());

        let (agent, err) = slot.take_failure().unwrap();
        assert_eq!(agent.name, "Bo");
        assert_eq!(err.message(), "boom");
        assert!(slot.take_failure().is_none());
        assert!(slot.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_discard_aborts_pending_work() {
        let mut slot = PrefetchSlot::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        slot.begin(
            bo(),
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                let _ = tx.send(());
                Ok("late".to_string())
            }),
        );
        slot.discard();
        assert!(slot.is_empty());
        assert!(!slot.is_text_pending());
        // The aborted task drops its sender without sending.
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_failure() {
        let mut slot = PrefetchSlot::new();
        slot.begin(
            bo(),
            tokio::spawn(async {
                if true {
                    panic!("provider bug");
                }
                Ok("unreachable".to_string())
            }),
        );
        slot.resolve_text().await;
        let (_, err) = slot.take_failure().unwrap();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
