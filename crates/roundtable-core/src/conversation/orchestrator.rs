//! Conversation orchestrator for Roundtable.
//!
//! `ConversationOrchestrator` owns one session: the message log, the
//! lifecycle status, and a driver loop that runs turns in the background.
//! Each turn commits the current utterance, starts the next speaker's
//! generation, and plays the current audio while the next text and audio
//! resolve. All observable changes are published to the `EventBus`.
//!
//! Every driver loop holds a `RunTicket`. `stop()` and `intervene()` revoke
//! it (new epoch, cancelled token), so a late result from a revoked loop is
//! dropped instead of reaching the log or the speaker.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use roundtable_types::agent::{Agent, AgentId, CredentialKey};
use roundtable_types::config::ConversationConfig;
use roundtable_types::conversation::{ConversationStatus, Emotion};
use roundtable_types::error::{ProviderError, ValidationError};
use roundtable_types::event::{ConversationEvent, Severity};
use roundtable_types::llm::GenerationRequest;
use roundtable_types::message::Message;
use roundtable_types::speech::{SpeechRequest, truncate_for_speech};

use crate::credential::CredentialSource;
use crate::emotion::{EmotionAnalyzer, KeywordEmotionAnalyzer};
use crate::event::EventBus;
use crate::llm::box_client::BoxGenerationClient;
use crate::notify::Notifier;
use crate::roster::AgentRoster;
use crate::speech::client::BoxSpeechClient;
use crate::speech::playback::BoxPlaybackSink;
use crate::turn::TurnSelector;

use super::context::ContextBuilder;
use super::pipeline::{AudioTask, PrefetchSlot, TextTask, join_audio, join_text};
use super::state::{RunTicket, SessionState};

/// Why a driver loop stopped running turns.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// A generation call failed. The session pauses.
    #[error("{agent} could not respond: {source}")]
    Generation {
        agent: String,
        #[source]
        source: ProviderError,
    },

    /// The roster had no eligible agent when a turn began. The session pauses.
    #[error("no eligible agent is available to speak")]
    NoSpeaker,

    /// The loop was revoked or the session left `running`. Never surfaced.
    #[error("turn aborted")]
    Aborted,
}

/// External services a session talks to.
pub struct Collaborators {
    pub generation: BoxGenerationClient,
    pub speech: BoxSpeechClient,
    pub playback: BoxPlaybackSink,
    pub roster: Arc<dyn AgentRoster>,
    pub credentials: Arc<dyn CredentialSource>,
    pub notifier: Arc<dyn Notifier>,
}

/// One conversation session.
///
/// Cloning yields another handle to the same session. Control methods
/// never block on network work; the ones that launch the driver loop
/// (`start`, `resume`, `intervene`) must be called inside a Tokio runtime.
#[derive(Clone)]
pub struct ConversationOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    generation: Arc<BoxGenerationClient>,
    speech: Arc<BoxSpeechClient>,
    playback: BoxPlaybackSink,
    roster: Arc<dyn AgentRoster>,
    credentials: Arc<dyn CredentialSource>,
    notifier: Arc<dyn Notifier>,
    analyzer: Box<dyn EmotionAnalyzer>,
    events: EventBus,
    state: Mutex<SessionState>,
}

impl ConversationOrchestrator {
    /// Session with the keyword emotion heuristic and an entropy-seeded
    /// turn selector.
    pub fn new(collaborators: Collaborators, config: ConversationConfig) -> Self {
        let analyzer = KeywordEmotionAnalyzer::new(config.emotion.clone());
        let selector = TurnSelector::new(config.max_redraws);
        Self::with_parts(collaborators, config, Box::new(analyzer), selector)
    }

    pub fn with_parts(
        collaborators: Collaborators,
        config: ConversationConfig,
        analyzer: Box<dyn EmotionAnalyzer>,
        selector: TurnSelector,
    ) -> Self {
        let Collaborators {
            generation,
            speech,
            playback,
            roster,
            credentials,
            notifier,
        } = collaborators;

        Self {
            inner: Arc::new(Inner {
                generation: Arc::new(generation),
                speech: Arc::new(speech),
                playback,
                roster,
                credentials,
                notifier,
                analyzer,
                events: EventBus::default(),
                state: Mutex::new(SessionState::new(config, selector)),
            }),
        }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.inner.events.subscribe()
    }

    /// Begin a new conversation about `topic`.
    ///
    /// Fails without touching the session if the topic is blank, fewer than
    /// two agents are eligible, a generation key is missing, or a session is
    /// already active. Failures are also sent to the notifier.
    pub fn start(&self, topic: &str) -> Result<(), ValidationError> {
        match self.try_start(topic) {
            Ok(ticket) => {
                self.inner.launch(ticket);
                Ok(())
            }
            Err(err) => {
                self.inner.notify(&err.to_string(), Severity::Warning);
                Err(err)
            }
        }
    }

    fn try_start(&self, topic: &str) -> Result<RunTicket, ValidationError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ValidationError::MissingTopic);
        }

        let eligible = self.inner.roster.eligible();
        if eligible.len() < 2 {
            return Err(ValidationError::NotEnoughAgents {
                eligible: eligible.len(),
            });
        }

        let missing: BTreeSet<CredentialKey> = eligible
            .iter()
            .map(|agent| agent.provider.credential_key())
            .filter(|key| !self.inner.credentials.has_credential(*key))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingCredentials {
                providers: missing.into_iter().collect(),
            });
        }

        let inner = &self.inner;
        let mut state = inner.state();
        if state.status != ConversationStatus::Idle {
            return Err(ValidationError::AlreadyActive {
                status: state.status,
            });
        }

        state.messages.clear();
        state.emotions.clear();
        state.selector.reset();
        state.topic = topic.to_string();
        inner.set_speaking(&mut state, None);
        inner.set_generating(&mut state, false);
        inner.append(&mut state, Message::topic(topic));
        inner.set_status(&mut state, ConversationStatus::Running);
        let ticket = state.arm();

        info!(topic, agents = eligible.len(), epoch = ticket.epoch, "conversation started");
        Ok(ticket)
    }

    /// Suspend between turns. Only valid while running.
    ///
    /// The loop's in-flight call is allowed to finish, but its result is
    /// not appended and no new turn begins.
    pub fn pause(&self) -> bool {
        let mut state = self.inner.state();
        if state.status != ConversationStatus::Running {
            return false;
        }
        self.inner.set_status(&mut state, ConversationStatus::Paused);
        info!("conversation paused");
        true
    }

    /// Continue a paused session. Only valid while paused.
    ///
    /// If the previous loop has not noticed the pause yet it simply keeps
    /// going; otherwise a new loop is launched.
    pub fn resume(&self) -> bool {
        let ticket = {
            let mut state = self.inner.state();
            if state.status != ConversationStatus::Paused {
                return false;
            }
            self.inner.set_status(&mut state, ConversationStatus::Running);
            if state.driver_alive {
                None
            } else {
                Some(state.arm())
            }
        };

        info!(relaunched = ticket.is_some(), "conversation resumed");
        if let Some(ticket) = ticket {
            self.inner.launch(ticket);
        }
        true
    }

    /// End the session. Abandons in-flight work and silences playback
    /// before returning.
    pub fn stop(&self) -> bool {
        {
            let mut state = self.inner.state();
            if state.status == ConversationStatus::Idle {
                return false;
            }
            state.invalidate();
            self.inner.set_speaking(&mut state, None);
            self.inner.set_generating(&mut state, false);
            self.inner.set_status(&mut state, ConversationStatus::Idle);
        }
        self.inner.playback.force_stop();
        info!("conversation stopped");
        true
    }

    /// Add a human message to the log.
    ///
    /// An active session is interrupted first (loop revoked, playback
    /// silenced) and restarted in `running` after the settle delay, so the
    /// next generation sees the interjection. An idle session only records
    /// the message.
    pub fn intervene(&self, text: &str) -> Result<(), ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyInterjection);
        }

        let restart = {
            let mut state = self.inner.state();
            let interrupted = state.status != ConversationStatus::Idle;
            if interrupted {
                state.invalidate();
                self.inner.set_speaking(&mut state, None);
                self.inner.set_generating(&mut state, false);
            }
            self.inner.append(&mut state, Message::interjection(text));
            if interrupted {
                self.inner.set_status(&mut state, ConversationStatus::Running);
                Some((state.epoch, state.config.settle_delay()))
            } else {
                None
            }
        };

        if let Some((epoch, settle)) = restart {
            self.inner.playback.force_stop();
            debug!(epoch, "interjection received, restarting after settle delay");
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                tokio::time::sleep(settle).await;
                inner.restart(epoch);
            });
        }
        Ok(())
    }

    /// Mute or unmute speech. Takes effect from the next synthesis request.
    pub fn set_voice_muted(&self, muted: bool) {
        self.inner.state().config.voice_muted = muted;
    }

    pub fn config(&self) -> ConversationConfig {
        self.inner.state().config.clone()
    }

    pub fn status(&self) -> ConversationStatus {
        self.inner.state().status
    }

    /// Snapshot of the log, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.inner.state().messages.clone()
    }

    pub fn topic(&self) -> String {
        self.inner.state().topic.clone()
    }

    /// The current turn is waiting on text generation.
    pub fn is_generating(&self) -> bool {
        self.inner.state().generating
    }

    /// Last computed mood for `agent`; `Neutral` before the first analysis.
    pub fn emotion(&self, agent: &AgentId) -> Emotion {
        self.inner
            .state()
            .emotions
            .get(agent)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_speaking(&self, agent: &AgentId) -> bool {
        self.inner.state().speaking == Some(*agent)
    }

    pub fn speaking_agent(&self) -> Option<AgentId> {
        self.inner.state().speaking
    }
}

impl std::fmt::Debug for ConversationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state();
        f.debug_struct("ConversationOrchestrator")
            .field("status", &state.status)
            .field("messages", &state.messages.len())
            .field("epoch", &state.epoch)
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("conversation state lock poisoned")
    }

    fn launch(self: &Arc<Self>, ticket: RunTicket) {
        let inner = Arc::clone(self);
        tokio::spawn(async move { inner.drive(ticket).await });
    }

    /// Relaunch after an interjection, unless something else already
    /// moved the session on.
    fn restart(self: &Arc<Self>, epoch: u64) {
        let ticket = {
            let mut state = self.state();
            if state.epoch != epoch
                || state.status != ConversationStatus::Running
                || state.driver_alive
            {
                return;
            }
            state.arm()
        };
        self.launch(ticket);
    }

    // -- event-emitting setters (caller holds the lock) --

    fn append(&self, state: &mut SessionState, message: Message) {
        let index = state.append(message);
        self.events.publish(ConversationEvent::MessageAppended {
            index,
            message: state.messages[index].clone(),
        });
    }

    fn set_status(&self, state: &mut SessionState, status: ConversationStatus) {
        if state.status != status {
            state.status = status;
            self.events
                .publish(ConversationEvent::StatusChanged { status });
        }
    }

    fn set_speaking(&self, state: &mut SessionState, agent_id: Option<AgentId>) {
        if state.speaking != agent_id {
            state.speaking = agent_id;
            self.events
                .publish(ConversationEvent::SpeakingChanged { agent_id });
        }
    }

    fn set_generating(&self, state: &mut SessionState, generating: bool) {
        if state.generating != generating {
            state.generating = generating;
            self.events
                .publish(ConversationEvent::GeneratingChanged { generating });
        }
    }

    fn notify(&self, message: &str, severity: Severity) {
        self.notifier.notify(message, severity);
        self.events.publish(ConversationEvent::Notice {
            message: message.to_string(),
            severity,
        });
    }

    // -- ticket checks --

    /// Ok while `ticket`'s loop may keep acting on the session.
    ///
    /// When the session left `running`, the loop is marked gone in the same
    /// critical section so `resume()` knows to launch a new one.
    fn claim(state: &mut SessionState, ticket: &RunTicket) -> Result<(), TurnError> {
        if !state.owns(ticket) {
            return Err(TurnError::Aborted);
        }
        if state.status != ConversationStatus::Running {
            state.driver_alive = false;
            return Err(TurnError::Aborted);
        }
        Ok(())
    }

    fn check(&self, ticket: &RunTicket) -> Result<(), TurnError> {
        Self::claim(&mut self.state(), ticket)
    }

    fn is_running(&self, ticket: &RunTicket) -> bool {
        let state = self.state();
        state.owns(ticket) && state.status == ConversationStatus::Running
    }

    fn mark_generating(&self, ticket: &RunTicket, generating: bool) {
        let mut state = self.state();
        if state.owns(ticket) {
            self.set_generating(&mut state, generating);
        }
    }

    fn mark_speaking(&self, ticket: &RunTicket, agent_id: Option<AgentId>) {
        let mut state = self.state();
        if state.owns(ticket) {
            self.set_speaking(&mut state, agent_id);
        }
    }

    /// Append an utterance if the loop still owns a running session.
    fn commit(&self, ticket: &RunTicket, message: Message) -> Result<(), TurnError> {
        let mut state = self.state();
        Self::claim(&mut state, ticket)?;
        self.append(&mut state, message);
        Ok(())
    }

    // -- driver loop --

    async fn drive(&self, ticket: RunTicket) {
        debug!(epoch = ticket.epoch, "conversation loop started");
        let mut slot = PrefetchSlot::new();
        let err = loop {
            if let Err(err) = self.turn(&ticket, &mut slot).await {
                break err;
            }
        };
        slot.discard();

        match err {
            TurnError::Aborted => debug!(epoch = ticket.epoch, "conversation loop exited"),
            TurnError::NoSpeaker => {
                warn!(epoch = ticket.epoch, "no eligible agent, pausing");
                self.halt(&ticket, &err, Severity::Warning);
            }
            TurnError::Generation { .. } => {
                error!(epoch = ticket.epoch, error = %err, "generation failed, pausing");
                self.halt(&ticket, &err, Severity::Error);
            }
        }
    }

    /// Pause the session after a failure and tell the user once.
    fn halt(&self, ticket: &RunTicket, err: &TurnError, severity: Severity) {
        {
            let mut state = self.state();
            if !state.owns(ticket) {
                return;
            }
            state.driver_alive = false;
            self.set_generating(&mut state, false);
            self.set_speaking(&mut state, None);
            if state.status == ConversationStatus::Running {
                self.set_status(&mut state, ConversationStatus::Paused);
            }
        }
        self.notify(&format!("{err}; conversation paused"), severity);
    }

    /// Run one turn: commit, prefetch, voice, pace.
    async fn turn(&self, ticket: &RunTicket, slot: &mut PrefetchSlot) -> Result<(), TurnError> {
        self.check(ticket)?;

        let (agent, text, audio) = match slot.take() {
            Some(prepared) => (prepared.agent, prepared.text, prepared.audio),
            None => {
                slot.discard();
                let agent = self.select_speaker().ok_or(TurnError::NoSpeaker)?;
                let text = self.generate_now(ticket, &agent).await?;
                (agent, text, None)
            }
        };

        self.commit(ticket, Message::from_agent(&agent, text.trim()))?;
        debug!(agent = %agent.name, epoch = ticket.epoch, "turn committed");

        let audio = audio.or_else(|| self.spawn_speech(&agent, &text));

        if self.is_running(ticket) {
            if let Some(next) = self.select_speaker() {
                let task = self.spawn_generation(&next);
                slot.begin(next, task);
            }
        }

        if let Some(audio) = audio {
            self.voice(ticket, slot, &agent, audio).await?;
        }

        if slot.is_text_pending() {
            self.mark_generating(ticket, true);
            tokio::select! {
                _ = ticket.abort.cancelled() => return Err(TurnError::Aborted),
                _ = slot.resolve_text() => {}
            }
            self.mark_generating(ticket, false);
            self.check(ticket)?;
        }
        self.prefetch_speech(ticket, slot);

        if let Some((agent, source)) = slot.take_failure() {
            return Err(TurnError::Generation {
                agent: agent.name,
                source,
            });
        }

        let delay = self.state().config.inter_turn_delay();
        tokio::select! {
            _ = ticket.abort.cancelled() => Err(TurnError::Aborted),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    /// Generate `agent`'s text while the turn waits on it.
    async fn generate_now(&self, ticket: &RunTicket, agent: &Agent) -> Result<String, TurnError> {
        self.mark_generating(ticket, true);
        let mut task = self.spawn_generation(agent);
        let result = tokio::select! {
            _ = ticket.abort.cancelled() => {
                task.abort();
                return Err(TurnError::Aborted);
            }
            joined = &mut task => join_text(joined),
        };
        self.mark_generating(ticket, false);

        result.map_err(|source| TurnError::Generation {
            agent: agent.name.clone(),
            source,
        })
    }

    /// Wait for `agent`'s audio and play it, feeding the prefetch slot in
    /// the meantime. Speech failures only cost the turn its audio.
    async fn voice(
        &self,
        ticket: &RunTicket,
        slot: &mut PrefetchSlot,
        agent: &Agent,
        mut audio: AudioTask,
    ) -> Result<(), TurnError> {
        let synthesized = loop {
            tokio::select! {
                biased;
                _ = ticket.abort.cancelled() => {
                    audio.abort();
                    return Err(TurnError::Aborted);
                }
                joined = &mut audio => break join_audio(joined),
                _ = slot.resolve_text(), if slot.is_text_pending() => {
                    self.prefetch_speech(ticket, slot);
                }
            }
        };
        self.check(ticket)?;

        let muted = self.state().config.voice_muted;
        let bytes = match synthesized {
            Ok(Some(_)) if muted => {
                debug!(agent = %agent.name, "muted since synthesis, dropping audio");
                return Ok(());
            }
            Ok(Some(bytes)) if !bytes.is_empty() => bytes,
            Ok(_) => {
                debug!(agent = %agent.name, "no audio for this turn");
                return Ok(());
            }
            Err(err) => {
                warn!(agent = %agent.name, error = %err, "speech synthesis failed, continuing without audio");
                return Ok(());
            }
        };

        self.mark_speaking(ticket, Some(agent.id));
        let playback = self.playback.play(bytes, agent.id);
        tokio::pin!(playback);
        loop {
            tokio::select! {
                biased;
                _ = ticket.abort.cancelled() => return Err(TurnError::Aborted),
                _ = &mut playback => break,
                _ = slot.resolve_text(), if slot.is_text_pending() => {
                    self.prefetch_speech(ticket, slot);
                }
            }
        }
        self.mark_speaking(ticket, None);
        self.check(ticket)
    }

    // -- turn building blocks --

    fn select_speaker(&self) -> Option<Agent> {
        let eligible = self.roster.eligible();
        let mut guard = self.state();
        let state = &mut *guard;
        let mode = state.config.turn_mode;
        state
            .selector
            .select_next(&eligible, state.messages.last(), mode)
    }

    /// Analyze `agent`'s mood and assemble its request from the log.
    fn prepare_request(&self, agent: &Agent) -> GenerationRequest {
        let roster = self.roster.agents();
        let mut state = self.state();

        let reading = self.analyzer.analyze(agent, &state.messages);
        state.emotions.insert(agent.id, reading.emotion);
        self.events.publish(ConversationEvent::EmotionChanged {
            agent_id: agent.id,
            emotion: reading.emotion,
        });

        ContextBuilder::build(
            agent,
            &state.topic,
            &roster,
            &state.messages,
            state.config.context_size,
            state.config.length_level,
            reading.directive.as_deref(),
        )
    }

    fn spawn_generation(&self, agent: &Agent) -> TextTask {
        let request = self.prepare_request(agent);
        let client = Arc::clone(&self.generation);
        let name = agent.name.clone();
        tokio::spawn(async move {
            let result = client.generate(&request).await;
            debug!(agent = %name, ok = result.is_ok(), "generation finished");
            result
        })
    }

    /// Request audio for `text`, unless muted or the agent cannot speak.
    fn spawn_speech(&self, agent: &Agent, text: &str) -> Option<AudioTask> {
        let (muted, speed, limit) = {
            let state = self.state();
            (
                state.config.voice_muted,
                state.config.speech_rate,
                state.config.speech_char_limit,
            )
        };
        if muted || text.trim().is_empty() {
            return None;
        }
        let voice_id = agent.voice()?.to_string();
        if !self
            .credentials
            .has_credential(agent.voice_provider.credential_key())
        {
            debug!(agent = %agent.name, provider = %agent.voice_provider, "no speech credential, skipping audio");
            return None;
        }

        let request = SpeechRequest {
            text: truncate_for_speech(text.trim(), limit),
            provider: agent.voice_provider,
            voice_id,
            speed,
        };
        let client = Arc::clone(&self.speech);
        Some(tokio::spawn(async move { client.synthesize(&request).await }))
    }

    /// Start the next turn's audio as soon as its text is known.
    fn prefetch_speech(&self, ticket: &RunTicket, slot: &mut PrefetchSlot) {
        if !self.is_running(ticket) {
            return;
        }
        let task = match slot.awaiting_speech() {
            Some((agent, text)) => self.spawn_speech(agent, text),
            None => None,
        };
        if let Some(task) = task {
            slot.attach_audio(task);
        }
    }
}
