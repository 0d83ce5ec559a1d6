//! Event types for the Roundtable conversation event bus.
//!
//! `ConversationEvent` is broadcast on every observable change of a session.
//! All variants are Clone + Send + Sync for use with tokio broadcast channels.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::agent::AgentId;
use crate::conversation::{ConversationStatus, Emotion};
use crate::message::Message;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Observable changes of a conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    /// A message was appended at `index` in the log.
    MessageAppended { index: usize, message: Message },

    /// The lifecycle status changed.
    StatusChanged { status: ConversationStatus },

    /// The current turn started or finished waiting on generation.
    GeneratingChanged { generating: bool },

    /// `agent_id` became audible, or nobody is (`None`).
    SpeakingChanged { agent_id: Option<AgentId> },

    /// An agent's emotion label was recomputed.
    EmotionChanged { agent_id: AgentId, emotion: Emotion },

    /// A notice for the user (validation failure, paused on error, ...).
    Notice { message: String, severity: Severity },
}
