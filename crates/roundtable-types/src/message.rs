//! Conversation log entries.
//!
//! A [`Message`] is immutable once appended to a session's log. The log is
//! the single source of truth when rebuilding an agent's context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::agent::{Agent, AgentId};

/// Color used for the topic announcement.
pub const SYSTEM_COLOR: &str = "#888888";

/// Color used for human interjections.
pub const HUMAN_COLOR: &str = "#FFFFFF";

/// Role of a message in the conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Assistant,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::Assistant => write!(f, "assistant"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "agent_id", rename_all = "snake_case")]
pub enum Speaker {
    /// The session itself (topic announcement).
    System,
    /// One of the agents.
    Agent(AgentId),
    /// The human moderator interjecting.
    Human,
}

impl Speaker {
    pub fn agent_id(&self) -> Option<AgentId> {
        match self {
            Speaker::Agent(id) => Some(*id),
            _ => None,
        }
    }
}

/// A single entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub speaker: Speaker,
    /// Display name at the time the message was written.
    pub speaker_name: String,
    pub color: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// The "topic announced" entry that opens every session.
    pub fn topic(topic: &str) -> Self {
        Self {
            role: Role::System,
            speaker: Speaker::System,
            speaker_name: "System".to_string(),
            color: SYSTEM_COLOR.to_string(),
            content: format!("Topic: {topic}"),
            timestamp: Utc::now(),
        }
    }

    /// An utterance produced by `agent`.
    pub fn from_agent(agent: &Agent, content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            speaker: Speaker::Agent(agent.id),
            speaker_name: agent.name.clone(),
            color: agent.color.clone(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// A human interjection.
    pub fn interjection(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            speaker: Speaker::Human,
            speaker_name: "You".to_string(),
            color: HUMAN_COLOR.to_string(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Whether `agent_id` wrote this message.
    pub fn is_from(&self, agent_id: &AgentId) -> bool {
        self.speaker == Speaker::Agent(*agent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::GenerationProvider;

    #[test]
    fn test_topic_message() {
        let msg = Message::topic("chess");
        assert_eq!(msg.role, Role::System);
        assert_eq!(msg.speaker, Speaker::System);
        assert_eq!(msg.content, "Topic: chess");
    }

    #[test]
    fn test_agent_message_carries_identity() {
        let agent = Agent::new("Ada", "logician", GenerationProvider::OpenAi);
        let msg = Message::from_agent(&agent, "x1");
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.is_from(&agent.id));
        assert_eq!(msg.speaker_name, "Ada");
        assert_eq!(msg.color, agent.color);
    }

    #[test]
    fn test_interjection_is_human() {
        let msg = Message::interjection("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.speaker, Speaker::Human);
        assert_eq!(msg.speaker.agent_id(), None);
        assert_eq!(msg.color, HUMAN_COLOR);
    }

    #[test]
    fn test_speaker_serde() {
        let id = AgentId::new();
        let json = serde_json::to_string(&Speaker::Agent(id)).unwrap();
        assert!(json.contains("\"kind\":\"agent\""));
        let parsed: Speaker = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Speaker::Agent(id));

        let human: Speaker = serde_json::from_str(r#"{"kind":"human"}"#).unwrap();
        assert_eq!(human, Speaker::Human);
    }
}
