//! Generation request types.
//!
//! A [`GenerationRequest`] is the fully assembled context window for one
//! utterance: provider, model, instructions, and remapped history.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::agent::GenerationProvider;
use crate::conversation::LengthLevel;

/// Role of a turn inside a generation context window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::System => write!(f, "system"),
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single turn in the context window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Everything a generation client needs for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub provider: GenerationProvider,
    pub model: String,
    /// System instructions (persona, topic, roster, length, emotional hint).
    pub system: String,
    /// History, oldest first, already remapped to the speaking agent's view.
    pub messages: Vec<ChatMessage>,
    pub length_level: LengthLevel,
    pub temperature: f64,
}

impl GenerationRequest {
    /// Temperature clamped into the range every provider accepts.
    pub fn clamped_temperature(&self) -> f64 {
        self.temperature.clamp(0.0, 2.0)
    }

    pub fn max_tokens(&self) -> u32 {
        self.length_level.max_tokens()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_is_clamped() {
        let mut request = GenerationRequest {
            provider: GenerationProvider::OpenAi,
            model: "gpt-4o-mini".to_string(),
            system: String::new(),
            messages: vec![],
            length_level: LengthLevel::new(3),
            temperature: 3.5,
        };
        assert!((request.clamped_temperature() - 2.0).abs() < f64::EPSILON);
        request.temperature = -1.0;
        assert!(request.clamped_temperature().abs() < f64::EPSILON);
        assert_eq!(request.max_tokens(), 150);
    }

    #[test]
    fn test_chat_role_serde() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
