//! Configuration types for Roundtable.
//!
//! `RoundtableConfig` represents the top-level `roundtable.toml`: conversation
//! settings, the agent roster, and optional API keys.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, CredentialKey};
use crate::conversation::{LengthLevel, TurnMode};

/// Tunables for a conversation session. All fields have defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub turn_mode: TurnMode,
    /// Number of trailing log messages sent as context.
    pub context_size: usize,
    pub length_level: LengthLevel,
    /// Speed hint forwarded to speech providers that support it.
    pub speech_rate: f64,
    pub voice_muted: bool,
    /// Pause after every turn.
    pub inter_turn_delay_ms: u64,
    /// Wait between an interjection and the loop restart.
    pub settle_delay_ms: u64,
    /// Draws in random mode, the first included, before a repeat speaker
    /// is accepted.
    pub max_redraws: u32,
    /// Character cap for text sent to speech synthesis.
    pub speech_char_limit: usize,
    pub emotion: EmotionConfig,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            turn_mode: TurnMode::default(),
            context_size: 20,
            length_level: LengthLevel::default(),
            speech_rate: 1.0,
            voice_muted: false,
            inter_turn_delay_ms: 100,
            settle_delay_ms: 250,
            max_redraws: 10,
            speech_char_limit: 500,
            emotion: EmotionConfig::default(),
        }
    }
}

impl ConversationConfig {
    pub fn inter_turn_delay(&self) -> Duration {
        Duration::from_millis(self.inter_turn_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Parameters of the keyword emotion heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    /// Trailing messages inspected per analysis.
    pub window: usize,
    /// Messages with a contrastive marker needed to call a debate heated.
    pub heated_debate_threshold: usize,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            window: 5,
            heated_debate_threshold: 2,
        }
    }
}

/// Top-level configuration file.
///
/// Loaded from `~/.roundtable/roundtable.toml` unless overridden.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundtableConfig {
    #[serde(default)]
    pub conversation: ConversationConfig,

    #[serde(default)]
    pub agents: Vec<Agent>,

    /// API keys keyed by provider name (`openai`, `anthropic`, `gemini`,
    /// `elevenlabs`). Environment variables take precedence.
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
}

impl RoundtableConfig {
    /// The configured key for `key`, ignoring blank values.
    pub fn credential(&self, key: CredentialKey) -> Option<&str> {
        self.credentials
            .iter()
            .find(|(name, _)| name.parse::<CredentialKey>().ok() == Some(key))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }
}
