use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for an agent, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub Uuid);

impl AgentId {
    /// Create a new AgentId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create an AgentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AgentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Backend that generates an agent's utterances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Claude,
    Gemini,
}

impl GenerationProvider {
    /// Model used when an agent leaves `model` blank.
    pub fn default_model(&self) -> &'static str {
        match self {
            GenerationProvider::OpenAi => "gpt-4o-mini",
            GenerationProvider::Claude => "claude-sonnet-4-20250514",
            GenerationProvider::Gemini => "gemini-2.0-flash",
        }
    }

    /// Credential this provider authenticates with.
    pub fn credential_key(&self) -> CredentialKey {
        match self {
            GenerationProvider::OpenAi => CredentialKey::OpenAi,
            GenerationProvider::Claude => CredentialKey::Anthropic,
            GenerationProvider::Gemini => CredentialKey::Gemini,
        }
    }
}

impl fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationProvider::OpenAi => write!(f, "openai"),
            GenerationProvider::Claude => write!(f, "claude"),
            GenerationProvider::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for GenerationProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(GenerationProvider::OpenAi),
            "claude" | "anthropic" => Ok(GenerationProvider::Claude),
            "gemini" => Ok(GenerationProvider::Gemini),
            other => Err(format!("invalid generation provider: '{other}'")),
        }
    }
}

/// Backend that turns an utterance into audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceProvider {
    #[default]
    #[serde(rename = "openai_tts")]
    OpenAiTts,
    #[serde(rename = "elevenlabs")]
    ElevenLabs,
}

impl VoiceProvider {
    /// Credential this provider authenticates with.
    ///
    /// OpenAI speech shares the OpenAI chat key.
    pub fn credential_key(&self) -> CredentialKey {
        match self {
            VoiceProvider::OpenAiTts => CredentialKey::OpenAi,
            VoiceProvider::ElevenLabs => CredentialKey::ElevenLabs,
        }
    }
}

impl fmt::Display for VoiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceProvider::OpenAiTts => write!(f, "openai_tts"),
            VoiceProvider::ElevenLabs => write!(f, "elevenlabs"),
        }
    }
}

impl FromStr for VoiceProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai_tts" | "openai" => Ok(VoiceProvider::OpenAiTts),
            "elevenlabs" => Ok(VoiceProvider::ElevenLabs),
            other => Err(format!("invalid voice provider: '{other}'")),
        }
    }
}

/// Account whose API key a provider call needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKey {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Gemini,
    #[serde(rename = "elevenlabs")]
    ElevenLabs,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 4] = [
        CredentialKey::OpenAi,
        CredentialKey::Anthropic,
        CredentialKey::Gemini,
        CredentialKey::ElevenLabs,
    ];

    /// Environment variable holding this key.
    pub fn env_var(&self) -> &'static str {
        match self {
            CredentialKey::OpenAi => "OPENAI_API_KEY",
            CredentialKey::Anthropic => "ANTHROPIC_API_KEY",
            CredentialKey::Gemini => "GEMINI_API_KEY",
            CredentialKey::ElevenLabs => "ELEVENLABS_API_KEY",
        }
    }

    /// Human-readable vendor name for notices.
    pub fn display_name(&self) -> &'static str {
        match self {
            CredentialKey::OpenAi => "OpenAI",
            CredentialKey::Anthropic => "Anthropic Claude",
            CredentialKey::Gemini => "Google Gemini",
            CredentialKey::ElevenLabs => "ElevenLabs",
        }
    }
}

impl FromStr for CredentialKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(CredentialKey::OpenAi),
            "anthropic" | "claude" => Ok(CredentialKey::Anthropic),
            "gemini" => Ok(CredentialKey::Gemini),
            "elevenlabs" => Ok(CredentialKey::ElevenLabs),
            other => Err(format!("invalid credential key: '{other}'")),
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn default_temperature() -> f64 {
    0.9
}

fn default_enabled() -> bool {
    true
}

fn default_color() -> String {
    "#4ECDC4".to_string()
}

/// A conversational persona taking part in a roundtable.
///
/// Agents are owned by the surrounding application (roster file, editor UI).
/// The orchestrator only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default)]
    pub id: AgentId,
    pub name: String,
    /// Persona description; becomes part of the agent's instructions.
    pub description: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub provider: GenerationProvider,
    /// Provider model; blank means the provider default.
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub voice_provider: VoiceProvider,
    /// Voice selector; `None` disables speech for this agent.
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Agent {
    /// Create an enabled agent with provider defaults and no voice.
    pub fn new(name: impl Into<String>, description: impl Into<String>, provider: GenerationProvider) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            description: description.into(),
            color: default_color(),
            enabled: true,
            provider,
            model: String::new(),
            voice_provider: VoiceProvider::default(),
            voice_id: None,
            temperature: default_temperature(),
        }
    }

    /// Attach a voice to this agent.
    pub fn with_voice(mut self, provider: VoiceProvider, voice_id: impl Into<String>) -> Self {
        self.voice_provider = provider;
        self.voice_id = Some(voice_id.into());
        self
    }

    /// Only enabled agents with a non-blank name and description may speak.
    pub fn is_eligible(&self) -> bool {
        self.enabled && !self.name.trim().is_empty() && !self.description.trim().is_empty()
    }

    /// The model to request, falling back to the provider default.
    pub fn effective_model(&self) -> &str {
        if self.model.trim().is_empty() {
            self.provider.default_model()
        } else {
            self.model.trim()
        }
    }

    /// The configured voice, if any non-blank one is set.
    pub fn voice(&self) -> Option<&str> {
        self.voice_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Filter a roster down to the agents allowed to take a turn, preserving order.
pub fn eligible_agents(agents: &[Agent]) -> Vec<Agent> {
    agents.iter().filter(|a| a.is_eligible()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_or_disabled_agents_are_not_eligible() {
        let ok = Agent::new("Ada", "logician", GenerationProvider::OpenAi);
        let blank_name = Agent::new("  ", "logician", GenerationProvider::OpenAi);
        let blank_desc = Agent::new("Bo", "", GenerationProvider::OpenAi);
        let mut disabled = Agent::new("Cy", "poet", GenerationProvider::Gemini);
        disabled.enabled = false;

        let roster = vec![ok.clone(), blank_name, blank_desc, disabled];
        let eligible = eligible_agents(&roster);
        assert_eq!(eligible, vec![ok]);
    }

    #[test]
    fn test_effective_model_falls_back_to_provider_default() {
        let mut agent = Agent::new("Ada", "logician", GenerationProvider::Claude);
        assert_eq!(agent.effective_model(), "claude-sonnet-4-20250514");
        agent.model = "claude-3-haiku-20240307".to_string();
        assert_eq!(agent.effective_model(), "claude-3-haiku-20240307");
    }

    #[test]
    fn test_blank_voice_is_no_voice() {
        let agent = Agent::new("Ada", "logician", GenerationProvider::OpenAi)
            .with_voice(VoiceProvider::OpenAiTts, " ");
        assert!(agent.voice().is_none());
    }

    #[test]
    fn test_voice_credentials() {
        assert_eq!(VoiceProvider::OpenAiTts.credential_key(), CredentialKey::OpenAi);
        assert_eq!(VoiceProvider::ElevenLabs.credential_key(), CredentialKey::ElevenLabs);
        assert_eq!(GenerationProvider::Claude.credential_key(), CredentialKey::Anthropic);
    }

    #[test]
    fn test_provider_roundtrip() {
        for p in [
            GenerationProvider::OpenAi,
            GenerationProvider::Claude,
            GenerationProvider::Gemini,
        ] {
            let parsed: GenerationProvider = p.to_string().parse().unwrap();
            assert_eq!(p, parsed);
        }
        for v in [VoiceProvider::OpenAiTts, VoiceProvider::ElevenLabs] {
            let parsed: VoiceProvider = v.to_string().parse().unwrap();
            assert_eq!(v, parsed);
        }
    }

    #[test]
    fn test_agent_deserializes_with_defaults() {
        let json = r#"{"name":"Ada","description":"logician","provider":"openai"}"#;
        let agent: Agent = serde_json::from_str(json).unwrap();
        assert!(agent.enabled);
        assert_eq!(agent.voice_provider, VoiceProvider::OpenAiTts);
        assert!(agent.voice_id.is_none());
        assert!((agent.temperature - 0.9).abs() < f64::EPSILON);
    }
}
