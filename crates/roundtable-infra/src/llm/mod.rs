//! Generation provider implementations.
//!
//! - `openai`: OpenAI Chat Completions
//! - `anthropic`: Anthropic Messages API
//! - `gemini`: Google Gemini `generateContent`
//!
//! [`RoutingGenerationClient`] is the single [`GenerationClient`] the
//! orchestrator holds; it looks up the agent's provider key on every call and
//! dispatches to the matching backend.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{Instrument, Span, debug, info_span};

use roundtable_core::credential::CredentialSource;
use roundtable_core::llm::client::GenerationClient;
use roundtable_observe::genai_attrs::{
    GEN_AI_RESPONSE_FINISH_REASONS, GEN_AI_USAGE_INPUT_TOKENS, GEN_AI_USAGE_OUTPUT_TOKENS, OP_CHAT,
    PROVIDER_ANTHROPIC, PROVIDER_GEMINI, PROVIDER_OPENAI,
};
use roundtable_types::agent::GenerationProvider;
use roundtable_types::error::ProviderError;
use roundtable_types::llm::{ChatMessage, ChatRole, GenerationRequest};

use crate::http::{GENERATION_TIMEOUT, build_http_client};

use self::anthropic::AnthropicChat;
use self::gemini::GeminiChat;
use self::openai::OpenAiChat;

/// Placeholder first turn when a history opens with the agent's own line.
pub(crate) const CONVERSATION_STARTS: &str = "[Conversation starts]";

/// Sole turn sent when there is no history at all.
pub(crate) const START_CONVERSATION: &str = "Start the conversation.";

/// Trailing turn for providers that need the last word to be the user's.
pub(crate) const CONTINUE_CONVERSATION: &str = "[Continue the conversation]";

/// Text and usage data from one provider call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub finish_reason: Option<String>,
}

impl Completion {
    /// Fail with a provider error when the reply carries no text.
    pub(crate) fn non_empty(self, vendor: &str) -> Result<Self, ProviderError> {
        if self.text.trim().is_empty() {
            Err(ProviderError::Provider(format!("{vendor}: empty response")))
        } else {
            Ok(self)
        }
    }
}

/// A history turn after same-role merging.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Turn {
    pub role: ChatRole,
    pub text: String,
}

impl Turn {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }
}

/// Reshape `messages` into strictly alternating turns that open with the
/// user, as Claude and Gemini require.
///
/// Anything that is not an assistant turn counts as user. Consecutive turns
/// of the same role are merged with a newline.
pub(crate) fn alternating_turns(messages: &[ChatMessage]) -> Vec<Turn> {
    let mut turns: Vec<Turn> = Vec::new();
    for message in messages {
        let role = match message.role {
            ChatRole::Assistant => ChatRole::Assistant,
            ChatRole::User | ChatRole::System => ChatRole::User,
        };
        match turns.last_mut() {
            Some(last) if last.role == role => {
                last.text.push('\n');
                last.text.push_str(&message.content);
            }
            _ => turns.push(Turn {
                role,
                text: message.content.clone(),
            }),
        }
    }

    match turns.first() {
        None => turns.push(Turn::user(START_CONVERSATION)),
        Some(first) if first.role != ChatRole::User => {
            turns.insert(0, Turn::user(CONVERSATION_STARTS));
        }
        Some(_) => {}
    }
    turns
}

/// Base URLs for each generation backend.
#[derive(Debug, Clone)]
pub struct LlmEndpoints {
    pub openai: String,
    pub anthropic: String,
    pub gemini: String,
}

impl Default for LlmEndpoints {
    fn default() -> Self {
        Self {
            openai: openai::DEFAULT_BASE_URL.to_string(),
            anthropic: anthropic::DEFAULT_BASE_URL.to_string(),
            gemini: gemini::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Generation client that routes each request to its provider's backend.
pub struct RoutingGenerationClient {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialSource>,
    endpoints: LlmEndpoints,
}

impl RoutingGenerationClient {
    /// Create a client with the default endpoints and a 60 s call timeout.
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Result<Self, ProviderError> {
        Ok(Self {
            http: build_http_client(GENERATION_TIMEOUT)?,
            credentials,
            endpoints: LlmEndpoints::default(),
        })
    }

    /// Override the base URLs (proxies, local gateways).
    pub fn with_endpoints(mut self, endpoints: LlmEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    fn api_key(&self, provider: GenerationProvider) -> Result<SecretString, ProviderError> {
        let key = provider.credential_key();
        self.credentials.credential_for(key).ok_or_else(|| {
            ProviderError::Auth(format!("no API key configured for {}", key.display_name()))
        })
    }

    async fn dispatch(&self, request: &GenerationRequest) -> Result<Completion, ProviderError> {
        let api_key = self.api_key(request.provider)?;
        match request.provider {
            GenerationProvider::OpenAi => {
                OpenAiChat::new(self.http.clone(), api_key)
                    .with_base_url(&self.endpoints.openai)
                    .complete(request)
                    .await
            }
            GenerationProvider::Claude => {
                AnthropicChat::new(self.http.clone(), api_key)
                    .with_base_url(&self.endpoints.anthropic)
                    .complete(request)
                    .await
            }
            GenerationProvider::Gemini => {
                GeminiChat::new(self.http.clone(), api_key)
                    .with_base_url(&self.endpoints.gemini)
                    .complete(request)
                    .await
            }
        }
    }
}

impl std::fmt::Debug for RoutingGenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingGenerationClient")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl GenerationClient for RoutingGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let span = chat_span(request);
        let completion = self.dispatch(request).instrument(span.clone()).await?;
        record_usage(&span, &completion);
        debug!(
            provider = %request.provider,
            model = %request.model,
            chars = completion.text.len(),
            "generation complete"
        );
        Ok(completion.text)
    }
}

fn provider_attr(provider: GenerationProvider) -> &'static str {
    match provider {
        GenerationProvider::OpenAi => PROVIDER_OPENAI,
        GenerationProvider::Claude => PROVIDER_ANTHROPIC,
        GenerationProvider::Gemini => PROVIDER_GEMINI,
    }
}

fn chat_span(request: &GenerationRequest) -> Span {
    info_span!(
        "gen_ai.chat",
        otel.name = %format!("{OP_CHAT} {}", request.model),
        gen_ai.operation.name = OP_CHAT,
        gen_ai.provider.name = provider_attr(request.provider),
        gen_ai.request.model = %request.model,
        gen_ai.request.max_tokens = request.max_tokens(),
        gen_ai.request.temperature = request.clamped_temperature(),
        gen_ai.usage.input_tokens = tracing::field::Empty,
        gen_ai.usage.output_tokens = tracing::field::Empty,
        gen_ai.response.finish_reasons = tracing::field::Empty,
    )
}

fn record_usage(span: &Span, completion: &Completion) {
    if let Some(tokens) = completion.input_tokens {
        span.record(GEN_AI_USAGE_INPUT_TOKENS, tokens);
    }
    if let Some(tokens) = completion.output_tokens {
        span.record(GEN_AI_USAGE_OUTPUT_TOKENS, tokens);
    }
    if let Some(reason) = completion.finish_reason.as_deref() {
        span.record(GEN_AI_RESPONSE_FINISH_REASONS, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_core::credential::StaticCredentials;
    use roundtable_types::conversation::LengthLevel;

    fn request(provider: GenerationProvider) -> GenerationRequest {
        GenerationRequest {
            provider,
            model: provider.default_model().to_string(),
            system: "You are Ada.".to_string(),
            messages: vec![ChatMessage::user("[Topic announced] chess")],
            length_level: LengthLevel::new(2),
            temperature: 0.9,
        }
    }

    #[test]
    fn test_empty_history_becomes_start() {
        let turns = alternating_turns(&[]);
        assert_eq!(turns, vec![Turn::user(START_CONVERSATION)]);
    }

    #[test]
    fn test_leading_assistant_gets_placeholder() {
        let turns = alternating_turns(&[ChatMessage::assistant("I opened."), ChatMessage::user("[Bo]: ok")]);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0], Turn::user(CONVERSATION_STARTS));
        assert_eq!(turns[1].role, ChatRole::Assistant);
        assert_eq!(turns[2].role, ChatRole::User);
    }

    #[test]
    fn test_consecutive_same_role_merged() {
        let turns = alternating_turns(&[
            ChatMessage::user("[Topic announced] chess"),
            ChatMessage::user("[Bo]: e4"),
            ChatMessage::user("[Moderator]: faster"),
            ChatMessage::assistant("d5"),
        ]);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text, "[Topic announced] chess\n[Bo]: e4\n[Moderator]: faster");
        assert_eq!(turns[1].text, "d5");
    }

    #[test]
    fn test_system_role_counts_as_user() {
        let turns = alternating_turns(&[ChatMessage {
            role: ChatRole::System,
            content: "note".to_string(),
        }]);
        assert_eq!(turns, vec![Turn::user("note")]);
    }

    #[test]
    fn test_empty_completion_is_provider_error() {
        let completion = Completion {
            text: "  ".to_string(),
            ..Completion::default()
        };
        assert_eq!(
            completion.non_empty("Gemini").unwrap_err(),
            ProviderError::Provider("Gemini: empty response".to_string())
        );
    }

    #[test]
    fn test_debug_hides_credentials() {
        let creds: Arc<dyn CredentialSource> =
            Arc::new(StaticCredentials::new().with(roundtable_types::agent::CredentialKey::OpenAi, "sk-hidden"));
        let client = RoutingGenerationClient::new(creds).unwrap();

        let debug = format!("{client:?}");
        assert!(debug.starts_with("RoutingGenerationClient"));
        assert!(debug.contains(openai::DEFAULT_BASE_URL));
        assert!(!debug.contains("sk-hidden"));
    }

    #[tokio::test]
    async fn test_missing_key_is_auth_error() {
        let creds: Arc<dyn CredentialSource> =
            Arc::new(StaticCredentials::new().with(roundtable_types::agent::CredentialKey::OpenAi, "sk-1"));
        let client = RoutingGenerationClient::new(creds).unwrap();

        let err = client.generate(&request(GenerationProvider::Claude)).await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::Auth("no API key configured for Anthropic Claude".to_string())
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let creds: Arc<dyn CredentialSource> =
            Arc::new(StaticCredentials::new().with(roundtable_types::agent::CredentialKey::Gemini, "g-1"));
        let client = RoutingGenerationClient::new(creds)
            .unwrap()
            .with_endpoints(LlmEndpoints {
                gemini: "http://127.0.0.1:9".to_string(),
                ..LlmEndpoints::default()
            });

        let err = client.generate(&request(GenerationProvider::Gemini)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(m) if m.starts_with("Gemini:")));
    }
}
