//! Google Gemini `generateContent` backend.
//!
//! Same alternation rules as Claude, plus Gemini wants the history to end on
//! a user turn and calls the assistant role `model`.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use roundtable_types::error::ProviderError;
use roundtable_types::llm::{ChatRole, GenerationRequest};

use super::{CONTINUE_CONVERSATION, Completion, Turn, alternating_turns};
use crate::http::{join_url, read_json, send};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const VENDOR: &str = "Gemini";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}

fn gemini_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::Assistant => "model",
        ChatRole::User | ChatRole::System => "user",
    }
}

pub(crate) fn generate_body(request: &GenerationRequest) -> GenerateContentRequest {
    let mut turns = alternating_turns(&request.messages);
    if turns.last().is_some_and(|t| t.role != ChatRole::User) {
        turns.push(Turn {
            role: ChatRole::User,
            text: CONTINUE_CONVERSATION.to_string(),
        });
    }

    let contents = turns
        .into_iter()
        .map(|turn| Content {
            role: Some(gemini_role(turn.role).to_string()),
            parts: vec![Part { text: turn.text }],
        })
        .collect();

    let system_instruction = (!request.system.trim().is_empty()).then(|| SystemInstruction {
        parts: vec![Part {
            text: request.system.clone(),
        }],
    });

    GenerateContentRequest {
        contents,
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens(),
            temperature: request.clamped_temperature(),
        },
        system_instruction,
    }
}

fn into_completion(response: GenerateContentResponse) -> Completion {
    let (text, finish_reason) = response
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            let text = candidate
                .content
                .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
                .unwrap_or_default();
            (text, candidate.finish_reason)
        })
        .unwrap_or_default();
    Completion {
        text,
        input_tokens: response.usage_metadata.as_ref().and_then(|u| u.prompt_token_count),
        output_tokens: response
            .usage_metadata
            .as_ref()
            .and_then(|u| u.candidates_token_count),
        finish_reason,
    }
}

/// One-shot `generateContent` client for a single API key.
///
/// Gemini authenticates with a `key` query parameter; the URL is never
/// logged.
pub struct GeminiChat {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiChat {
    pub fn new(client: reqwest::Client, api_key: SecretString) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub async fn complete(&self, request: &GenerationRequest) -> Result<Completion, ProviderError> {
        let body = generate_body(request);
        let path = format!("/v1beta/models/{}:generateContent", request.model);
        let key = self.api_key.expose_secret();
        let parsed: Result<GenerateContentResponse, ProviderError> = async {
            let response = send(
                VENDOR,
                self.client
                    .post(join_url(&self.base_url, &path))
                    .query(&[("key", key)])
                    .json(&body),
            )
            .await?;
            read_json(VENDOR, response).await
        }
        .await;

        let parsed = parsed.map_err(|e| redact_key(e, key))?;
        into_completion(parsed).non_empty(VENDOR)
    }
}

/// reqwest errors carry the request URL, which here includes the key.
fn redact_key(err: ProviderError, key: &str) -> ProviderError {
    if key.is_empty() {
        return err;
    }
    match err {
        ProviderError::Auth(m) => ProviderError::Auth(m.replace(key, "***")),
        ProviderError::Provider(m) => ProviderError::Provider(m.replace(key, "***")),
        ProviderError::Transport(m) => ProviderError::Transport(m.replace(key, "***")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::parse_body;
    use crate::llm::START_CONVERSATION;
    use roundtable_types::agent::GenerationProvider;
    use roundtable_types::conversation::LengthLevel;
    use roundtable_types::llm::ChatMessage;

    fn request(messages: Vec<ChatMessage>) -> GenerationRequest {
        GenerationRequest {
            provider: GenerationProvider::Gemini,
            model: "gemini-2.0-flash".to_string(),
            system: "You are Cy.".to_string(),
            messages,
            length_level: LengthLevel::new(1),
            temperature: 0.5,
        }
    }

    #[test]
    fn test_body_shape() {
        let json = serde_json::to_value(generate_body(&request(vec![ChatMessage::user("hi")]))).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 50);
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "You are Cy.");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_assistant_maps_to_model_and_user_closes() {
        let json = serde_json::to_value(generate_body(&request(vec![
            ChatMessage::user("[Topic announced] rain"),
            ChatMessage::assistant("I like rain."),
        ])))
        .unwrap();
        let contents = json["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], CONTINUE_CONVERSATION);
    }

    #[test]
    fn test_empty_history() {
        let json = serde_json::to_value(generate_body(&request(vec![]))).unwrap();
        let contents = json["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["parts"][0]["text"], START_CONVERSATION);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Rain is "}, {"text": "overrated."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16}
        }"#;
        let parsed: GenerateContentResponse = parse_body(VENDOR, body).unwrap();
        let completion = into_completion(parsed);
        assert_eq!(completion.text, "Rain is overrated.");
        assert_eq!(completion.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(completion.input_tokens, Some(12));
    }

    #[test]
    fn test_blocked_prompt_has_no_text() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let parsed: GenerateContentResponse = parse_body(VENDOR, body).unwrap();
        assert!(into_completion(parsed).non_empty(VENDOR).is_err());
    }

    #[test]
    fn test_redact_key() {
        let err = ProviderError::Transport("Gemini: error sending request for url (https://x/?key=abc123)".to_string());
        let redacted = redact_key(err, "abc123");
        assert_eq!(
            redacted,
            ProviderError::Transport("Gemini: error sending request for url (https://x/?key=***)".to_string())
        );
    }
}
