//! Anthropic Messages API backend.
//!
//! Claude takes the system prompt as a top-level field and insists on a
//! strictly alternating history that opens with a user turn.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use roundtable_types::error::ProviderError;
use roundtable_types::llm::{ChatRole, GenerationRequest};

use super::{Completion, alternating_turns};
use crate::http::{join_url, read_json, send};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// The Anthropic API version header value.
const API_VERSION: &str = "2023-06-01";

const VENDOR: &str = "Claude";

#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: ChatRole,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

pub(crate) fn messages_body(request: &GenerationRequest) -> MessagesRequest {
    let messages = alternating_turns(&request.messages)
        .into_iter()
        .map(|turn| AnthropicMessage {
            role: turn.role,
            content: turn.text,
        })
        .collect();

    let system = request.system.trim();
    MessagesRequest {
        model: request.model.clone(),
        max_tokens: request.max_tokens(),
        messages,
        temperature: request.clamped_temperature(),
        system: (!system.is_empty()).then(|| request.system.clone()),
    }
}

fn into_completion(response: MessagesResponse) -> Completion {
    let text = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect::<String>();
    Completion {
        text,
        input_tokens: response.usage.as_ref().map(|u| u.input_tokens),
        output_tokens: response.usage.as_ref().map(|u| u.output_tokens),
        finish_reason: response.stop_reason,
    }
}

/// One-shot Messages API client for a single API key.
pub struct AnthropicChat {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl AnthropicChat {
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
        let body = messages_body(request);
        let response = send(
            VENDOR,
            self.client
                .post(join_url(&self.base_url, "/v1/messages"))
                .header("x-api-key", self.api_key.expose_secret())
                .header("anthropic-version", API_VERSION)
                .json(&body),
        )
        .await?;

        let parsed: MessagesResponse = read_json(VENDOR, response).await?;
        into_completion(parsed).non_empty(VENDOR)
    }
}

// AnthropicChat intentionally does NOT derive Debug.
