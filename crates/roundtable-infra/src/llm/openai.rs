//! OpenAI Chat Completions backend.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use roundtable_types::error::ProviderError;
use roundtable_types::llm::{ChatRole, GenerationRequest};

use super::Completion;
use crate::http::{join_url, read_json, send};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const VENDOR: &str = "OpenAI";

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: ChatRole,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

/// Shape a request: the system prompt first, then the history as-is.
pub(crate) fn chat_body(request: &GenerationRequest) -> ChatCompletionRequest<'_> {
    let system = (!request.system.trim().is_empty()).then(|| WireMessage {
        role: ChatRole::System,
        content: request.system.as_str(),
    });
    let messages = system
        .into_iter()
        .chain(request.messages.iter().map(|m| WireMessage {
            role: m.role,
            content: m.content.as_str(),
        }))
        .collect();

    ChatCompletionRequest {
        model: &request.model,
        messages,
        max_tokens: request.max_tokens(),
        temperature: request.clamped_temperature(),
    }
}

fn into_completion(response: ChatCompletionResponse) -> Completion {
    let (text, finish_reason) = response
        .choices
        .into_iter()
        .next()
        .map(|c| (c.message.content.unwrap_or_default(), c.finish_reason))
        .unwrap_or_default();
    Completion {
        text,
        input_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
        output_tokens: response.usage.as_ref().map(|u| u.completion_tokens),
        finish_reason,
    }
}

/// One-shot chat client for a single API key.
///
/// The key is only exposed when building the `Authorization` header.
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiChat {
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
        let body = chat_body(request);
        let response = send(
            VENDOR,
            self.client
                .post(join_url(&self.base_url, "/v1/chat/completions"))
                .bearer_auth(self.api_key.expose_secret())
                .json(&body),
        )
        .await?;

        let parsed: ChatCompletionResponse = read_json(VENDOR, response).await?;
        into_completion(parsed).non_empty(VENDOR)
    }
}
