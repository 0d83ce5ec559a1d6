//! OpenAI text-to-speech backend.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use roundtable_types::error::ProviderError;
use roundtable_types::speech::SpeechRequest;

use crate::http::{join_url, read_bytes, send};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub const MODEL: &str = "gpt-4o-mini-tts";

const VENDOR: &str = "OpenAI TTS";

/// The speed range the endpoint accepts.
const MIN_SPEED: f64 = 0.25;
const MAX_SPEED: f64 = 4.0;

#[derive(Debug, Serialize)]
pub(crate) struct SpeechBody<'a> {
    model: &'static str,
    input: &'a str,
    voice: &'a str,
    speed: f64,
    response_format: &'static str,
}

pub(crate) fn speech_body(request: &SpeechRequest) -> SpeechBody<'_> {
    SpeechBody {
        model: MODEL,
        input: &request.text,
        voice: request.voice_id.trim(),
        speed: request.speed.clamp(MIN_SPEED, MAX_SPEED),
        response_format: "mp3",
    }
}

pub struct OpenAiSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiSpeech {
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

    /// MP3 bytes for `request.text`.
    pub async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        let response = send(
            VENDOR,
            self.client
                .post(join_url(&self.base_url, "/v1/audio/speech"))
                .bearer_auth(self.api_key.expose_secret())
                .json(&speech_body(request)),
        )
        .await?;
        read_bytes(VENDOR, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_types::agent::VoiceProvider;

    #[test]
    fn test_body_carries_speed_hint() {
        let request = SpeechRequest {
            text: "Good evening.".to_string(),
            provider: VoiceProvider::OpenAiTts,
            voice_id: " nova ".to_string(),
            speed: 1.25,
        };
        let json = serde_json::to_value(speech_body(&request)).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini-tts");
        assert_eq!(json["input"], "Good evening.");
        assert_eq!(json["voice"], "nova");
        assert_eq!(json["speed"], 1.25);
        assert_eq!(json["response_format"], "mp3");
    }

    #[test]
    fn test_speed_is_clamped() {
        let request = SpeechRequest {
            text: "x".to_string(),
            provider: VoiceProvider::OpenAiTts,
            voice_id: "alloy".to_string(),
            speed: 9.0,
        };
        assert_eq!(speech_body(&request).speed, 4.0);
    }
}
