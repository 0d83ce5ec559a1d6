//! ElevenLabs text-to-speech backend.
//!
//! ElevenLabs ignores the speed hint; voice character comes from the fixed
//! stability / similarity settings below.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use roundtable_types::error::ProviderError;
use roundtable_types::speech::SpeechRequest;

use crate::http::{read_bytes, send};

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

pub const MODEL: &str = "eleven_multilingual_v2";

const VENDOR: &str = "ElevenLabs";

#[derive(Debug, Serialize)]
pub(crate) struct TextToSpeechBody<'a> {
    text: &'a str,
    model_id: &'static str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f64,
    similarity_boost: f64,
}

pub(crate) fn tts_body(request: &SpeechRequest) -> TextToSpeechBody<'_> {
    TextToSpeechBody {
        text: &request.text,
        model_id: MODEL,
        voice_settings: VoiceSettings {
            stability: 0.5,
            similarity_boost: 0.75,
        },
    }
}

/// `{base}/v1/text-to-speech/{voice_id}` with the voice id percent-encoded.
pub(crate) fn tts_url(base_url: &str, voice_id: &str) -> Result<reqwest::Url, ProviderError> {
    let mut url = reqwest::Url::parse(base_url)
        .map_err(|e| ProviderError::Provider(format!("{VENDOR}: invalid base URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ProviderError::Provider(format!("{VENDOR}: invalid base URL: {base_url}")))?
        .pop_if_empty()
        .extend(["v1", "text-to-speech", voice_id.trim()]);
    Ok(url)
}

pub struct ElevenLabsSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl ElevenLabsSpeech {
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

    /// MPEG audio bytes for `request.text`.
    pub async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        let url = tts_url(&self.base_url, &request.voice_id)?;
        let response = send(
            VENDOR,
            self.client
                .post(url)
                .header("xi-api-key", self.api_key.expose_secret())
                .header(reqwest::header::ACCEPT, "audio/mpeg")
                .json(&tts_body(request)),
        )
        .await?;
        read_bytes(VENDOR, response).await
    }
}
