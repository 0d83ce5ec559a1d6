//! Speech provider implementations.
//!
//! - `openai`: OpenAI `audio/speech`
//! - `elevenlabs`: ElevenLabs text-to-speech
//!
//! [`RoutingSpeechClient`] is the [`SpeechClient`] the orchestrator holds.
//! A turn without a voice or without the voice provider's key simply has no
//! audio; that is `Ok(None)`, never an error.

pub mod elevenlabs;
pub mod openai;

use std::sync::Arc;

use tracing::{Instrument, debug, info_span};

use roundtable_core::credential::CredentialSource;
use roundtable_core::speech::client::SpeechClient;
use roundtable_observe::genai_attrs::{OP_SPEECH, PROVIDER_ELEVENLABS, PROVIDER_OPENAI};
use roundtable_types::agent::VoiceProvider;
use roundtable_types::error::ProviderError;
use roundtable_types::speech::SpeechRequest;

use crate::http::{SPEECH_TIMEOUT, build_http_client};

use self::elevenlabs::ElevenLabsSpeech;
use self::openai::OpenAiSpeech;

/// Base URLs for each speech backend.
#[derive(Debug, Clone)]
pub struct SpeechEndpoints {
    pub openai: String,
    pub elevenlabs: String,
}

impl Default for SpeechEndpoints {
    fn default() -> Self {
        Self {
            openai: openai::DEFAULT_BASE_URL.to_string(),
            elevenlabs: elevenlabs::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Speech client that routes each request to its voice provider.
pub struct RoutingSpeechClient {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialSource>,
    endpoints: SpeechEndpoints,
}

impl RoutingSpeechClient {
    /// Create a client with the default endpoints and a 30 s call timeout.
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Result<Self, ProviderError> {
        Ok(Self {
            http: build_http_client(SPEECH_TIMEOUT)?,
            credentials,
            endpoints: SpeechEndpoints::default(),
        })
    }

    pub fn with_endpoints(mut self, endpoints: SpeechEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

fn model_for(provider: VoiceProvider) -> &'static str {
    match provider {
        VoiceProvider::OpenAiTts => openai::MODEL,
        VoiceProvider::ElevenLabs => elevenlabs::MODEL,
    }
}

fn provider_attr(provider: VoiceProvider) -> &'static str {
    match provider {
        VoiceProvider::OpenAiTts => PROVIDER_OPENAI,
        VoiceProvider::ElevenLabs => PROVIDER_ELEVENLABS,
    }
}

impl SpeechClient for RoutingSpeechClient {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Option<Vec<u8>>, ProviderError> {
        if request.voice_id.trim().is_empty() || request.text.trim().is_empty() {
            return Ok(None);
        }
        let Some(api_key) = self.credentials.credential_for(request.provider.credential_key()) else {
            debug!(provider = %request.provider, "no speech credential; skipping synthesis");
            return Ok(None);
        };

        let model = model_for(request.provider);
        let span = info_span!(
            "gen_ai.speech",
            otel.name = %format!("{OP_SPEECH} {model}"),
            gen_ai.operation.name = OP_SPEECH,
            gen_ai.provider.name = provider_attr(request.provider),
            gen_ai.request.model = model,
            chars = request.text.chars().count(),
        );

        let audio = async {
            match request.provider {
                VoiceProvider::OpenAiTts => {
                    OpenAiSpeech::new(self.http.clone(), api_key)
                        .with_base_url(&self.endpoints.openai)
                        .synthesize(request)
                        .await
                }
                VoiceProvider::ElevenLabs => {
                    ElevenLabsSpeech::new(self.http.clone(), api_key)
                        .with_base_url(&self.endpoints.elevenlabs)
                        .synthesize(request)
                        .await
                }
            }
        }
        .instrument(span)
        .await?;

        debug!(provider = %request.provider, bytes = audio.len(), "speech synthesized");
        Ok((!audio.is_empty()).then_some(audio))
    }
}
