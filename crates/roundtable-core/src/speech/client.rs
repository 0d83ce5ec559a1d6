use std::future::Future;
use std::pin::Pin;

use roundtable_types::error::ProviderError;
use roundtable_types::speech::SpeechRequest;

/// Trait for speech-synthesis backends (OpenAI TTS, ElevenLabs, fakes).
pub trait SpeechClient: Send + Sync {
    /// Synthesize `request.text` with the requested voice.
    ///
    /// `Ok(None)` means "no audio for this turn" (no credential or no voice
    /// configured) and is not an error.
    fn synthesize(
        &self,
        request: &SpeechRequest,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, ProviderError>> + Send;
}

/// Object-safe version of [`SpeechClient`] with boxed futures.
pub trait SpeechClientDyn: Send + Sync {
    fn synthesize_boxed<'a>(
        &'a self,
        request: &'a SpeechRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>, ProviderError>> + Send + 'a>>;
}

impl<T: SpeechClient> SpeechClientDyn for T {
    fn synthesize_boxed<'a>(
        &'a self,
        request: &'a SpeechRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>, ProviderError>> + Send + 'a>> {
        Box::pin(self.synthesize(request))
    }
}

/// Type-erased speech client.
pub struct BoxSpeechClient {
    inner: Box<dyn SpeechClientDyn + Send + Sync>,
}

impl BoxSpeechClient {
    pub fn new<T: SpeechClient + 'static>(client: T) -> Self {
        Self {
            inner: Box::new(client),
        }
    }

    pub async fn synthesize(
        &self,
        request: &SpeechRequest,
    ) -> Result<Option<Vec<u8>>, ProviderError> {
        self.inner.synthesize_boxed(request).await
    }
}

impl std::fmt::Debug for BoxSpeechClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxSpeechClient").finish_non_exhaustive()
    }
}
