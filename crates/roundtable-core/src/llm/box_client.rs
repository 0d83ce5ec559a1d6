//! BoxGenerationClient -- object-safe dynamic dispatch wrapper for GenerationClient.
//!
//! 1. Define an object-safe `GenerationClientDyn` trait with boxed futures
//! 2. Blanket-impl `GenerationClientDyn` for all `T: GenerationClient`
//! 3. `BoxGenerationClient` wraps `Box<dyn GenerationClientDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use roundtable_types::error::ProviderError;
use roundtable_types::llm::GenerationRequest;

use super::client::GenerationClient;

/// Object-safe version of [`GenerationClient`] with boxed futures.
pub trait GenerationClientDyn: Send + Sync {
    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;
}

impl<T: GenerationClient> GenerationClientDyn for T {
    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(self.generate(request))
    }
}

/// Type-erased generation client.
///
/// Since `GenerationClient` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxGenerationClient` provides the same method by delegating to
/// the inner `GenerationClientDyn` trait object.
pub struct BoxGenerationClient {
    inner: Box<dyn GenerationClientDyn + Send + Sync>,
}

impl BoxGenerationClient {
    /// Wrap a concrete `GenerationClient` in a type-erased box.
    pub fn new<T: GenerationClient + 'static>(client: T) -> Self {
        Self {
            inner: Box::new(client),
        }
    }

    /// Produce the next utterance for the assembled context window.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.inner.generate_boxed(request).await
    }
}

impl std::fmt::Debug for BoxGenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxGenerationClient").finish_non_exhaustive()
    }
}
