//! GenerationClient trait definition.
//!
//! This is the boundary every text-generation backend implements. Uses
//! RPITIT for `generate`; see [`super::box_client::BoxGenerationClient`] for
//! the type-erased form the orchestrator holds.

use roundtable_types::error::ProviderError;
use roundtable_types::llm::GenerationRequest;

/// Trait for text-generation backends (OpenAI, Claude, Gemini, fakes).
///
/// Implementations are expected to bound their own network time; the
/// orchestrator never cancels a call, it only discards late results.
pub trait GenerationClient: Send + Sync {
    /// Produce the next utterance for the assembled context window.
    ///
    /// Errors carry the provider's message verbatim so it can be shown to
    /// the user.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;
}
