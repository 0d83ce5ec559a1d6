use thiserror::Error;

use crate::agent::CredentialKey;
use crate::conversation::ConversationStatus;

/// Reasons `start()` or `intervene()` refuse to act.
///
/// Raised synchronously; no session state is mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("enter a topic first")]
    MissingTopic,

    #[error("at least 2 agents with a name and description are required (found {eligible})")]
    NotEnoughAgents { eligible: usize },

    #[error("add an API key for: {}", join_names(.providers))]
    MissingCredentials { providers: Vec<CredentialKey> },

    #[error("a conversation is already {status}")]
    AlreadyActive { status: ConversationStatus },

    #[error("interjection text is empty")]
    EmptyInterjection,
}

fn join_names(providers: &[CredentialKey]) -> String {
    providers
        .iter()
        .map(|p| p.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from remote generation and speech providers.
///
/// The orchestrator treats every variant of a generation error as one
/// "generation failed" signal but reports the message upstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Missing or rejected credential.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The provider rejected or could not serve the request.
    #[error("{0}")]
    Provider(String),

    /// The request never completed (connect, timeout, body read).
    #[error("network error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// The provider-supplied text without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Auth(m) | ProviderError::Provider(m) | ProviderError::Transport(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_lists_vendors() {
        let err = ValidationError::MissingCredentials {
            providers: vec![CredentialKey::OpenAi, CredentialKey::Anthropic],
        };
        assert_eq!(err.to_string(), "add an API key for: OpenAI, Anthropic Claude");
    }

    #[test]
    fn test_not_enough_agents_display() {
        let err = ValidationError::NotEnoughAgents { eligible: 1 };
        assert!(err.to_string().contains("found 1"));
    }

    #[test]
    fn test_provider_error_message() {
        let err = ProviderError::Provider("OpenAI: model not found".to_string());
        assert_eq!(err.to_string(), "OpenAI: model not found");
        assert_eq!(err.message(), "OpenAI: model not found");

        let err = ProviderError::Transport("timed out".to_string());
        assert_eq!(err.to_string(), "network error: timed out");
    }
}
