//! Environment variable credential source.
//!
//! Reads `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `GEMINI_API_KEY` and
//! `ELEVENLABS_API_KEY`, optionally behind a prefix (`RT_OPENAI_API_KEY`).

use secrecy::SecretString;

use roundtable_core::credential::CredentialSource;
use roundtable_types::agent::CredentialKey;

/// Read-only credential source backed by the process environment.
///
/// Looked up on every call, so keys exported after start-up are seen.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialSource {
    prefix: String,
}

impl EnvCredentialSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `{prefix}{VAR}` instead of `{VAR}`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The variable consulted for `key`.
    pub fn var_name(&self, key: CredentialKey) -> String {
        format!("{}{}", self.prefix, key.env_var())
    }
}

impl CredentialSource for EnvCredentialSource {
    fn credential_for(&self, key: CredentialKey) -> Option<SecretString> {
        match std::env::var(self.var_name(key)) {
            Ok(val) if !val.trim().is_empty() => Some(SecretString::from(val.trim().to_string())),
            // Unset, blank, or not valid Unicode: treat as absent.
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_env_source_reads_prefixed_var() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("RT_TEST_ENV_A_OPENAI_API_KEY", "  sk-env-123 ") };

        let source = EnvCredentialSource::with_prefix("RT_TEST_ENV_A_");
        let key = source.credential_for(CredentialKey::OpenAi).unwrap();
        assert_eq!(key.expose_secret(), "sk-env-123");
        assert!(!source.has_credential(CredentialKey::Gemini));

        // SAFETY: the variable was set above by this test only.
        unsafe { std::env::remove_var("RT_TEST_ENV_A_OPENAI_API_KEY") };
    }

    #[test]
    fn test_env_source_blank_is_absent() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("RT_TEST_ENV_B_ELEVENLABS_API_KEY", "   ") };

        let source = EnvCredentialSource::with_prefix("RT_TEST_ENV_B_");
        assert!(source.credential_for(CredentialKey::ElevenLabs).is_none());

        // SAFETY: the variable was set above by this test only.
        unsafe { std::env::remove_var("RT_TEST_ENV_B_ELEVENLABS_API_KEY") };
    }

    #[test]
    fn test_var_name() {
        assert_eq!(EnvCredentialSource::new().var_name(CredentialKey::Anthropic), "ANTHROPIC_API_KEY");
        assert_eq!(
            EnvCredentialSource::with_prefix("RT_").var_name(CredentialKey::Gemini),
            "RT_GEMINI_API_KEY"
        );
    }
}
