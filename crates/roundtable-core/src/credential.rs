//! Credential lookup boundary.
//!
//! The orchestrator only asks "is there a key for this provider?" when
//! validating `start()` and when deciding whether to request speech. The
//! provider clients ask for the key itself.

use std::collections::BTreeMap;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use roundtable_types::agent::CredentialKey;

/// Read-only lookup of API keys by provider.
pub trait CredentialSource: Send + Sync {
    /// The key for `key`, or `None` when none is configured.
    ///
    /// Implementations treat blank values as absent.
    fn credential_for(&self, key: CredentialKey) -> Option<SecretString>;

    fn has_credential(&self, key: CredentialKey) -> bool {
        self.credential_for(key).is_some()
    }
}

impl<T: CredentialSource + ?Sized> CredentialSource for Arc<T> {
    fn credential_for(&self, key: CredentialKey) -> Option<SecretString> {
        (**self).credential_for(key)
    }
}

/// In-memory credential map.
#[derive(Default)]
pub struct StaticCredentials {
    keys: BTreeMap<CredentialKey, SecretString>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a key. Blank values are ignored.
    pub fn with(mut self, key: CredentialKey, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: CredentialKey, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            return;
        }
        self.keys.insert(key, SecretString::from(value.trim().to_string()));
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl CredentialSource for StaticCredentials {
    fn credential_for(&self, key: CredentialKey) -> Option<SecretString> {
        self.keys
            .get(&key)
            .filter(|v| !v.expose_secret().is_empty())
            .map(|v| SecretString::from(v.expose_secret()))
    }
}

// Keys never reach Debug output.
impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("providers", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_absent() {
        let creds = StaticCredentials::new()
            .with(CredentialKey::OpenAi, "sk-1")
            .with(CredentialKey::Gemini, "   ");
        assert!(creds.has_credential(CredentialKey::OpenAi));
        assert!(!creds.has_credential(CredentialKey::Gemini));
        assert_eq!(creds.len(), 1);
    }

    #[test]
    fn test_debug_hides_values() {
        let creds = StaticCredentials::new().with(CredentialKey::OpenAi, "sk-secret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("OpenAi"));
    }

    #[test]
    fn test_arc_delegates() {
        let creds: Arc<dyn CredentialSource> =
            Arc::new(StaticCredentials::new().with(CredentialKey::ElevenLabs, "el-key"));
        let key = creds.credential_for(CredentialKey::ElevenLabs).unwrap();
        assert_eq!(key.expose_secret(), "el-key");
    }
}
