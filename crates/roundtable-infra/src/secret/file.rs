//! Credentials from the `[credentials]` table of the config file.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use roundtable_core::credential::CredentialSource;
use roundtable_types::agent::CredentialKey;
use roundtable_types::config::RoundtableConfig;

/// Keys copied out of a loaded [`RoundtableConfig`].
///
/// Unknown provider names in the table are ignored with a warning.
#[derive(Default)]
pub struct ConfigCredentialSource {
    keys: BTreeMap<CredentialKey, SecretString>,
}

impl ConfigCredentialSource {
    pub fn from_config(config: &RoundtableConfig) -> Self {
        for name in config.credentials.keys() {
            if name.parse::<CredentialKey>().is_err() {
                warn!(provider = %name, "ignoring credential for unknown provider");
            }
        }

        let keys = CredentialKey::ALL
            .into_iter()
            .filter_map(|key| {
                config
                    .credential(key)
                    .map(|value| (key, SecretString::from(value.to_string())))
            })
            .collect();
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl CredentialSource for ConfigCredentialSource {
    fn credential_for(&self, key: CredentialKey) -> Option<SecretString> {
        self.keys
            .get(&key)
            .map(|v| SecretString::from(v.expose_secret()))
    }
}

impl std::fmt::Debug for ConfigCredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCredentialSource")
            .field("providers", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> RoundtableConfig {
        RoundtableConfig {
            credentials: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..RoundtableConfig::default()
        }
    }

    #[test]
    fn test_reads_known_providers() {
        let source = ConfigCredentialSource::from_config(&config(&[
            ("openai", "sk-file"),
            ("claude", "ant-file"),
            ("gemini", ""),
            ("mistral", "nope"),
        ]));
        assert_eq!(
            source.credential_for(CredentialKey::OpenAi).unwrap().expose_secret(),
            "sk-file"
        );
        assert!(source.has_credential(CredentialKey::Anthropic));
        assert!(!source.has_credential(CredentialKey::Gemini));
        assert!(!source.has_credential(CredentialKey::ElevenLabs));
    }

    #[test]
    fn test_debug_hides_values() {
        let source = ConfigCredentialSource::from_config(&config(&[("elevenlabs", "el-secret")]));
        let debug = format!("{source:?}");
        assert!(!debug.contains("el-secret"));
        assert!(debug.contains("ElevenLabs"));
    }
}
