//! Credential chain builder -- wires concrete sources in priority order.
//!
//! Default chain order: `[EnvCredentialSource, ConfigCredentialSource]`

use std::sync::Arc;

use secrecy::SecretString;

use roundtable_core::credential::CredentialSource;
use roundtable_types::agent::CredentialKey;
use roundtable_types::config::RoundtableConfig;

use super::env::EnvCredentialSource;
use super::file::ConfigCredentialSource;

/// Ordered list of sources; the first one with a key wins.
#[derive(Clone, Default)]
pub struct CredentialChain {
    sources: Vec<Arc<dyn CredentialSource>>,
}

impl CredentialChain {
    pub fn new(sources: Vec<Arc<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl CredentialSource for CredentialChain {
    fn credential_for(&self, key: CredentialKey) -> Option<SecretString> {
        self.sources.iter().find_map(|s| s.credential_for(key))
    }
}

impl std::fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialChain")
            .field("sources", &self.sources.len())
            .finish()
    }
}

/// Build the default credential resolution chain.
///
/// Ordered by precedence (first match wins):
/// 1. Environment variables (if `include_env` is true)
/// 2. The config file's `[credentials]` table
pub fn build_credential_chain(config: &RoundtableConfig, include_env: bool) -> CredentialChain {
    let mut chain: Vec<Arc<dyn CredentialSource>> = Vec::new();

    if include_env {
        chain.push(Arc::new(EnvCredentialSource::new()));
    }

    chain.push(Arc::new(ConfigCredentialSource::from_config(config)));

    CredentialChain::new(chain)
}
