//! Shared application state for command handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use roundtable_infra::config::{load_config, resolve_config_path};
use roundtable_infra::secret::{CredentialChain, build_credential_chain};
use roundtable_types::config::RoundtableConfig;

/// Loaded configuration plus the credential chain built from it.
pub struct AppState {
    pub config: RoundtableConfig,
    pub config_path: PathBuf,
    pub credentials: Arc<CredentialChain>,
}

impl AppState {
    /// Load `explicit` (or the default config path) and resolve credentials
    /// from the environment first, then the file.
    pub async fn init(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = resolve_config_path(explicit)?;
        let config = load_config(&config_path).await?;
        let credentials = Arc::new(build_credential_chain(&config, true));

        debug!(
            path = %config_path.display(),
            agents = config.agents.len(),
            "application state initialized"
        );

        Ok(Self {
            config,
            config_path,
            credentials,
        })
    }
}
