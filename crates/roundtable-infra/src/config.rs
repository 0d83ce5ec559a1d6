//! Configuration loader for Roundtable.
//!
//! Reads `roundtable.toml` (`~/.roundtable/roundtable.toml` unless a path is
//! given) into [`RoundtableConfig`]. A missing file means defaults; a file
//! that exists but does not parse is an error.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use roundtable_types::config::RoundtableConfig;

/// Directory under the home directory holding Roundtable's files.
pub const CONFIG_DIR_NAME: &str = ".roundtable";

/// File name of the config inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "roundtable.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot determine the home directory; pass --config explicitly")]
    NoHomeDir,
}

/// `~/.roundtable/roundtable.toml`, if a home directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolve an explicit path or fall back to the default location.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path().ok_or(ConfigError::NoHomeDir),
    }
}

/// Load configuration from `path`.
///
/// - Missing file: [`RoundtableConfig::default()`] (no agents, no keys).
/// - Unreadable or malformed file: [`ConfigError`].
pub async fn load_config(path: &Path) -> Result<RoundtableConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("No config found at {}, using defaults", path.display());
            return Ok(RoundtableConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let config: RoundtableConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        path = %path.display(),
        agents = config.agents.len(),
        "loaded config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_types::agent::{CredentialKey, GenerationProvider};
    use roundtable_types::conversation::TurnMode;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILE_NAME)).await.unwrap();
        assert!(config.agents.is_empty());
        assert_eq!(config.conversation.context_size, 20);
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(
            &path,
            r#"
[conversation]
turn_mode = "random"
context_size = 8

[credentials]
gemini = "g-key"

[[agents]]
name = "Ada"
description = "A patient logician"
provider = "gemini"

[[agents]]
name = "Bo"
description = "A loud skeptic"
provider = "openai"
model = "gpt-4o"
"#,
        )
        .await
        .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.conversation.turn_mode, TurnMode::Random);
        assert_eq!(config.conversation.context_size, 8);
        assert_eq!(config.agents.len(), 2);
        assert_eq!(config.agents[0].provider, GenerationProvider::Gemini);
        assert_eq!(config.agents[1].effective_model(), "gpt-4o");
        assert_eq!(config.credential(CredentialKey::Gemini), Some("g-key"));
    }

    #[tokio::test]
    async fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(&path, "this is not { valid toml !!!").await.unwrap();

        let err = load_config(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[tokio::test]
    async fn load_config_unknown_provider_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(
            &path,
            "[[agents]]\nname = \"X\"\ndescription = \"y\"\nprovider = \"mistral\"\n",
        )
        .await
        .unwrap();

        assert!(matches!(load_config(&path).await, Err(ConfigError::Parse { .. })));
    }

    #[tokio::test]
    async fn load_config_directory_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn resolve_explicit_path_wins() {
        let path = resolve_config_path(Some(Path::new("/tmp/rt.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/rt.toml"));
    }
}
