//! Global configuration loader for Parley.
//!
//! Reads `config.toml` from the data directory (`~/.parley/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use parley_types::config::GlobalConfig;

const CONFIG_FILE: &str = "config.toml";

/// Errors from persisting the global configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            GlobalConfig::default()
        }
    }
}

/// Write `config` to `{data_dir}/config.toml`, creating the directory.
pub async fn save_global_config(data_dir: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(config)?;
    tokio::fs::create_dir_all(data_dir).await?;
    tokio::fs::write(config_path(data_dir), text).await?;
    tracing::debug!(dir = %data_dir.display(), "saved config.toml");
    Ok(())
}

/// Record `provider` as the last successfully used backend.
///
/// Re-reads the file first so concurrent edits to other keys survive.
pub async fn record_last_used_provider(data_dir: &Path, provider: &str) -> Result<(), ConfigError> {
    let mut config = load_global_config(data_dir).await;
    if config.last_used_provider.as_deref() == Some(provider) {
        return Ok(());
    }
    config.last_used_provider = Some(provider.to_string());
    save_global_config(data_dir, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config, GlobalConfig::default());
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            config_path(tmp.path()),
            r#"
default_provider = "groq"
orchestration_timeout_secs = 60

[[models]]
id = "local-coder"
provider = "ollama"
context_length = 65536
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.default_provider.as_deref(), Some("groq"));
        assert_eq!(config.orchestration_timeout_secs, 60);
        assert_eq!(config.orchestration_max_attempts, 8);
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].context_length, 65536);
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(config_path(tmp.path()), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config, GlobalConfig::default());
    }

    #[tokio::test]
    async fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let data_dir = tmp.path().join("nested");
        let config = GlobalConfig {
            default_provider: Some("deepseek".to_string()),
            request_timeout_secs: 30,
            ..GlobalConfig::default()
        };

        save_global_config(&data_dir, &config).await.unwrap();
        assert_eq!(load_global_config(&data_dir).await, config);
    }

    #[tokio::test]
    async fn record_last_used_keeps_other_keys() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(config_path(tmp.path()), "default_provider = \"openai\"\n")
            .await
            .unwrap();

        record_last_used_provider(tmp.path(), "ollama").await.unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.default_provider.as_deref(), Some("openai"));
        assert_eq!(config.last_used_provider.as_deref(), Some("ollama"));
    }
}
