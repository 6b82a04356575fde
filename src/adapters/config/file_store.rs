use crate::ports::{AppConfig, ConfigError, ConfigResult, ConfigStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const APP_DIR_NAME: &str = "comment-hub";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    api_url: Option<String>,
    request_timeout_seconds: Option<u64>,
    refetch_after_create: Option<bool>,
}

pub struct FileConfigStore {
    config_path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> ConfigResult<Self> {
        Ok(Self::in_dir(app_config_dir()?))
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            config_path: dir.as_ref().join("config.json"),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    async fn ensure_config_dir(&self) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }
        Ok(())
    }
}

/// Per-user directory holding `config.json` and `preferences.json`.
pub fn app_config_dir() -> ConfigResult<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        ConfigError::ReadError("Cannot determine config directory".to_string())
    })?;
    Ok(config_dir.join(APP_DIR_NAME))
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load_config(&self) -> ConfigResult<AppConfig> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "No config file at {}, using defaults",
                    self.config_path.display()
                );
                return Ok(AppConfig::default());
            }
            Err(e) => return Err(ConfigError::ReadError(e.to_string())),
        };

        let config_file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        let defaults = AppConfig::default();
        Ok(AppConfig {
            api_url: config_file.api_url.unwrap_or(defaults.api_url),
            request_timeout_seconds: config_file
                .request_timeout_seconds
                .unwrap_or(defaults.request_timeout_seconds),
            refetch_after_create: config_file
                .refetch_after_create
                .unwrap_or(defaults.refetch_after_create),
        })
    }

    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()> {
        self.ensure_config_dir().await?;

        let config_file = ConfigFile {
            api_url: Some(config.api_url.clone()),
            request_timeout_seconds: Some(config.request_timeout_seconds),
            refetch_after_create: Some(config.refetch_after_create),
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::in_dir(dir.path().join("nested"));

        let config = store.load_config().await.unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::in_dir(dir.path().join("nested"));

        let config = AppConfig {
            api_url: "http://example.test/api/comments/".to_string(),
            request_timeout_seconds: 5,
            refetch_after_create: true,
        };
        store.save_config(&config).await.unwrap();

        assert_eq!(store.load_config().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::in_dir(dir.path());
        std::fs::write(store.config_path(), r#"{ "request_timeout_seconds": 10 }"#).unwrap();

        let config = store.load_config().await.unwrap();
        assert_eq!(config.request_timeout_seconds, 10);
        assert_eq!(config.api_url, AppConfig::default().api_url);
        assert!(!config.refetch_after_create);
    }

    #[tokio::test]
    async fn test_malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::in_dir(dir.path());
        std::fs::write(store.config_path(), "{ not json").unwrap();

        let err = store.load_config().await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat(_)));
    }
}
