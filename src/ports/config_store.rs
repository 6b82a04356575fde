use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    ReadError(String),

    #[error("Failed to write configuration: {0}")]
    WriteError(String),

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/comments/";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the comments collection, e.g. `http://host/api/comments/`.
    pub api_url: String,
    pub request_timeout_seconds: u64,
    /// Re-fetch the whole list after a create instead of prepending the new comment.
    pub refetch_after_create: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_seconds: 30,
            refetch_after_create: false,
        }
    }
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load_config(&self) -> ConfigResult<AppConfig>;
    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()>;
}
