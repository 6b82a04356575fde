use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Comment, CommentId, SortPreference};

/// Failure of a single gateway exchange.
///
/// The variants exist for diagnostics only; callers treat them alike.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

pub type GatewayResult<T> = Result<T, TransportError>;

/// Remote source of truth for comments.
///
/// Each call is exactly one request/response exchange: no caching, no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentGateway: Send + Sync {
    /// Comments in the order the server returns for `sort`.
    async fn list(&self, sort: SortPreference) -> GatewayResult<Vec<Comment>>;
    async fn create(&self, text: &str) -> GatewayResult<Comment>;
    async fn update(&self, id: CommentId, text: &str) -> GatewayResult<Comment>;
    async fn delete(&self, id: CommentId) -> GatewayResult<()>;
}
