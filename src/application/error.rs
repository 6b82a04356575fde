use crate::domain::{CommentId, DomainError};
use crate::ports::{ConfigError, TransportError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Another change to comment {0} is still in progress")]
    MutationInFlight(CommentId),
}

pub type AppResult<T> = Result<T, AppError>;
