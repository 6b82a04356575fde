use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Comment text cannot be empty")]
    EmptyText,

    #[error("Invalid sort field: {0} (expected `date` or `id`)")]
    InvalidSortField(String),

    #[error("Invalid sort order: {0} (expected `asc` or `desc`)")]
    InvalidSortOrder(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
