use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("remote path must start with '/': {0:?}")]
    MissingSeparator(String),

    #[error("remote path has no attachment identifier: {0:?}")]
    EmptyIdentifier(String),

    #[error("remote path is nested, directories are not supported: {0:?}")]
    Nested(String),

    #[error("invalid chat id: {0:?}")]
    InvalidChatId(String),
}
