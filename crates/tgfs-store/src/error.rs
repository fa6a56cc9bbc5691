use std::io;

use tgfs_bot::BotError;
use tgfs_types::TypeError;

use crate::ops::Operation;
use crate::reader::ReadCancelled;

/// Errors from store and object operations.
///
/// Nothing is retried or downgraded inside the store; each failure keeps its
/// kind so the caller can choose a retry policy.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The platform rejected the bot credentials.
    #[error("authentication failed: {0}")]
    Authentication(#[source] BotError),

    /// Credentials were accepted but the destination chat could not be
    /// determined.
    #[error("cannot resolve destination chat: {0}")]
    Resolution(#[source] BotError),

    /// Declared upload size is above the attachment ceiling.
    #[error("{declared} bytes exceeds the {limit} byte attachment limit")]
    SizeLimitExceeded { declared: u64, limit: u64 },

    /// The attachment does not exist (never did, or was deleted).
    #[error("object not found: {0}")]
    NotFound(String),

    /// The operation has no counterpart in a chat.
    #[error("{0} is not supported by the telegram backend")]
    Unsupported(Operation),

    /// The remote path is not of the form `/<attachment id>`.
    #[error("invalid remote path: {0}")]
    InvalidPath(#[from] TypeError),

    /// The platform call failed for a network or protocol reason.
    #[error("{operation} failed: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: BotError,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
}

impl StoreError {
    /// Classify a session failure raised while performing `operation`.
    pub(crate) fn from_session(operation: Operation, err: BotError) -> Self {
        match err {
            BotError::NotFound(detail) => Self::NotFound(detail),
            // The session can only resolve identifiers it issued itself.
            BotError::InvalidIdentifier(id) => Self::NotFound(id),
            err @ BotError::Unauthorized(_) => Self::Authentication(err),
            other => Self::Transport {
                operation,
                source: other,
            },
        }
    }

    /// Classify a failed read from an [`ObjectReader`](crate::ObjectReader).
    pub fn from_read(err: io::Error) -> Self {
        if err.get_ref().is_some_and(|e| e.is::<ReadCancelled>()) {
            return Self::Cancelled;
        }
        Self::Transport {
            operation: Operation::Open,
            source: BotError::Io(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_not_found_stays_not_found() {
        let err = StoreError::from_session(
            Operation::Open,
            BotError::NotFound("invalid file_id".into()),
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn foreign_identifier_is_not_found() {
        let err = StoreError::from_session(
            Operation::NewObject,
            BotError::InvalidIdentifier("BQACAgIAAx".into()),
        );
        match err {
            StoreError::NotFound(id) => assert_eq!(id, "BQACAgIAAx"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn failed_read_is_transport_unless_cancelled() {
        let err = StoreError::from_read(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(matches!(
            err,
            StoreError::Transport {
                operation: Operation::Open,
                source: BotError::Io(_),
            }
        ));
        assert!(StoreError::from_read(io::Error::other(ReadCancelled)).is_cancelled());
    }

    #[test]
    fn other_session_failures_are_transport() {
        let err = StoreError::from_session(
            Operation::Remove,
            BotError::Api {
                code: 429,
                description: "Too Many Requests".into(),
            },
        );
        match err {
            StoreError::Transport { operation, .. } => assert_eq!(operation, Operation::Remove),
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn revoked_token_is_authentication() {
        let err = StoreError::from_session(Operation::Put, BotError::Unauthorized("revoked".into()));
        assert!(matches!(err, StoreError::Authentication(_)));
    }
}
