use thiserror::Error;

/// Errors from chat-platform calls.
#[derive(Debug, Error)]
pub enum BotError {
    /// The platform rejected the bot credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The referenced chat, message, or file does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The platform answered with an error envelope.
    #[error("api error {code}: {description}")]
    Api { code: i64, description: String },

    /// An identifier this session did not mint.
    #[error("malformed attachment identifier: {0}")]
    InvalidIdentifier(String),

    /// The platform answered with something that is not a valid response.
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

pub type BotResult<T> = Result<T, BotError>;
