//! Bot session configuration.
//!
//! Two settings are required: the bot token and the destination chat. Both
//! are opaque strings here. The chat may be a numeric id or an `@username`;
//! it is resolved to a numeric id when the session connects.

use std::path::Path;

use serde::Deserialize;
use url::Url;

/// Public Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default timeout for metadata calls, in seconds. Uploads and downloads are
/// bounded by their size rather than by this timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for a Telegram bot session.
///
/// Custom `Debug` implementation redacts the `token` field.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot token as issued by @BotFather.
    pub token: String,
    /// Destination chat: numeric id or `@username`.
    pub chat_id: String,
    /// Bot API base URL. Point this at a self-hosted Bot API server to lift
    /// the public server's 50 MB upload cap.
    pub api_url: Url,
    /// Timeout for metadata calls in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChatRef {
    Numeric(i64),
    Text(String),
}

impl ChatRef {
    fn into_string(self) -> String {
        match self {
            Self::Numeric(id) => id.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    token: Option<String>,
    chat_id: Option<ChatRef>,
    api_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl BotConfig {
    /// Configuration with default endpoint and timeout.
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            token: token.into(),
            chat_id: chat_id.into(),
            api_url: parse_url("api_url", DEFAULT_API_URL)?,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        };
        config.validate()?;
        Ok(config)
    }

    /// Use a different Bot API endpoint.
    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TGFS_TOKEN` (required)
    /// - `TGFS_CHAT_ID` (required)
    /// - `TGFS_API_URL` (default: `https://api.telegram.org`)
    /// - `TGFS_TIMEOUT_SECS` (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = get("TGFS_TOKEN").ok_or(ConfigError::MissingToken)?;
        let chat_id = get("TGFS_CHAT_ID").ok_or(ConfigError::MissingChatId)?;
        let api_url = match get("TGFS_API_URL") {
            Some(raw) => parse_url("TGFS_API_URL", &raw)?,
            None => parse_url("api_url", DEFAULT_API_URL)?,
        };
        let timeout_secs = match get("TGFS_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let config = Self {
            token,
            chat_id,
            api_url,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration document.
    ///
    /// ```toml
    /// token = "123456:ABC-DEF"
    /// chat_id = -1001234567890
    /// api_url = "http://localhost:8081"   # optional
    /// timeout_secs = 30                   # optional
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(s)?;
        let api_url = match file.api_url {
            Some(raw) => parse_url("api_url", &raw)?,
            None => parse_url("api_url", DEFAULT_API_URL)?,
        };
        let config = Self {
            token: file.token.ok_or(ConfigError::MissingToken)?,
            chat_id: file
                .chat_id
                .map(ChatRef::into_string)
                .ok_or(ConfigError::MissingChatId)?,
            api_url,
            timeout_secs: file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.chat_id.trim().is_empty() {
            return Err(ConfigError::MissingChatId);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("0".into()));
        }
        Ok(())
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(field.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("bot token is required (TGFS_TOKEN or `token`)")]
    MissingToken,
    #[error("destination chat is required (TGFS_CHAT_ID or `chat_id`)")]
    MissingChatId,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}
