use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier the chat platform issues for a sent attachment.
///
/// The store never looks inside it. Only the bot client that minted an
/// identifier knows its structure.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(String);

impl AttachmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttachmentId({})", self.0)
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttachmentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AttachmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Acknowledgment for a successfully sent attachment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentAttachment {
    /// Identifier of the stored file.
    pub id: AttachmentId,
    /// Send time stamped by the platform on the carrying message.
    pub sent_at: DateTime<Utc>,
    /// Size the platform reports for the stored file, if it reports one.
    pub reported_size: Option<u64>,
}

/// Metadata the platform reports for an existing attachment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub id: AttachmentId,
    /// Filename as stored by the platform.
    pub name: String,
    pub size: u64,
    /// Not every platform call reports a timestamp (Telegram's `getFile`
    /// does not), so this is optional.
    pub sent_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_identifier() {
        let id = AttachmentId::new("42:BQACAgIAAxkBAAI");
        assert_eq!(id.to_string(), "42:BQACAgIAAxkBAAI");
        assert_eq!(format!("{id:?}"), "AttachmentId(42:BQACAgIAAxkBAAI)");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = AttachmentId::from("doc-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"doc-1\"");
        let back: AttachmentId = serde_json::from_str("\"doc-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn empty_identifier_detected() {
        assert!(AttachmentId::new("").is_empty());
        assert!(!AttachmentId::new("x").is_empty());
    }
}
