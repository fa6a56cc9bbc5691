//! Wire types for the subset of the Telegram Bot API tgfs uses.
//!
//! Every Bot API method answers with the same envelope:
//! `{"ok": true, "result": ...}` or
//! `{"ok": false, "error_code": 400, "description": "..."}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tgfs_types::AttachmentId;

use crate::error::{BotError, BotResult};

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<i64>,
    pub description: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the result, classifying failures. `status` is the HTTP status,
    /// used when the envelope carries no error code.
    pub fn into_result(self, status: u16) -> BotResult<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(BotError::Decode("ok response without result".into())),
            (false, _) => Err(classify(
                self.error_code.unwrap_or(i64::from(status)),
                self.description.unwrap_or_default(),
            )),
        }
    }
}

/// Map a Bot API error to a [`BotError`].
///
/// The Bot API reports missing messages and files as generic 400s; only the
/// description tells them apart from other bad requests.
pub fn classify(code: i64, description: String) -> BotError {
    let lower = description.to_ascii_lowercase();
    match code {
        401 => BotError::Unauthorized(description),
        404 => BotError::NotFound(description),
        400 if lower.contains("not found")
            || lower.contains("invalid file_id")
            || lower.contains("wrong file_id") =>
        {
            BotError::NotFound(description)
        }
        _ => BotError::Api { code, description },
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Unix seconds.
    pub date: i64,
    pub chat: Chat,
    pub document: Option<Document>,
}

impl Message {
    pub fn sent_at(&self) -> BotResult<DateTime<Utc>> {
        unix_seconds(self.date)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_unique_id: String,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_unique_id: String,
    pub file_size: Option<u64>,
    /// Present while the file is downloadable (at least one hour after
    /// `getFile`).
    pub file_path: Option<String>,
}

impl File {
    /// Filename component of `file_path`, e.g. `file_7.txt` for
    /// `documents/file_7.txt`.
    pub fn stored_name(&self) -> Option<&str> {
        self.file_path
            .as_deref()
            .and_then(|p| p.rsplit('/').next())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct GetChat<'a> {
    pub chat_id: ChatTarget<'a>,
}

#[derive(Debug, Serialize)]
pub struct GetFile<'a> {
    pub file_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct DeleteMessage {
    pub chat_id: i64,
    pub message_id: i64,
}

/// `chat_id` parameter: the Bot API accepts an integer or an `@username`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatTarget<'a> {
    Id(i64),
    Username(&'a str),
}

impl<'a> ChatTarget<'a> {
    pub fn parse(raw: &'a str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Username(raw.trim()),
        }
    }
}

/// Identifier layout this client issues: `<message_id>:<file_id>`.
///
/// `deleteMessage` needs the message id while `getFile` needs the file id,
/// and the store only keeps one opaque identifier, so both travel together.
/// File ids are URL-safe base64 and never contain `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub message_id: i64,
    pub file_id: String,
}

impl DocumentRef {
    pub fn to_attachment_id(&self) -> AttachmentId {
        AttachmentId::new(format!("{}:{}", self.message_id, self.file_id))
    }

    pub fn from_attachment_id(id: &AttachmentId) -> BotResult<Self> {
        let invalid = || BotError::InvalidIdentifier(id.to_string());
        let (message, file) = id.as_str().split_once(':').ok_or_else(invalid)?;
        let message_id = message.parse().map_err(|_| invalid())?;
        if file.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            message_id,
            file_id: file.to_string(),
        })
    }
}

fn unix_seconds(secs: i64) -> BotResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| BotError::Decode(format!("timestamp out of range: {secs}")))
}
