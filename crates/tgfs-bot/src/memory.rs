use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use tgfs_types::{AttachmentId, AttachmentMeta, ChatId, SentAttachment};
use tokio::io::AsyncReadExt;

use crate::error::{BotError, BotResult};
use crate::traits::{AttachmentReader, BotSession, UploadBody};

#[derive(Clone)]
struct Attachment {
    name: String,
    data: Vec<u8>,
    sent_at: DateTime<Utc>,
}

/// Number of calls made to each [`BotSession`] method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub resolve: usize,
    pub send: usize,
    pub meta: usize,
    pub download: usize,
    pub delete: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.resolve + self.send + self.meta + self.download + self.delete
    }
}

#[derive(Default)]
struct Counters {
    resolve: AtomicUsize,
    send: AtomicUsize,
    meta: AtomicUsize,
    download: AtomicUsize,
    delete: AtomicUsize,
}

/// In-memory chat session.
///
/// Intended for tests and embedding. Attachments live in a `HashMap` behind a
/// `RwLock`; deleting one removes it entirely, so later lookups report
/// not-found the way a deleted message does. Every trait call is counted,
/// including calls that fail.
pub struct InMemoryBot {
    destination: Option<ChatId>,
    authorized: bool,
    failing: AtomicBool,
    latency: Option<Duration>,
    next_id: AtomicU64,
    attachments: RwLock<HashMap<AttachmentId, Attachment>>,
    counters: Counters,
}

impl InMemoryBot {
    /// A session whose destination resolves to `destination`.
    pub fn new(destination: ChatId) -> Self {
        Self {
            destination: Some(destination),
            authorized: true,
            failing: AtomicBool::new(false),
            latency: None,
            next_id: AtomicU64::new(1),
            attachments: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// A session whose credentials are rejected.
    pub fn unauthorized() -> Self {
        Self {
            authorized: false,
            ..Self::new(ChatId::new(0))
        }
    }

    /// A session that authenticates but cannot find its destination chat.
    pub fn without_destination() -> Self {
        Self {
            destination: None,
            ..Self::new(ChatId::new(0))
        }
    }

    /// Delay every call by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// While set, every call fails with a 502 API error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of the call counters.
    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            resolve: c.resolve.load(Ordering::SeqCst),
            send: c.send.load(Ordering::SeqCst),
            meta: c.meta.load(Ordering::SeqCst),
            download: c.download.load(Ordering::SeqCst),
            delete: c.delete.load(Ordering::SeqCst),
        }
    }

    /// Number of attachments currently stored.
    pub fn len(&self) -> usize {
        self.attachments.read().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.attachments.read().expect("lock poisoned").is_empty()
    }

    /// Raw bytes of a stored attachment.
    pub fn contents(&self, id: &AttachmentId) -> Option<Vec<u8>> {
        self.attachments
            .read()
            .expect("lock poisoned")
            .get(id)
            .map(|a| a.data.clone())
    }

    /// Delete an attachment behind the store's back, as another chat member
    /// deleting the message would.
    pub fn delete_out_of_band(&self, id: &AttachmentId) -> bool {
        self.attachments
            .write()
            .expect("lock poisoned")
            .remove(id)
            .is_some()
    }

    async fn enter(&self, counter: &AtomicUsize) -> BotResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(BotError::Api {
                code: 502,
                description: "Bad Gateway".into(),
            });
        }
        if !self.authorized {
            return Err(BotError::Unauthorized("Unauthorized".into()));
        }
        Ok(())
    }

    fn lookup(&self, id: &AttachmentId) -> BotResult<Attachment> {
        self.attachments
            .read()
            .expect("lock poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| BotError::NotFound(format!("Bad Request: invalid file_id {id}")))
    }
}

impl Default for InMemoryBot {
    fn default() -> Self {
        Self::new(ChatId::new(-1_000_000_000_001))
    }
}

impl std::fmt::Debug for InMemoryBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBot")
            .field("destination", &self.destination)
            .field("attachment_count", &self.len())
            .field("calls", &self.calls())
            .finish()
    }
}

#[async_trait]
impl BotSession for InMemoryBot {
    async fn resolve_destination(&self) -> BotResult<ChatId> {
        self.enter(&self.counters.resolve).await?;
        self.destination
            .ok_or_else(|| BotError::NotFound("Bad Request: chat not found".into()))
    }

    async fn send_document(
        &self,
        destination: ChatId,
        caption: &str,
        mut body: UploadBody,
        size: u64,
    ) -> BotResult<SentAttachment> {
        self.enter(&self.counters.send).await?;
        if Some(destination) != self.destination {
            return Err(BotError::NotFound("Bad Request: chat not found".into()));
        }
        let mut data = Vec::new();
        body.read_to_end(&mut data).await?;
        if data.len() as u64 != size {
            return Err(BotError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("body ended after {} of {size} bytes", data.len()),
            )));
        }

        let seq = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = AttachmentId::new(format!("{seq}:doc-{seq:06}"));
        // Messages carry whole-second timestamps.
        let sent_at = Utc::now().trunc_subsecs(0);
        self.attachments.write().expect("lock poisoned").insert(
            id.clone(),
            Attachment {
                name: caption.to_string(),
                data,
                sent_at,
            },
        );
        Ok(SentAttachment {
            id,
            sent_at,
            reported_size: Some(size),
        })
    }

    async fn file_meta(&self, id: &AttachmentId) -> BotResult<AttachmentMeta> {
        self.enter(&self.counters.meta).await?;
        let attachment = self.lookup(id)?;
        Ok(AttachmentMeta {
            id: id.clone(),
            name: attachment.name,
            size: attachment.data.len() as u64,
            sent_at: Some(attachment.sent_at),
        })
    }

    async fn download(&self, id: &AttachmentId) -> BotResult<AttachmentReader> {
        self.enter(&self.counters.download).await?;
        let attachment = self.lookup(id)?;
        Ok(Box::pin(io::Cursor::new(attachment.data)))
    }

    async fn delete(&self, destination: ChatId, id: &AttachmentId) -> BotResult<()> {
        self.enter(&self.counters.delete).await?;
        if Some(destination) != self.destination {
            return Err(BotError::NotFound("Bad Request: chat not found".into()));
        }
        if self.delete_out_of_band(id) {
            Ok(())
        } else {
            Err(BotError::NotFound(
                "Bad Request: message to delete not found".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(bytes: &'static [u8]) -> UploadBody {
        Box::new(bytes)
    }

    #[tokio::test]
    async fn send_then_fetch_and_download() {
        let bot = InMemoryBot::new(ChatId::new(-42));
        let sent = bot
            .send_document(ChatId::new(-42), "a.txt", body(b"hello"), 5)
            .await
            .unwrap();

        let meta = bot.file_meta(&sent.id).await.unwrap();
        assert_eq!(meta.name, "a.txt");
        assert_eq!(meta.size, 5);
        assert_eq!(meta.sent_at, Some(sent.sent_at));

        let mut reader = bot.download(&sent.id).await.unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"hello");
    }

    #[tokio::test]
    async fn identifiers_are_unique_per_send() {
        let bot = InMemoryBot::new(ChatId::new(1));
        let a = bot.send_document(ChatId::new(1), "x", body(b"1"), 1).await.unwrap();
        let b = bot.send_document(ChatId::new(1), "x", body(b"1"), 1).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(bot.len(), 2);
    }

    #[tokio::test]
    async fn short_body_is_rejected() {
        let bot = InMemoryBot::new(ChatId::new(1));
        let err = bot
            .send_document(ChatId::new(1), "x", body(b"abc"), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Io(_)));
        assert!(bot.is_empty());
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let bot = InMemoryBot::new(ChatId::new(1));
        let sent = bot.send_document(ChatId::new(1), "x", body(b"1"), 1).await.unwrap();
        bot.delete(ChatId::new(1), &sent.id).await.unwrap();
        assert!(bot.delete(ChatId::new(1), &sent.id).await.unwrap_err().is_not_found());
        assert!(bot.download(&sent.id).await.err().unwrap().is_not_found());
    }

    #[tokio::test]
    async fn unauthorized_session_rejects_everything() {
        let bot = InMemoryBot::unauthorized();
        assert!(bot.resolve_destination().await.unwrap_err().is_unauthorized());
        assert_eq!(bot.calls().resolve, 1);
    }

    #[tokio::test]
    async fn missing_destination_is_not_found() {
        let bot = InMemoryBot::without_destination();
        assert!(bot.resolve_destination().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn failing_mode_and_counters() {
        let bot = InMemoryBot::new(ChatId::new(1));
        bot.set_failing(true);
        let err = bot.file_meta(&AttachmentId::new("1:x")).await.unwrap_err();
        assert!(matches!(err, BotError::Api { code: 502, .. }));
        bot.set_failing(false);
        let _ = bot.file_meta(&AttachmentId::new("1:x")).await;
        assert_eq!(
            bot.calls(),
            CallCounts {
                meta: 2,
                ..CallCounts::default()
            }
        );
        assert_eq!(bot.calls().total(), 2);
    }
}
