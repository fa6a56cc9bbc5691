use std::pin::Pin;

use async_trait::async_trait;
use tgfs_types::{AttachmentId, AttachmentMeta, ChatId, SentAttachment};
use tokio::io::AsyncRead;

use crate::error::BotResult;

/// Body of an upload. Callers bound it to the declared size before handing
/// it over.
pub type UploadBody = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// Byte stream of a downloaded attachment.
pub type AttachmentReader = Pin<Box<dyn AsyncRead + Send>>;

/// An authenticated session with the chat platform.
///
/// Implementations must be safe for concurrent use: the store shares one
/// session across every in-flight call and adds no locking of its own.
///
/// Every method distinguishes three outcomes: success,
/// [`BotError::NotFound`](crate::BotError::NotFound), and any other failure.
#[async_trait]
pub trait BotSession: Send + Sync {
    /// Authenticate and resolve the chat uploads are sent to.
    async fn resolve_destination(&self) -> BotResult<ChatId>;

    /// Send `body` (exactly `size` bytes) as a document captioned `caption`.
    async fn send_document(
        &self,
        destination: ChatId,
        caption: &str,
        body: UploadBody,
        size: u64,
    ) -> BotResult<SentAttachment>;

    /// Metadata of an existing attachment. Does not download content.
    async fn file_meta(&self, id: &AttachmentId) -> BotResult<AttachmentMeta>;

    /// Open the content of an attachment for streaming.
    async fn download(&self, id: &AttachmentId) -> BotResult<AttachmentReader>;

    /// Delete the message carrying an attachment.
    async fn delete(&self, destination: ChatId, id: &AttachmentId) -> BotResult<()>;
}
