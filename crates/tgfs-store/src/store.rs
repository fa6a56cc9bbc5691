use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tgfs_bot::{AttachmentReader, BotConfig, BotError, BotResult, BotSession, TelegramBot, UploadBody};
use tgfs_types::{caption_for, AttachmentId, ChatId, RemotePath};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::ops::{HashKind, Operation};

/// Largest attachment the platform accepts: 2 GiB.
pub const MAX_ATTACHMENT_SIZE: u64 = 2 << 30;

/// A chat used as a flat file store.
///
/// Owns the platform session and the destination chat, which is resolved
/// once at construction and never changes. The store keeps no other state:
/// objects are minted on demand by [`put`](Self::put) and
/// [`new_object`](Self::new_object) and borrow the store they came from.
///
/// Every call takes a [`CancellationToken`]. Cancelling it aborts the
/// in-flight platform call and yields [`StoreError::Cancelled`]. Nothing is
/// retried.
pub struct ChatStore {
    name: String,
    session: Arc<dyn BotSession>,
    destination: ChatId,
}

impl ChatStore {
    /// Connect to the Telegram Bot API described by `config`.
    pub async fn connect(
        name: impl Into<String>,
        config: &BotConfig,
        cancel: &CancellationToken,
    ) -> StoreResult<Self> {
        let bot = TelegramBot::new(config).map_err(|source| StoreError::Transport {
            operation: Operation::Connect,
            source,
        })?;
        Self::new(name, Arc::new(bot), cancel).await
    }

    /// Build a store over an existing session, resolving its destination.
    ///
    /// Fails with [`StoreError::Authentication`] if the credentials are
    /// rejected and [`StoreError::Resolution`] for any other failure to
    /// determine the destination. No store exists unless resolution succeeds.
    pub async fn new(
        name: impl Into<String>,
        session: Arc<dyn BotSession>,
        cancel: &CancellationToken,
    ) -> StoreResult<Self> {
        let name = name.into();
        let resolved = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Cancelled),
            r = session.resolve_destination() => r,
        };
        let destination = resolved.map_err(|e| {
            warn!(remote = %name, error = %e, "cannot connect");
            match e {
                e @ BotError::Unauthorized(_) => StoreError::Authentication(e),
                e => StoreError::Resolution(e),
            }
        })?;
        info!(remote = %name, %destination, "connected");
        Ok(Self {
            name,
            session,
            destination,
        })
    }

    /// Name of the remote, as passed at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root of the remote. The chat is flat, so always `/`.
    pub fn root(&self) -> &str {
        "/"
    }

    /// The chat every upload is sent to.
    pub fn destination(&self) -> ChatId {
        self.destination
    }

    /// Checksums this backend can report: none.
    pub fn hashes(&self) -> &'static [HashKind] {
        &[]
    }

    /// Modification time precision. `None`: times cannot be set.
    pub fn precision(&self) -> Option<Duration> {
        None
    }

    /// Operations this backend implements.
    pub fn features(&self) -> Vec<Operation> {
        Operation::supported().collect()
    }

    /// Upload `size` bytes from `input` as an attachment named `remote`.
    ///
    /// At most `size` bytes are read; a longer input is truncated, a shorter
    /// one fails. A single leading `/` is dropped from `remote` since the
    /// chat has captions rather than paths. Sizes above
    /// [`MAX_ATTACHMENT_SIZE`] are rejected before any network call.
    pub async fn put<R>(
        &self,
        cancel: &CancellationToken,
        input: R,
        size: u64,
        remote: &str,
    ) -> StoreResult<StoredObject<'_>>
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        self.upload(Operation::Put, cancel, input, size, remote).await
    }

    /// Streaming upload. The platform needs the full size up front, so this
    /// is the same operation as [`put`](Self::put).
    pub async fn put_stream<R>(
        &self,
        cancel: &CancellationToken,
        input: R,
        size: u64,
        remote: &str,
    ) -> StoreResult<StoredObject<'_>>
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        self.upload(Operation::PutStream, cancel, input, size, remote)
            .await
    }

    async fn upload<R>(
        &self,
        operation: Operation,
        cancel: &CancellationToken,
        input: R,
        size: u64,
        remote: &str,
    ) -> StoreResult<StoredObject<'_>>
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        if size > MAX_ATTACHMENT_SIZE {
            return Err(StoreError::SizeLimitExceeded {
                declared: size,
                limit: MAX_ATTACHMENT_SIZE,
            });
        }
        let caption = caption_for(remote);
        let body: UploadBody = Box::new(input.take(size));
        let sent = self
            .call(
                operation,
                cancel,
                self.session
                    .send_document(self.destination, caption, body, size),
            )
            .await?;
        if let Some(reported) = sent.reported_size.filter(|&r| r != size) {
            warn!(id = %sent.id, declared = size, reported, "platform reports a different size");
        }
        info!(
            destination = %self.destination,
            caption,
            size,
            id = %sent.id,
            "uploaded"
        );
        Ok(StoredObject::uploaded(self, caption, size, sent))
    }

    /// Resolve a remote path of the form `/<attachment id>` to an object.
    ///
    /// Fetches metadata only; content is not downloaded.
    pub async fn new_object(
        &self,
        cancel: &CancellationToken,
        remote: &str,
    ) -> StoreResult<StoredObject<'_>> {
        let path = RemotePath::parse(remote)?;
        let meta = self
            .call(
                Operation::NewObject,
                cancel,
                self.session.file_meta(path.attachment_id()),
            )
            .await?;
        Ok(StoredObject::resolved(self, path, meta))
    }

    /// Alias of [`new_object`](Self::new_object).
    pub async fn stat(
        &self,
        cancel: &CancellationToken,
        remote: &str,
    ) -> StoreResult<StoredObject<'_>> {
        self.new_object(cancel, remote).await
    }

    /// Always fails: a chat has no directories to list. An empty listing
    /// would be indistinguishable from an empty directory.
    pub async fn list(
        &self,
        _cancel: &CancellationToken,
        dir: &str,
    ) -> StoreResult<Vec<StoredObject<'_>>> {
        debug!(dir, "list rejected");
        Err(Operation::List.reject())
    }

    /// Always fails: a chat has no directories.
    pub async fn mkdir(&self, _cancel: &CancellationToken, dir: &str) -> StoreResult<()> {
        debug!(dir, "mkdir rejected");
        Err(Operation::Mkdir.reject())
    }

    /// Always fails: a chat has no directories.
    pub async fn rmdir(&self, _cancel: &CancellationToken, dir: &str) -> StoreResult<()> {
        debug!(dir, "rmdir rejected");
        Err(Operation::Rmdir.reject())
    }

    pub(crate) async fn download(
        &self,
        cancel: &CancellationToken,
        id: &AttachmentId,
    ) -> StoreResult<AttachmentReader> {
        self.call(Operation::Open, cancel, self.session.download(id))
            .await
    }

    pub(crate) async fn delete(
        &self,
        cancel: &CancellationToken,
        id: &AttachmentId,
    ) -> StoreResult<()> {
        self.call(
            Operation::Remove,
            cancel,
            self.session.delete(self.destination, id),
        )
        .await?;
        info!(destination = %self.destination, %id, "removed");
        Ok(())
    }

    /// Run one session call, racing it against `cancel`.
    ///
    /// An already-cancelled token wins before the call is first polled, so
    /// no request is issued.
    async fn call<T>(
        &self,
        operation: Operation,
        cancel: &CancellationToken,
        call: impl Future<Output = BotResult<T>>,
    ) -> StoreResult<T> {
        debug!(%operation, remote = %self.name, "session call");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%operation, "cancelled");
                Err(StoreError::Cancelled)
            }
            result = call => result.map_err(|e| {
                warn!(%operation, error = %e, "session call failed");
                StoreError::from_session(operation, e)
            }),
        }
    }
}

impl fmt::Display for ChatStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Telegram chat {}", self.name)
    }
}

impl fmt::Debug for ChatStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStore")
            .field("name", &self.name)
            .field("destination", &self.destination)
            .finish()
    }
}
