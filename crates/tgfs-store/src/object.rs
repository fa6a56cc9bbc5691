use std::fmt;

use chrono::{DateTime, Utc};
use tgfs_types::{AttachmentId, AttachmentMeta, RemotePath, SentAttachment};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::StoreResult;
use crate::ops::{HashKind, Operation};
use crate::reader::ObjectReader;
use crate::store::ChatStore;

/// Where an object's size came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeSource {
    /// Declared by the uploader.
    Declared,
    /// Reported by the platform.
    Reported,
}

/// One file stored as a chat attachment.
///
/// A snapshot of metadata plus a borrow of the [`ChatStore`] that minted it.
/// Objects are never cached: each `put` or `new_object` produces a fresh one.
///
/// Lifecycle: created, then readable any number of times, then removed.
/// After removal, `open` and `remove` fail with whatever the platform says
/// about a deleted message, normally [`StoreError::NotFound`].
///
/// [`StoreError::NotFound`]: crate::StoreError::NotFound
pub struct StoredObject<'s> {
    store: &'s ChatStore,
    path: RemotePath,
    name: String,
    size: u64,
    size_source: SizeSource,
    mod_time: DateTime<Utc>,
}

impl<'s> StoredObject<'s> {
    pub(crate) fn uploaded(store: &'s ChatStore, caption: &str, size: u64, sent: SentAttachment) -> Self {
        let name = caption.rsplit('/').next().unwrap_or(caption).to_string();
        Self {
            store,
            path: RemotePath::from_attachment(sent.id),
            name,
            size,
            size_source: SizeSource::Declared,
            mod_time: sent.sent_at,
        }
    }

    pub(crate) fn resolved(store: &'s ChatStore, path: RemotePath, meta: AttachmentMeta) -> Self {
        let mod_time = meta.sent_at.unwrap_or_else(|| {
            debug!(%path, "no timestamp reported, using epoch");
            DateTime::<Utc>::UNIX_EPOCH
        });
        Self {
            store,
            path,
            name: meta.name,
            size: meta.size,
            size_source: SizeSource::Reported,
            mod_time,
        }
    }

    /// The store this object belongs to.
    pub fn store(&self) -> &'s ChatStore {
        self.store
    }

    /// Remote path, `/<attachment id>`.
    pub fn remote(&self) -> &RemotePath {
        &self.path
    }

    /// Platform identifier of the attachment.
    pub fn attachment_id(&self) -> &AttachmentId {
        self.path.attachment_id()
    }

    /// Display name: the last segment of the uploaded name, or the
    /// platform's stored filename when resolved by path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes; see [`size_source`](Self::size_source) for its origin.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the size was declared by the uploader or reported by the platform.
    pub fn size_source(&self) -> SizeSource {
        self.size_source
    }

    /// Send time of the carrying message.
    pub fn mod_time(&self) -> DateTime<Utc> {
        self.mod_time
    }

    /// Always `false`: a chat holds only files.
    pub fn is_dir(&self) -> bool {
        false
    }

    /// Always `true`: every attachment can be downloaded.
    pub fn storable(&self) -> bool {
        true
    }

    /// Download the content. Each call starts an independent download; drop
    /// the reader to abort it. Reads fail once `cancel` fires.
    pub async fn open(&self, cancel: &CancellationToken) -> StoreResult<ObjectReader> {
        let body = self.store.download(cancel, self.attachment_id()).await?;
        Ok(ObjectReader::new(body, cancel))
    }

    /// Delete the message carrying this attachment. Not idempotent.
    pub async fn remove(&self, cancel: &CancellationToken) -> StoreResult<()> {
        self.store.delete(cancel, self.attachment_id()).await
    }

    /// Always fails: the platform reports no checksums, and hashing by
    /// download would turn a metadata query into a full transfer.
    pub fn hash(&self, kind: HashKind) -> StoreResult<String> {
        debug!(remote = %self.path, %kind, "hash rejected");
        Err(Operation::Hash.reject())
    }

    /// Always fails: a sent message keeps its timestamp. Delete and
    /// re-upload instead.
    pub async fn set_mod_time(
        &self,
        _cancel: &CancellationToken,
        _mod_time: DateTime<Utc>,
    ) -> StoreResult<()> {
        Err(Operation::SetModTime.reject())
    }

    /// Always fails: a sent attachment cannot be rewritten. Delete and
    /// re-upload instead. `input` is not read.
    pub async fn update<R>(
        &self,
        _cancel: &CancellationToken,
        _input: R,
        _size: u64,
    ) -> StoreResult<()>
    where
        R: AsyncRead + Send + Unpin,
    {
        Err(Operation::Update.reject())
    }
}

impl fmt::Display for StoredObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

impl fmt::Debug for StoredObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObject")
            .field("remote", &self.path)
            .field("name", &self.name)
            .field("size", &self.size)
            .field("size_source", &self.size_source)
            .field("mod_time", &self.mod_time)
            .finish()
    }
}
