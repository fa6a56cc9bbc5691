use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tgfs_bot::AttachmentReader;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Marker carried inside the `io::Error` a cancelled read yields.
#[derive(Debug, thiserror::Error)]
#[error("read cancelled")]
pub(crate) struct ReadCancelled;

/// Attachment content bound to the token it was opened with.
///
/// Once the token is cancelled every read fails, including one that is
/// pending on the network. The failure maps to [`StoreError::Cancelled`]
/// through [`StoreError::from_read`].
///
/// [`StoreError::Cancelled`]: crate::StoreError::Cancelled
/// [`StoreError::from_read`]: crate::StoreError::from_read
pub struct ObjectReader {
    inner: AttachmentReader,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl ObjectReader {
    pub(crate) fn new(inner: AttachmentReader, cancel: &CancellationToken) -> Self {
        Self {
            inner,
            cancelled: Box::pin(cancel.clone().cancelled_owned()),
        }
    }
}

impl AsyncRead for ObjectReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        // Polling the token first registers the waker, so a read parked on
        // the network still wakes up when the token fires.
        if this.cancelled.as_mut().poll(cx).is_ready() {
            return Poll::Ready(Err(io::Error::other(ReadCancelled)));
        }
        this.inner.as_mut().poll_read(cx, buf)
    }
}

impl std::fmt::Debug for ObjectReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectReader").finish_non_exhaustive()
    }
}
