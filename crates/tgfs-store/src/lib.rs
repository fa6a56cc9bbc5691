//! A Telegram chat as a remote file store.
//!
//! Uploading a file sends it to the chat as a document, reading it downloads
//! the attachment, and removing it deletes the carrying message. The chat
//! offers no namespace, so a file's address is the identifier the platform
//! issued for it: `"/" + attachment id` (see [`RemotePath`]).
//!
//! # Components
//!
//! - [`ChatStore`] -- owns the session and destination chat; uploads and
//!   resolves objects
//! - [`StoredObject`] -- one file; opens and removes itself through the store
//!   that minted it
//! - [`ObjectReader`] -- downloaded content that stops on cancellation
//! - [`Operation`] -- the support matrix; everything outside the object
//!   lifecycle fails with [`StoreError::Unsupported`]
//!
//! # Rules
//!
//! 1. Uploads are bounded: at most the declared size is read, and sizes over
//!    [`MAX_ATTACHMENT_SIZE`] are rejected before any network call.
//! 2. Unsupported operations never touch the network and never fake success.
//! 3. No caching, no locks, no retries. The destination is the only state and
//!    it is fixed at construction.
//! 4. Every call is cancellable and reports cancellation distinctly.

pub mod error;
pub mod object;
pub mod ops;
pub mod reader;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use object::{SizeSource, StoredObject};
pub use ops::{HashKind, Operation};
pub use reader::ObjectReader;
pub use store::{ChatStore, MAX_ATTACHMENT_SIZE};

// Re-export the types callers need to drive a store.
pub use tgfs_bot::{AttachmentReader, BotConfig, BotSession, InMemoryBot, TelegramBot};
pub use tgfs_types::{AttachmentId, ChatId, RemotePath};
pub use tokio_util::sync::CancellationToken;
