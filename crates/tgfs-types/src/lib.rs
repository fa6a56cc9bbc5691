//! Foundation types for tgfs.
//!
//! tgfs stores files as attachments in a Telegram chat. This crate holds the
//! small set of value types shared by the bot client and the store:
//!
//! - [`AttachmentId`] — opaque identifier issued by the chat platform for a sent file
//! - [`RemotePath`] — the `"/" + id` address handed to storage clients
//! - [`ChatId`] — numeric destination chat all uploads go to
//! - [`SentAttachment`] — acknowledgment returned by a successful send
//! - [`AttachmentMeta`] — metadata reported for an existing attachment

pub mod attachment;
pub mod destination;
pub mod error;
pub mod path;

pub use attachment::{AttachmentId, AttachmentMeta, SentAttachment};
pub use destination::ChatId;
pub use error::TypeError;
pub use path::{caption_for, RemotePath};
