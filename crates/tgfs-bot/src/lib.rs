//! Chat-platform session used by the tgfs store.
//!
//! The store needs five things from the platform: resolve the destination
//! chat, send a file, look up a file's metadata, download it, and delete it.
//! Those five calls are the [`BotSession`] trait. Two implementations ship
//! here:
//!
//! - [`TelegramBot`] — talks to the Telegram Bot API (or a self-hosted Bot API
//!   server) over HTTP
//! - [`InMemoryBot`] — keeps attachments in a `HashMap` and counts every call,
//!   for tests and embedding
//!
//! The session classifies failures into "not found", "unauthorized" and
//! everything else. Retries are not performed here.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod traits;

pub use client::TelegramBot;
pub use config::{BotConfig, ConfigError};
pub use error::{BotError, BotResult};
pub use memory::{CallCounts, InMemoryBot};
pub use traits::{AttachmentReader, BotSession, UploadBody};
