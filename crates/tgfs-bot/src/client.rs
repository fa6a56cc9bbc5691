//! HTTP session against the Telegram Bot API.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tgfs_types::{AttachmentId, AttachmentMeta, ChatId, SentAttachment};
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::{debug, warn};

use crate::api::{self, ChatTarget, DeleteMessage, DocumentRef, Envelope, GetChat, GetFile};
use crate::config::BotConfig;
use crate::error::{BotError, BotResult};
use crate::traits::{AttachmentReader, BotSession, UploadBody};

/// Telegram Bot API session.
///
/// Holds one pooled `reqwest::Client`; clones share the pool and are cheap.
/// Identifiers issued by this session have the layout described on
/// [`DocumentRef`].
#[derive(Clone)]
pub struct TelegramBot {
    http: reqwest::Client,
    base: String,
    token: String,
    chat: String,
    call_timeout: Duration,
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("base", &self.base)
            .field("token", &"[REDACTED]")
            .field("chat", &self.chat)
            .finish()
    }
}

impl TelegramBot {
    /// Build a session from configuration. No network traffic happens until
    /// the first call.
    pub fn new(config: &BotConfig) -> BotResult<Self> {
        let call_timeout = Duration::from_secs(config.timeout_secs);
        // No overall client timeout: an upload near the size ceiling takes
        // far longer than any metadata call. Metadata calls set their own.
        let http = reqwest::Client::builder()
            .connect_timeout(call_timeout)
            .build()?;
        Ok(Self {
            http,
            base: config.api_url.as_str().trim_end_matches('/').to_string(),
            token: config.token.clone(),
            chat: config.chat_id.clone(),
            call_timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.base, self.token, file_path)
    }

    /// POST a JSON-bodied Bot API call and unwrap the envelope.
    async fn call<P, T>(&self, method: &str, params: &P) -> BotResult<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method, "bot api call");
        let response = self
            .http
            .post(self.method_url(method))
            .timeout(self.call_timeout)
            .json(params)
            .send()
            .await?;
        decode(method, response).await
    }

    /// `getMe`: verifies the token.
    pub async fn get_me(&self) -> BotResult<api::User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// `getChat`: resolves a numeric id or `@username`.
    pub async fn get_chat(&self, chat: &str) -> BotResult<api::Chat> {
        self.call(
            "getChat",
            &GetChat {
                chat_id: ChatTarget::parse(chat),
            },
        )
        .await
    }

    /// `getFile`: file metadata plus a temporary download path.
    pub async fn get_file(&self, file_id: &str) -> BotResult<api::File> {
        self.call("getFile", &GetFile { file_id }).await
    }
}

async fn decode<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> BotResult<T> {
    let status = response.status();
    let body = response.bytes().await?;
    match serde_json::from_slice::<Envelope<T>>(&body) {
        Ok(envelope) => envelope.into_result(status.as_u16()).inspect_err(|e| {
            warn!(method, status = status.as_u16(), error = %e, "bot api call failed");
        }),
        Err(_) if !status.is_success() => Err(api::classify(
            i64::from(status.as_u16()),
            String::from_utf8_lossy(&body).into_owned(),
        )),
        Err(e) => Err(BotError::Decode(format!("{method}: {e}"))),
    }
}

#[async_trait]
impl BotSession for TelegramBot {
    async fn resolve_destination(&self) -> BotResult<ChatId> {
        let me = self.get_me().await?;
        debug!(bot_id = me.id, username = ?me.username, "authenticated");
        let chat = self.get_chat(&self.chat).await?;
        debug!(chat_id = chat.id, kind = %chat.kind, "destination resolved");
        Ok(ChatId::new(chat.id))
    }

    async fn send_document(
        &self,
        destination: ChatId,
        caption: &str,
        body: UploadBody,
        size: u64,
    ) -> BotResult<SentAttachment> {
        let stream = reqwest::Body::wrap_stream(ReaderStream::new(body));
        let document = Part::stream_with_length(stream, size).file_name(caption.to_string());
        let form = Form::new()
            .text("chat_id", destination.to_string())
            .text("caption", caption.to_string())
            .part("document", document);

        debug!(%destination, size, "sendDocument");
        let response = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        let message: api::Message = decode("sendDocument", response).await?;
        let sent_at = message.sent_at()?;
        let document = message
            .document
            .ok_or_else(|| BotError::Decode("sendDocument: message has no document".into()))?;
        let id = DocumentRef {
            message_id: message.message_id,
            file_id: document.file_id,
        }
        .to_attachment_id();
        Ok(SentAttachment {
            id,
            sent_at,
            reported_size: document.file_size,
        })
    }

    async fn file_meta(&self, id: &AttachmentId) -> BotResult<AttachmentMeta> {
        let doc = DocumentRef::from_attachment_id(id)?;
        let file = self.get_file(&doc.file_id).await?;
        let name = file.stored_name().unwrap_or(&file.file_id).to_string();
        Ok(AttachmentMeta {
            id: id.clone(),
            name,
            size: file.file_size.unwrap_or(0),
            // getFile carries no timestamp.
            sent_at: None,
        })
    }

    async fn download(&self, id: &AttachmentId) -> BotResult<AttachmentReader> {
        let doc = DocumentRef::from_attachment_id(id)?;
        let file = self.get_file(&doc.file_id).await?;
        let file_path = file
            .file_path
            .ok_or_else(|| BotError::NotFound(format!("{id}: no download path")))?;

        debug!(%id, "downloading");
        let response = self.http.get(self.file_url(&file_path)).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BotError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(api::classify(
                i64::from(status.as_u16()),
                format!("download of {id} failed"),
            ));
        }
        let bytes = response.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::pin(StreamReader::new(bytes)))
    }

    async fn delete(&self, destination: ChatId, id: &AttachmentId) -> BotResult<()> {
        let doc = DocumentRef::from_attachment_id(id)?;
        let deleted: bool = self
            .call(
                "deleteMessage",
                &DeleteMessage {
                    chat_id: destination.get(),
                    message_id: doc.message_id,
                },
            )
            .await?;
        if deleted {
            Ok(())
        } else {
            Err(BotError::Api {
                code: 400,
                description: format!("deleteMessage returned false for {id}"),
            })
        }
    }
}
