//! Telegram Bot API implementation of the chat client.
//!
//! A plain REST client over `reqwest`: outbound calls are JSON posts to
//! `https://api.telegram.org/bot<token>/<method>`, inbound updates arrive via
//! long-polling `getUpdates` and are normalized into [`ChatEvent`]s before
//! being handed to the interaction layer.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::{self, session::SessionStore},
    service::db::DbClient,
};

use super::{ChatClient, ChatEvent, GenericChatClient, InlineKeyboard, ParseMode, UserRef};

const API_BASE: &str = "https://api.telegram.org";

/// Long-poll timeout for `getUpdates`, in seconds.
const POLL_TIMEOUT_SECS: u32 = 50;

// Extra methods on `ChatClient` applied by the telegram implementation.

impl ChatClient {
    /// Creates a new Telegram chat client.
    pub async fn telegram(config: &Config, db: DbClient, sessions: SessionStore) -> Res<Self> {
        let client = TelegramChatClient::new(config, db, sessions).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<TelegramChatClient> for ChatClient {
    fn from(client: TelegramChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Wire types for the Bot API (the subset this bot consumes).

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<IncomingMessage>,
    callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    message_id: i64,
    chat: ChatRef,
    from: Option<User>,
    text: Option<String>,
    photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Deserialize)]
struct ChatRef {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    username: Option<String>,
    first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoSize {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    id: String,
    from: User,
    data: Option<String>,
    message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    file_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Me {
    username: Option<String>,
}

impl User {
    /// Display name preference: username, then first name, then a fallback.
    fn display_name(&self) -> String {
        self.username.clone().or_else(|| self.first_name.clone()).unwrap_or_else(|| "Anonym".to_string())
    }
}

// Structs.

/// Telegram client implementation.
#[derive(Clone)]
pub struct TelegramChatClient {
    http: reqwest::Client,
    token: String,
    bot_username: String,
    config: Config,
    db: DbClient,
    sessions: SessionStore,
}

impl TelegramChatClient {
    /// Create a new Telegram chat client, verifying the token via `getMe`.
    #[instrument(name = "TelegramChatClient::new", skip_all)]
    pub async fn new(config: &Config, db: DbClient, sessions: SessionStore) -> Res<Self> {
        let http = reqwest::Client::new();

        let mut client = Self {
            http,
            token: config.telegram_token.clone(),
            bot_username: String::new(),
            config: config.clone(),
            db,
            sessions,
        };

        let me: Me = client.call("getMe", &json!({})).await?;
        client.bot_username = me.username.unwrap_or_default();

        info!("Telegram bot username: {}", client.bot_username);

        Ok(client)
    }

    /// Invoke a Bot API method and unwrap the response envelope.
    async fn call<T: DeserializeOwned, B: Serialize + ?Sized>(&self, method: &str, body: &B) -> Res<T> {
        let url = format!("{API_BASE}/bot{}/{method}", self.token);

        let response = self.http.post(url).json(body).send().await?;
        let envelope: ApiResponse<T> = response.json().await?;

        if !envelope.ok {
            return Err(anyhow!("Telegram API `{}` failed: {}", method, envelope.description.unwrap_or_else(|| "unknown error".to_string())));
        }

        envelope.result.ok_or_else(|| anyhow!("Telegram API `{}` returned an empty result", method))
    }

    /// Normalize a raw update into a [`ChatEvent`], if it is one we handle.
    fn map_update(&self, update: Update) -> Option<ChatEvent> {
        if let Some(message) = update.message {
            let from = message.from.as_ref()?;
            let from = UserRef {
                id: from.id,
                display_name: from.display_name(),
            };

            if let Some(text) = message.text.as_deref()
                && let Some(command) = text.strip_prefix('/')
            {
                // Strip arguments and the `@botname` suffix of group commands.
                let name = command.split([' ', '@']).next().unwrap_or_default().to_string();
                return Some(ChatEvent::Command { chat_id: message.chat.id, from, name });
            }

            // The largest photo size is listed last.
            let photo_file_id = message.photo.and_then(|sizes| sizes.last().map(|p| p.file_id.clone()));

            return Some(ChatEvent::Message {
                chat_id: message.chat.id,
                from,
                text: message.text,
                photo_file_id,
            });
        }

        if let Some(callback) = update.callback_query {
            let message = callback.message?;

            return Some(ChatEvent::Callback {
                id: callback.id,
                chat_id: message.chat.id,
                from: UserRef {
                    id: callback.from.id,
                    display_name: callback.from.display_name(),
                },
                data: callback.data?,
                message_id: message.message_id,
            });
        }

        None
    }
}

#[async_trait]
impl GenericChatClient for TelegramChatClient {
    async fn start(&self) -> Void {
        let chat = ChatClient::from(self.clone());
        let mut offset: i64 = 0;

        info!("Listening for updates ...");

        loop {
            let updates: Vec<Update> = match self
                .call(
                    "getUpdates",
                    &json!({
                        "offset": offset,
                        "timeout": POLL_TIMEOUT_SECS,
                        "allowed_updates": ["message", "callback_query"],
                    }),
                )
                .await
            {
                Ok(updates) => updates,
                Err(err) => {
                    // Transient network failures must not kill the loop.
                    error!("Failed to fetch updates: {}", err);
                    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let Some(event) = self.map_update(update) else {
                    warn!("Received unhandled update.");
                    continue;
                };

                // Updates are processed in order; a dialogue advances one
                // step per inbound event.
                if let Err(err) = interaction::handle_event(event, &self.db, &chat, &self.sessions, &self.config).await {
                    error!("Error while handling update: {}", err);
                }
            }
        }
    }

    #[instrument(skip(self, text, keyboard))]
    async fn send_message(&self, chat_id: &str, text: &str, mode: ParseMode, keyboard: Option<InlineKeyboard>) -> Res<i64> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });

        if mode == ParseMode::MarkdownV2 {
            body["parse_mode"] = json!("MarkdownV2");
        }

        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(&keyboard)?;
        }

        let sent: SentMessage = self.call("sendMessage", &body).await?;

        Ok(sent.message_id)
    }

    #[instrument(skip(self, image, caption, keyboard))]
    async fn send_photo(&self, chat_id: &str, image: Vec<u8>, caption: &str, mode: ParseMode, keyboard: Option<InlineKeyboard>, spoiler: bool) -> Res<i64> {
        // Photo uploads go out as multipart, not JSON.
        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", reqwest::multipart::Part::bytes(image).file_name("event.jpg"));

        if mode == ParseMode::MarkdownV2 {
            form = form.text("parse_mode", "MarkdownV2");
        }

        if let Some(keyboard) = keyboard {
            form = form.text("reply_markup", serde_json::to_string(&keyboard)?);
        }

        if spoiler {
            form = form.text("has_spoiler", "true");
        }

        let url = format!("{API_BASE}/bot{}/sendPhoto", self.token);
        let response = self.http.post(url).multipart(form).send().await?;
        let envelope: ApiResponse<SentMessage> = response.json().await?;

        if !envelope.ok {
            return Err(anyhow!("Telegram API `sendPhoto` failed: {}", envelope.description.unwrap_or_else(|| "unknown error".to_string())));
        }

        let sent = envelope.result.ok_or_else(|| anyhow!("Telegram API `sendPhoto` returned an empty result"))?;

        Ok(sent.message_id)
    }

    #[instrument(skip(self, text))]
    async fn edit_message_text(&self, chat_id: &str, message_id: i64, text: &str, mode: ParseMode) -> Void {
        let mut body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });

        if mode == ParseMode::MarkdownV2 {
            body["parse_mode"] = json!("MarkdownV2");
        }

        let _: SentMessage = self.call("editMessageText", &body).await?;

        Ok(())
    }

    #[instrument(skip(self, keyboard))]
    async fn edit_message_reply_markup(&self, chat_id: &str, message_id: i64, keyboard: Option<InlineKeyboard>) -> Void {
        let mut body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
        });

        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(&keyboard)?;
        }

        let _: SentMessage = self.call("editMessageReplyMarkup", &body).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_message(&self, chat_id: &str, message_id: i64) -> Void {
        let _: bool = self
            .call(
                "deleteMessage",
                &json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                }),
            )
            .await?;

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn answer_callback(&self, callback_id: &str, text: Option<String>, show_alert: bool) -> Void {
        let mut body = json!({
            "callback_query_id": callback_id,
        });

        if let Some(text) = text {
            body["text"] = json!(text);
        }

        if show_alert {
            body["show_alert"] = json!(true);
        }

        let _: bool = self.call("answerCallbackQuery", &body).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn download_file(&self, file_id: &str) -> Res<Vec<u8>> {
        let info: FileInfo = self.call("getFile", &json!({ "file_id": file_id })).await?;
        let file_path = info.file_path.ok_or_else(|| anyhow!("File `{}` has no path", file_id))?;

        let url = format!("{API_BASE}/file/bot{}/{file_path}", self.token);
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Failed to download file `{}`: {}", file_id, response.status()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
