//! Messaging transport for the event-bot.
//!
//! This module defines the `GenericChatClient` trait covering the transport
//! operations the core consumes (send, edit, delete, callback answers, file
//! download), with a concrete implementation for the Telegram Bot API.

pub mod telegram;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;

use crate::base::types::{Res, Void};

// Traits.

/// Generic "chat" trait that transport clients must implement.
///
/// Chat IDs are strings so both numeric IDs and `@channel` names fit.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Start the inbound update loop. Runs until shutdown.
    async fn start(&self) -> Void;

    /// Send a text message; returns the new message ID.
    async fn send_message(&self, chat_id: &str, text: &str, mode: ParseMode, keyboard: Option<InlineKeyboard>) -> Res<i64>;

    /// Send an image with a caption; returns the new message ID.
    async fn send_photo(&self, chat_id: &str, image: Vec<u8>, caption: &str, mode: ParseMode, keyboard: Option<InlineKeyboard>, spoiler: bool) -> Res<i64>;

    /// Replace the text of an existing message.
    async fn edit_message_text(&self, chat_id: &str, message_id: i64, text: &str, mode: ParseMode) -> Void;

    /// Replace (or remove, with `None`) the inline keyboard of a message.
    async fn edit_message_reply_markup(&self, chat_id: &str, message_id: i64, keyboard: Option<InlineKeyboard>) -> Void;

    /// Delete a message.
    async fn delete_message(&self, chat_id: &str, message_id: i64) -> Void;

    /// Answer an incoming callback, optionally with user-visible popup text.
    async fn answer_callback(&self, callback_id: &str, text: Option<String>, show_alert: bool) -> Void;

    /// Retrieve a file by its transport reference and return the raw bytes.
    async fn download_file(&self, file_id: &str) -> Res<Vec<u8>>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}

/// How message text should be interpreted by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Plain text; used for workflow prompts.
    Plain,
    /// Telegram MarkdownV2; everything user-supplied must be escaped first.
    MarkdownV2,
}

/// An inline keyboard attached to an outbound message.
///
/// Serializes directly into Telegram's `reply_markup` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineKeyboard {
    inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a button to the current row.
    pub fn text(mut self, label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        if self.inline_keyboard.is_empty() {
            self.inline_keyboard.push(Vec::new());
        }

        self.inline_keyboard.last_mut().expect("row exists").push(InlineButton {
            text: label.into(),
            callback_data: callback_data.into(),
        });

        self
    }

    /// Start a new row.
    pub fn row(mut self) -> Self {
        self.inline_keyboard.push(Vec::new());
        self
    }
}

/// An inbound chat event, normalized from the transport's update schema.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A `/command` message.
    Command { chat_id: i64, from: UserRef, name: String },
    /// A regular message; carries text and/or an image reference.
    Message {
        chat_id: i64,
        from: UserRef,
        text: Option<String>,
        photo_file_id: Option<String>,
    },
    /// A button press on an inline keyboard.
    Callback {
        id: String,
        chat_id: i64,
        from: UserRef,
        data: String,
        message_id: i64,
    },
}

/// The acting user of an inbound event.
#[derive(Debug, Clone)]
pub struct UserRef {
    pub id: i64,
    pub display_name: String,
}
