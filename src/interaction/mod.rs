//! Inbound event handling and user dialogues.
//!
//! This module routes normalized chat events into the right workflow:
//! commands open a dialogue, messages and button presses advance the active
//! one, and admin review buttons go straight to the lifecycle engine.
//! Workflow-level errors never escape a dialogue (the step re-prompts);
//! lifecycle-level errors surface as one user-visible notice.

pub mod admin;
pub mod edit;
pub mod reject;
pub mod search;
pub mod session;
pub mod submit;

use chrono::TimeZone;
use chrono::Utc;
use tracing::warn;

use crate::{
    base::{config::Config, texts, types::Void},
    lifecycle::Engine,
    notify::Notifier,
    service::{
        chat::{ChatClient, ChatEvent, InlineKeyboard, ParseMode, UserRef},
        db::DbClient,
    },
};

use session::{Dialogue, SessionStore};

/// Shared handles for one update's processing.
pub struct Ctx<'a> {
    pub db: &'a DbClient,
    pub chat: &'a ChatClient,
    pub config: &'a Config,
}

impl Ctx<'_> {
    pub fn engine(&self) -> Engine {
        Engine::new(self.db.clone())
    }

    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.chat.clone(), self.db.clone(), self.config.clone())
    }

    /// Send a plain-text message to a chat.
    pub async fn say(&self, chat_id: i64, text: &str) -> Void {
        self.chat.send_message(&chat_id.to_string(), text, ParseMode::Plain, None).await?;
        Ok(())
    }

    /// Send a plain-text prompt with an inline keyboard.
    pub async fn prompt(&self, chat_id: i64, text: &str, keyboard: InlineKeyboard) -> crate::base::types::Res<i64> {
        self.chat.send_message(&chat_id.to_string(), text, ParseMode::Plain, Some(keyboard)).await
    }

    /// Acknowledge a callback, optionally with toast text.
    pub async fn answer(&self, callback_id: &str, text: Option<&str>) -> Void {
        self.chat.answer_callback(callback_id, text.map(str::to_string), false).await
    }

    /// Acknowledge a callback with an alert popup.
    pub async fn alert(&self, callback_id: &str, text: &str) -> Void {
        self.chat.answer_callback(callback_id, Some(text.to_string()), true).await
    }
}

/// Handle one inbound chat event.
pub async fn handle_event(event: ChatEvent, db: &DbClient, chat: &ChatClient, sessions: &SessionStore, config: &Config) -> Void {
    let ctx = Ctx { db, chat, config };

    match event {
        ChatEvent::Command { chat_id, name, .. } => handle_command(chat_id, &name, &ctx).await,
        ChatEvent::Callback { id, chat_id, from, data, .. } => handle_callback(&id, chat_id, &from, &data, sessions, &ctx).await,
        ChatEvent::Message { chat_id, from, text, photo_file_id } => handle_message(chat_id, &from, text.as_deref(), photo_file_id.as_deref(), sessions, &ctx).await,
    }
}

async fn handle_command(chat_id: i64, name: &str, ctx: &Ctx<'_>) -> Void {
    match name {
        "submit" => {
            let keyboard = InlineKeyboard::new().text(texts::YES, "submit_event");
            ctx.prompt(chat_id, texts::SUBMIT_INTRO, keyboard).await?;
        }
        "search" => {
            let keyboard = InlineKeyboard::new().text(texts::SEARCH_START, "start_search");
            ctx.prompt(chat_id, &format!("{} {}", texts::ICON_SEARCH, texts::SEARCH_INTRO), keyboard).await?;
        }
        "edit" => {
            let keyboard = InlineKeyboard::new().text(texts::YES, "edit_event");
            ctx.prompt(chat_id, texts::EDIT_INTRO, keyboard).await?;
        }
        _ => {
            ctx.say(chat_id, texts::HELP).await?;
        }
    }

    Ok(())
}

async fn handle_callback(callback_id: &str, chat_id: i64, from: &UserRef, data: &str, sessions: &SessionStore, ctx: &Ctx<'_>) -> Void {
    // Dialogue entry points.
    match data {
        "submit_event" => {
            ctx.answer(callback_id, None).await?;
            let state = submit::start(chat_id, from, ctx).await?;
            sessions.put(chat_id, Dialogue::Submit(state)).await;
            return Ok(());
        }
        "start_search" => {
            ctx.answer(callback_id, None).await?;
            let state = search::start(chat_id, ctx).await?;
            sessions.put(chat_id, Dialogue::Search(state)).await;
            return Ok(());
        }
        "edit_event" => {
            ctx.answer(callback_id, None).await?;
            if let Some(state) = edit::start(chat_id, from, ctx).await? {
                sessions.put(chat_id, Dialogue::Edit(state)).await;
            }
            return Ok(());
        }
        _ => {}
    }

    // Admin review decisions, keyed by event ID and the edit flag.
    if let Some(event_id) = data.strip_prefix("approve_") {
        let event_id = event_id.strip_prefix("edit_").unwrap_or(event_id);
        return admin::handle_approval(event_id, callback_id, chat_id, ctx).await;
    }

    if let Some(event_id) = data.strip_prefix("reject_") {
        let event_id = event_id.strip_prefix("edit_").unwrap_or(event_id);

        if let Some(state) = admin::handle_rejection(event_id, callback_id, chat_id, ctx).await? {
            sessions.put(chat_id, Dialogue::Reject(state)).await;
        }
        return Ok(());
    }

    // Everything else advances the active dialogue of this chat.
    let Some(dialogue) = sessions.take(chat_id).await else {
        warn!("Callback `{}` without an active dialogue.", data);
        return ctx.answer(callback_id, None).await;
    };

    let next = match dialogue {
        Dialogue::Submit(state) => submit::on_callback(state, chat_id, callback_id, data, ctx).await?.map(Dialogue::Submit),
        Dialogue::Edit(state) => edit::on_callback(state, chat_id, callback_id, data, ctx).await?.map(Dialogue::Edit),
        Dialogue::Search(state) => search::on_callback(state, chat_id, callback_id, data, ctx).await?.map(Dialogue::Search),
        Dialogue::Reject(state) => {
            // The rejection dialogue has no buttons; keep it suspended.
            ctx.answer(callback_id, None).await?;
            Some(Dialogue::Reject(state))
        }
    };

    if let Some(dialogue) = next {
        sessions.put(chat_id, dialogue).await;
    }

    Ok(())
}

async fn handle_message(chat_id: i64, _from: &UserRef, text: Option<&str>, photo_file_id: Option<&str>, sessions: &SessionStore, ctx: &Ctx<'_>) -> Void {
    let Some(dialogue) = sessions.take(chat_id).await else {
        // Messages outside a dialogue are not the bot's business.
        return Ok(());
    };

    let next = match dialogue {
        Dialogue::Submit(state) => submit::on_message(state, chat_id, text, photo_file_id, ctx).await?.map(Dialogue::Submit),
        Dialogue::Edit(state) => edit::on_message(state, chat_id, text, photo_file_id, ctx).await?.map(Dialogue::Edit),
        Dialogue::Search(state) => search::on_message(state, chat_id, text, ctx).await?.map(Dialogue::Search),
        Dialogue::Reject(state) => reject::on_message(state, chat_id, text, ctx).await?.map(Dialogue::Reject),
    };

    if let Some(dialogue) = next {
        sessions.put(chat_id, dialogue).await;
    }

    Ok(())
}

/// An example date in the configured entry format, used in prompts.
pub(crate) fn date_example(config: &Config, with_time: bool) -> String {
    let sample = Utc.with_ymd_and_hms(2024, 12, 25, 18, 0, 0).unwrap();
    let fmt = if with_time { &config.date_format } else { &config.date_only_format };

    crate::format::dates::format_in_tz(sample, config.tz(), fmt, config.chrono_locale())
}

/// The category selection keyboard shared by the submit and edit workflows.
pub(crate) fn category_keyboard() -> InlineKeyboard {
    use crate::domain::event::CATEGORIES;

    let mut keyboard = InlineKeyboard::new();

    // Three rows of categories, mirroring the fixed set's layout.
    for (i, name) in CATEGORIES.iter().enumerate() {
        keyboard = keyboard.text(*name, format!("cat_{name}"));
        if i == 2 || i == 4 {
            keyboard = keyboard.row();
        }
    }

    keyboard
        .row()
        .text(format!("{} {}", texts::ICON_RESET, texts::CATEGORY_RESET), "cat_reset")
        .row()
        .text(format!("{} {}", texts::ICON_APPROVE, texts::CATEGORY_DONE), "cat_done")
}
