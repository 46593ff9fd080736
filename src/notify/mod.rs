//! Outbound notifications for lifecycle outcomes.
//!
//! The notifier turns formatter output into transport calls, handling the
//! three delivery shapes: image+caption, text-only, and update-in-place.

use anyhow::anyhow;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tracing::{instrument, warn};

use crate::{
    base::{
        config::Config,
        texts,
        types::{Res, Void},
    },
    domain::Event,
    format::{Audience, markdown::escape_text, render_event},
    service::{
        chat::{ChatClient, InlineKeyboard, ParseMode},
        db::DbClient,
    },
};

/// Delivers formatter output to admins, the public channel, and submitters.
#[derive(Clone)]
pub struct Notifier {
    chat: ChatClient,
    db: DbClient,
    config: Config,
}

impl Notifier {
    pub fn new(chat: ChatClient, db: DbClient, config: Config) -> Self {
        Self { chat, db, config }
    }

    /// Deliver an approved event to the channel.
    ///
    /// A missing channel message reference means "not yet published",
    /// regardless of status; this makes a publish that failed after the
    /// status write retriable. Otherwise the existing post is updated.
    #[instrument(skip_all, fields(event_id = event.id.as_deref().unwrap_or("?")))]
    pub async fn deliver(&self, event: &Event) -> Res<Event> {
        if event.channel_message_id.is_none() {
            self.publish(event).await
        } else {
            self.republish(event).await
        }
    }

    /// First-time publication: send a new channel post and record its ID.
    async fn publish(&self, event: &Event) -> Res<Event> {
        let event_id = required_id(event)?;
        let text = render_event(event, Audience::Channel, &self.config);

        let message_id = match image_bytes(event)? {
            Some(image) => self.chat.send_photo(&self.config.channel_id, image, &text, ParseMode::MarkdownV2, None, false).await?,
            None => self.chat.send_message(&self.config.channel_id, &text, ParseMode::MarkdownV2, None).await?,
        };

        self.db.set_channel_message_id(event_id, message_id).await
    }

    /// Update the existing channel post after an edit was approved.
    ///
    /// The transport cannot atomically swap caption and media, so image
    /// events are deleted and re-sent; text-only events are edited in place.
    async fn republish(&self, event: &Event) -> Res<Event> {
        let event_id = required_id(event)?;
        let text = render_event(event, Audience::Channel, &self.config);

        match image_bytes(event)? {
            Some(image) => {
                if let Some(old_message_id) = event.channel_message_id {
                    self.chat.delete_message(&self.config.channel_id, old_message_id).await?;
                }

                let message_id = self.chat.send_photo(&self.config.channel_id, image, &text, ParseMode::MarkdownV2, None, false).await?;
                self.db.set_channel_message_id(event_id, message_id).await
            }
            None => match event.channel_message_id {
                Some(message_id) => {
                    self.chat.edit_message_text(&self.config.channel_id, message_id, &text, ParseMode::MarkdownV2).await?;
                    Ok(event.clone())
                }
                None => {
                    let message_id = self.chat.send_message(&self.config.channel_id, &text, ParseMode::MarkdownV2, None).await?;
                    self.db.set_channel_message_id(event_id, message_id).await
                }
            },
        }
    }

    /// Send the review card to the admin chat, with approve/reject buttons.
    ///
    /// The callback data carries the edit flag so the router can tell a
    /// first-time approval from an edit re-approval.
    #[instrument(skip_all, fields(event_id = event.id.as_deref().unwrap_or("?"), is_edit))]
    pub async fn notify_admins(&self, event: &Event, is_edit: bool) -> Void {
        let event_id = required_id(event)?;
        let text = render_event(event, Audience::Admin { is_edit }, &self.config);

        let marker = if is_edit { "edit_" } else { "" };
        let keyboard = InlineKeyboard::new()
            .text(texts::BUTTON_APPROVE, format!("approve_{marker}{event_id}"))
            .text(texts::BUTTON_REJECT, format!("reject_{marker}{event_id}"));

        let admin_chat = self.config.admin_chat_id.to_string();

        match image_bytes(event)? {
            Some(image) => {
                self.chat.send_photo(&admin_chat, image, &text, ParseMode::MarkdownV2, Some(keyboard), false).await?;
            }
            None => {
                self.chat.send_message(&admin_chat, &text, ParseMode::MarkdownV2, Some(keyboard)).await?;
            }
        }

        Ok(())
    }

    /// Tell the submitter their event was rejected. Best effort: a delivery
    /// failure is logged and never surfaced to the admin-facing caller.
    #[instrument(skip_all, fields(event_id = event.id.as_deref().unwrap_or("?")))]
    pub async fn notify_submitter(&self, event: &Event, reason: &str) {
        let text = format!("Deine Veranstaltung \"{}\" wurde abgelehnt.\nGrund: {}", event.title, reason);

        if let Err(err) = self.chat.send_message(&event.submitted_by_id.to_string(), &text, ParseMode::Plain, None).await {
            warn!("Failed to notify submitter {}: {}", event.submitted_by_id, err);
        }
    }

    /// Send a day's search results to a user, one message per event.
    #[instrument(skip(self, events))]
    pub async fn send_search_results(&self, events: &[Event], date_label: &str, chat_id: i64) -> Void {
        let chat_id = chat_id.to_string();

        if events.is_empty() {
            let text = format!("Keine Veranstaltungen für {}\\.", escape_text(date_label));
            self.chat.send_message(&chat_id, &text, ParseMode::MarkdownV2, None).await?;
            return Ok(());
        }

        let total = events.len();

        for (index, event) in events.iter().enumerate() {
            let text = render_event(event, Audience::SearchResult { index, total, date_label }, &self.config);

            match image_bytes(event)? {
                Some(image) => {
                    self.chat.send_photo(&chat_id, image, &text, ParseMode::MarkdownV2, None, true).await?;
                }
                None => {
                    self.chat.send_message(&chat_id, &text, ParseMode::MarkdownV2, None).await?;
                }
            }
        }

        Ok(())
    }
}

fn required_id(event: &Event) -> Res<&str> {
    event.id.as_deref().ok_or_else(|| anyhow!("Event has no record ID"))
}

/// Decode the stored image, if any.
fn image_bytes(event: &Event) -> Res<Option<Vec<u8>>> {
    event
        .image_base64
        .as_deref()
        .map(|encoded| BASE64.decode(encoded).map_err(|e| anyhow!("Stored image is not valid base64: {}", e)))
        .transpose()
}
