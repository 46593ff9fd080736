//! The edit dialogue for already published events.
//!
//! The submitter picks one of their upcoming published events, then walks a
//! fixed field list: every field gets a "change this?" question, and answered
//! values accumulate in an [`EventPatch`]. Nothing is written until the final
//! save confirmation; saving sends the event back through admin review.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Utc;

use crate::{
    base::{
        config::Config,
        texts,
        types::{Res, Void},
    },
    domain::{
        Event, EventPatch, LifecycleError,
        event::{DESCRIPTION_MAX, LINKS_MAX, LOCATION_MIN, TITLE_MAX},
    },
    format::{Audience, dates::parse_in_tz, render_event},
    service::chat::{InlineKeyboard, ParseMode, UserRef},
};

use super::{Ctx, category_keyboard, date_example};

/// The editable fields, in the order the dialogue walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Description,
    StartDate,
    EndDate,
    Location,
    Category,
    Links,
    Image,
}

pub const FIELDS: [EditField; 8] = [
    EditField::Title,
    EditField::Description,
    EditField::StartDate,
    EditField::EndDate,
    EditField::Location,
    EditField::Category,
    EditField::Links,
    EditField::Image,
];

impl EditField {
    /// The field name as shown in the change summary.
    pub fn name(&self) -> &'static str {
        match self {
            EditField::Title => "Titel",
            EditField::Description => "Beschreibung",
            EditField::StartDate => "Startdatum",
            EditField::EndDate => "Enddatum",
            EditField::Location => "Location",
            EditField::Category => "Kategorien",
            EditField::Links => "Links",
            EditField::Image => "Bild",
        }
    }

    /// The field with its article, for the "change this?" question.
    fn accusative(&self) -> &'static str {
        match self {
            EditField::Title => "den Titel",
            EditField::Description => "die Beschreibung",
            EditField::StartDate => "das Startdatum",
            EditField::EndDate => "das Enddatum",
            EditField::Location => "die Location",
            EditField::Category => "die Kategorien",
            EditField::Links => "die Links",
            EditField::Image => "das Bild",
        }
    }

    /// The prompt asking for the new value.
    fn value_prompt(&self, config: &Config) -> String {
        match self {
            EditField::Title => texts::ASK_TITLE.to_string(),
            EditField::Description => texts::ASK_DESCRIPTION.to_string(),
            EditField::StartDate => format!("Bitte gib das neue Startdatum ein (z.B. {}):", date_example(config, true)),
            EditField::EndDate => format!("Bitte gib das neue Enddatum ein (z.B. {}):", date_example(config, true)),
            EditField::Location => texts::ASK_LOCATION.to_string(),
            EditField::Category => texts::ASK_CATEGORY.to_string(),
            EditField::Links => texts::ASK_LINKS.to_string(),
            EditField::Image => texts::ASK_IMAGE.to_string(),
        }
    }

    /// Parse a text value into the patch.
    ///
    /// `base` is the stored event; the end date is checked against the
    /// effective start, which may itself already be patched. Returns the
    /// re-prompt message on invalid input.
    fn parse_text(&self, text: &str, patch: &mut EventPatch, base: &Event, config: &Config) -> Result<(), &'static str> {
        let text = text.trim();

        match self {
            EditField::Title => {
                if text.is_empty() || text.chars().count() > TITLE_MAX {
                    return Err(texts::TITLE_TOO_LONG);
                }
                patch.title = Some(text.to_string());
            }
            EditField::Description => {
                if text.chars().count() > DESCRIPTION_MAX {
                    return Err(texts::DESCRIPTION_TOO_LONG);
                }
                patch.description = Some(text.to_string());
            }
            EditField::StartDate => {
                let end = patch.end_date.unwrap_or(base.end_date);
                let date = parse_in_tz(text, &config.date_format, config.tz()).ok_or(texts::INVALID_START_DATE)?;

                // Checked against the effective end, which may itself already
                // be patched.
                if date >= end {
                    return Err(texts::START_AFTER_END);
                }

                patch.date = Some(date);
            }
            EditField::EndDate => {
                let start = patch.date.unwrap_or(base.date);
                let end = parse_in_tz(text, &config.date_format, config.tz()).filter(|end| *end > start).ok_or(texts::INVALID_END_DATE)?;
                patch.end_date = Some(end);
            }
            EditField::Location => {
                if text.chars().count() < LOCATION_MIN {
                    return Err(texts::LOCATION_TOO_SHORT);
                }
                patch.location = Some(text.to_string());
            }
            EditField::Links => {
                if text.eq_ignore_ascii_case("no") {
                    patch.links = Some(Vec::new());
                } else {
                    patch.links = Some(text.split_whitespace().take(LINKS_MAX).map(str::to_string).collect());
                }
            }
            EditField::Image => {
                if !text.eq_ignore_ascii_case("no") {
                    return Err(texts::IMAGE_INVALID);
                }
                patch.image_base64 = Some(None);
            }
            // Categories are collected via buttons, not text.
            EditField::Category => return Err(texts::ASK_CATEGORY),
        }

        Ok(())
    }
}

/// Suspended state of one edit dialogue.
#[derive(Debug, Clone)]
pub enum EditState {
    /// Waiting for the user to pick one of their events.
    ChoosingEvent,
    /// Walking the field list of the chosen event.
    Editing { event: Event, patch: EventPatch, step: EditStep },
}

#[derive(Debug, Clone)]
pub enum EditStep {
    /// "Change field `i`?" question is pending.
    AskField(usize),
    /// Waiting for the new value of field `i`.
    EnterValue(usize),
    /// Category toggles in flight.
    SelectCategories { field: usize, selected: Vec<String> },
    /// Waiting for the final save/discard decision.
    ConfirmSave,
}

/// Open the dialogue: list the user's editable events.
///
/// Returns `None` (no dialogue) when there is nothing to edit.
pub async fn start(chat_id: i64, from: &UserRef, ctx: &Ctx<'_>) -> Res<Option<EditState>> {
    let events = ctx.db.find_approved_upcoming_events_by_submitter(from.id, Utc::now()).await?;

    if events.is_empty() {
        ctx.say(chat_id, texts::NO_EDITABLE_EVENTS).await?;
        return Ok(None);
    }

    let mut keyboard = InlineKeyboard::new();
    for event in &events {
        if let Some(id) = &event.id {
            keyboard = keyboard.text(&event.title, format!("edit_event_{id}")).row();
        }
    }

    ctx.prompt(chat_id, texts::CHOOSE_EVENT_TO_EDIT, keyboard).await?;

    Ok(Some(EditState::ChoosingEvent))
}

/// Advance the dialogue with a button press.
pub async fn on_callback(state: EditState, chat_id: i64, callback_id: &str, data: &str, ctx: &Ctx<'_>) -> Res<Option<EditState>> {
    match state {
        EditState::ChoosingEvent => {
            let Some(event_id) = data.strip_prefix("edit_event_") else {
                ctx.answer(callback_id, None).await?;
                return Ok(Some(EditState::ChoosingEvent));
            };

            let Some(event) = ctx.db.find_event_by_id(event_id).await? else {
                ctx.answer(callback_id, Some(texts::EVENT_NOT_FOUND)).await?;
                return Ok(None);
            };

            ctx.answer(callback_id, None).await?;
            ctx.say(chat_id, texts::CURRENT_EVENT_CONTENT).await?;

            let rendered = render_event(&event, Audience::Channel, ctx.config);
            ctx.chat.send_message(&chat_id.to_string(), &rendered, ParseMode::MarkdownV2, None).await?;

            ask_field_or_finish(event, EventPatch::default(), 0, chat_id, ctx).await
        }
        EditState::Editing { event, mut patch, step } => match step {
            EditStep::AskField(index) => {
                if data == format!("edit_field_{index}") {
                    ctx.answer(callback_id, None).await?;

                    let field = FIELDS[index];
                    if field == EditField::Category {
                        ctx.prompt(chat_id, &field.value_prompt(ctx.config), category_keyboard()).await?;

                        let selected = patch.category.clone().unwrap_or_else(|| event.category.clone());
                        return Ok(Some(EditState::Editing {
                            event,
                            patch,
                            step: EditStep::SelectCategories { field: index, selected },
                        }));
                    }

                    ctx.say(chat_id, &field.value_prompt(ctx.config)).await?;
                    Ok(Some(EditState::Editing {
                        event,
                        patch,
                        step: EditStep::EnterValue(index),
                    }))
                } else if data == format!("skip_field_{index}") {
                    ctx.answer(callback_id, None).await?;
                    ask_field_or_finish(event, patch, index + 1, chat_id, ctx).await
                } else {
                    ctx.answer(callback_id, None).await?;
                    Ok(Some(EditState::Editing {
                        event,
                        patch,
                        step: EditStep::AskField(index),
                    }))
                }
            }
            EditStep::SelectCategories { field, mut selected } => match data {
                "cat_done" => {
                    if selected.is_empty() {
                        ctx.alert(callback_id, texts::CATEGORY_REQUIRED).await?;
                        return Ok(Some(EditState::Editing {
                            event,
                            patch,
                            step: EditStep::SelectCategories { field, selected },
                        }));
                    }

                    ctx.answer(callback_id, Some(texts::CATEGORIES_SAVED)).await?;
                    patch.category = Some(selected);
                    ask_field_or_finish(event, patch, field + 1, chat_id, ctx).await
                }
                "cat_reset" => {
                    selected.clear();
                    ctx.answer(callback_id, Some(texts::CATEGORIES_CLEARED)).await?;
                    Ok(Some(EditState::Editing {
                        event,
                        patch,
                        step: EditStep::SelectCategories { field, selected },
                    }))
                }
                _ => {
                    if let Some(name) = data.strip_prefix("cat_") {
                        if let Some(pos) = selected.iter().position(|c| c == name) {
                            selected.remove(pos);
                        } else {
                            selected.push(name.to_string());
                        }
                    }

                    ctx.answer(callback_id, None).await?;
                    Ok(Some(EditState::Editing {
                        event,
                        patch,
                        step: EditStep::SelectCategories { field, selected },
                    }))
                }
            },
            EditStep::ConfirmSave => match data {
                "save_changes" => {
                    ctx.answer(callback_id, None).await?;
                    save(&event, &patch, chat_id, ctx).await?;
                    Ok(None)
                }
                "discard_changes" => {
                    ctx.answer(callback_id, Some(texts::CHANGES_DISCARDED)).await?;
                    ctx.say(chat_id, texts::CHANGES_DISCARDED).await?;
                    Ok(None)
                }
                _ => {
                    ctx.answer(callback_id, None).await?;
                    Ok(Some(EditState::Editing {
                        event,
                        patch,
                        step: EditStep::ConfirmSave,
                    }))
                }
            },
            // Value entry only reacts to messages.
            step @ EditStep::EnterValue(_) => {
                ctx.answer(callback_id, None).await?;
                Ok(Some(EditState::Editing { event, patch, step }))
            }
        },
    }
}

/// Advance the dialogue with an inbound message.
pub async fn on_message(state: EditState, chat_id: i64, text: Option<&str>, photo_file_id: Option<&str>, ctx: &Ctx<'_>) -> Res<Option<EditState>> {
    let EditState::Editing {
        event,
        mut patch,
        step: EditStep::EnterValue(index),
    } = state
    else {
        return Ok(Some(state));
    };

    let field = FIELDS[index];

    // A fresh photo replaces the image directly.
    if field == EditField::Image
        && let Some(file_id) = photo_file_id
    {
        match ctx.chat.download_file(file_id).await {
            Ok(bytes) => {
                patch.image_base64 = Some(Some(BASE64.encode(bytes)));
                return ask_field_or_finish(event, patch, index + 1, chat_id, ctx).await;
            }
            Err(_) => {
                ctx.say(chat_id, texts::IMAGE_DOWNLOAD_FAILED).await?;
                return Ok(Some(EditState::Editing {
                    event,
                    patch,
                    step: EditStep::EnterValue(index),
                }));
            }
        }
    }

    let Some(text) = text else {
        return Ok(Some(EditState::Editing {
            event,
            patch,
            step: EditStep::EnterValue(index),
        }));
    };

    match field.parse_text(text, &mut patch, &event, ctx.config) {
        Ok(()) => ask_field_or_finish(event, patch, index + 1, chat_id, ctx).await,
        Err(message) => {
            ctx.say(chat_id, message).await?;
            Ok(Some(EditState::Editing {
                event,
                patch,
                step: EditStep::EnterValue(index),
            }))
        }
    }
}

/// Ask about the next field, or close the loop with the save confirmation.
async fn ask_field_or_finish(event: Event, patch: EventPatch, index: usize, chat_id: i64, ctx: &Ctx<'_>) -> Res<Option<EditState>> {
    if let Some(field) = FIELDS.get(index) {
        let keyboard = InlineKeyboard::new()
            .text(format!("{} {}", texts::ICON_EDIT, texts::YES), format!("edit_field_{index}"))
            .text(texts::NO, format!("skip_field_{index}"));

        ctx.prompt(chat_id, &format!("Möchtest du {} ändern?", field.accusative()), keyboard).await?;

        return Ok(Some(EditState::Editing {
            event,
            patch,
            step: EditStep::AskField(index),
        }));
    }

    if patch.is_empty() {
        ctx.say(chat_id, texts::NO_CHANGES).await?;
        return Ok(None);
    }

    let keyboard = InlineKeyboard::new()
        .text(format!("{} {}", texts::ICON_APPROVE, texts::YES), "save_changes")
        .text(format!("{} {}", texts::ICON_REJECT, texts::NO), "discard_changes");

    ctx.prompt(chat_id, &format!("{}\n{}\n\n{}", texts::EDIT_SUMMARY, summary(&patch), texts::ASK_SAVE_CHANGES), keyboard).await?;

    Ok(Some(EditState::Editing {
        event,
        patch,
        step: EditStep::ConfirmSave,
    }))
}

/// Write the patch through the lifecycle engine and re-notify the admins.
///
/// Lifecycle failures (a field combination that only becomes invalid merged,
/// an event deleted or transitioned meanwhile) end the dialogue with a
/// notice rather than escaping it.
async fn save(event: &Event, patch: &EventPatch, chat_id: i64, ctx: &Ctx<'_>) -> Void {
    let Some(event_id) = event.id.as_deref() else {
        ctx.say(chat_id, texts::EVENT_NOT_FOUND).await?;
        return Ok(());
    };

    let updated = match ctx.engine().apply_edit(event_id, patch).await {
        Ok(updated) => updated,
        Err(LifecycleError::Validation { .. }) => {
            ctx.say(chat_id, texts::CHANGES_INVALID).await?;
            return Ok(());
        }
        Err(LifecycleError::NotFound) => {
            ctx.say(chat_id, texts::EVENT_NOT_FOUND).await?;
            return Ok(());
        }
        Err(LifecycleError::InvalidState(_) | LifecycleError::AlreadyPublished) => {
            ctx.say(chat_id, texts::EDIT_NOT_POSSIBLE).await?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    ctx.say(chat_id, texts::CHANGES_SAVED).await?;
    ctx.notifier().notify_admins(&updated, true).await?;

    Ok(())
}

/// The changed field names, one per line.
fn summary(patch: &EventPatch) -> String {
    let mut lines = Vec::new();

    let changed = [
        (patch.title.is_some(), EditField::Title),
        (patch.description.is_some(), EditField::Description),
        (patch.date.is_some(), EditField::StartDate),
        (patch.end_date.is_some(), EditField::EndDate),
        (patch.location.is_some(), EditField::Location),
        (patch.category.is_some(), EditField::Category),
        (patch.links.is_some(), EditField::Links),
        (patch.image_base64.is_some(), EditField::Image),
    ];

    for (is_changed, field) in changed {
        if is_changed {
            lines.push(format!("{} {}", texts::ICON_EDIT, field.name()));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use crate::base::{config::ConfigInner, types::EventStatus};

    use super::*;

    fn config() -> Config {
        Config {
            inner: Arc::new(ConfigInner {
                telegram_token: "token".to_string(),
                admin_chat_id: -100,
                channel_id: "@events".to_string(),
                timezone: "Europe/Berlin".to_string(),
                date_format: "%d.%m.%Y %H:%M".to_string(),
                date_only_format: "%d.%m.%Y".to_string(),
                locale: "de".to_string(),
                db_endpoint: "mem://".to_string(),
                db_username: None,
                db_password: None,
            }),
        }
    }

    fn base_event() -> Event {
        Event {
            id: Some("abc123".to_string()),
            title: "Jazz Night".to_string(),
            description: "An evening of jazz.".to_string(),
            location: "Parkhalle".to_string(),
            date: Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap(),
            category: vec!["Musik".to_string()],
            links: vec![],
            image_base64: None,
            submitted_by_id: 42,
            submitted_by: "alice".to_string(),
            status: EventStatus::Approved,
            rejection_reason: None,
            channel_message_id: Some(17),
        }
    }

    #[test]
    fn end_date_is_checked_against_patched_start() {
        let config = config();
        let base = base_event();
        let mut patch = EventPatch::default();

        // Move the start a week out, then try an end before it.
        EditField::StartDate.parse_text("08.06.2025 19:00", &mut patch, &base, &config).unwrap();
        let err = EditField::EndDate.parse_text("02.06.2025 19:00", &mut patch, &base, &config).unwrap_err();
        assert_eq!(err, texts::INVALID_END_DATE);

        EditField::EndDate.parse_text("08.06.2025 22:00", &mut patch, &base, &config).unwrap();
        assert!(patch.end_date.unwrap() > patch.date.unwrap());
    }

    #[test]
    fn start_date_is_checked_against_the_effective_end() {
        let config = config();
        let base = base_event();
        let mut patch = EventPatch::default();

        // Stored end is 01.06.2025 22:00 Berlin; a later start is refused.
        let err = EditField::StartDate.parse_text("02.06.2025 10:00", &mut patch, &base, &config).unwrap_err();
        assert_eq!(err, texts::START_AFTER_END);
        assert!(patch.date.is_none());

        // Once the end itself is patched further out, the same start passes.
        EditField::EndDate.parse_text("03.06.2025 22:00", &mut patch, &base, &config).unwrap();
        EditField::StartDate.parse_text("02.06.2025 10:00", &mut patch, &base, &config).unwrap();
        assert!(patch.date.unwrap() < patch.end_date.unwrap());
    }

    #[test]
    fn image_text_only_accepts_removal() {
        let config = config();
        let base = base_event();
        let mut patch = EventPatch::default();

        assert!(EditField::Image.parse_text("whatever", &mut patch, &base, &config).is_err());

        EditField::Image.parse_text("no", &mut patch, &base, &config).unwrap();
        assert_eq!(patch.image_base64, Some(None));
    }

    #[test]
    fn summary_lists_only_changed_fields() {
        let patch = EventPatch {
            title: Some("Blues Night".to_string()),
            links: Some(vec![]),
            ..Default::default()
        };

        let summary = summary(&patch);
        assert!(summary.contains("Titel"));
        assert!(summary.contains("Links"));
        assert!(!summary.contains("Beschreibung"));
    }
}
