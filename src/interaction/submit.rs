//! The submission dialogue.
//!
//! One field per step; a value that fails its check re-prompts the same step
//! without losing anything collected so far. The finished draft goes through
//! the lifecycle engine, which re-validates the whole record before it is
//! persisted as pending.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};

use crate::{
    base::{
        config::Config,
        texts,
        types::{Res, Void},
    },
    domain::{
        EventDraft, LifecycleError,
        event::{DESCRIPTION_MAX, LINKS_MAX, LOCATION_MIN, TITLE_MAX},
    },
    format::dates::parse_in_tz,
    service::chat::{InlineKeyboard, UserRef},
};

use super::{Ctx, category_keyboard, date_example};

/// Suspended state of one submission dialogue.
#[derive(Debug, Clone)]
pub struct SubmitState {
    pub draft: EventDraft,
    pub step: SubmitStep,
}

/// The field the dialogue is currently waiting for.
#[derive(Debug, Clone)]
pub enum SubmitStep {
    Title,
    Description,
    Location,
    StartDate,
    EndDate { start: DateTime<Utc> },
    ConfirmDates { start: DateTime<Utc>, end: DateTime<Utc> },
    Category,
    Links,
    Image,
}

/// Open the dialogue: ask for the title.
pub async fn start(chat_id: i64, from: &UserRef, ctx: &Ctx<'_>) -> Res<SubmitState> {
    ctx.say(chat_id, texts::ASK_TITLE).await?;

    Ok(SubmitState {
        draft: EventDraft::new(from.id, from.display_name.clone()),
        step: SubmitStep::Title,
    })
}

/// Advance the dialogue with an inbound message.
pub async fn on_message(mut state: SubmitState, chat_id: i64, text: Option<&str>, photo_file_id: Option<&str>, ctx: &Ctx<'_>) -> Res<Option<SubmitState>> {
    match state.step {
        SubmitStep::Title => {
            let Some(title) = accepted_text(text, |t| t.chars().count() <= TITLE_MAX) else {
                ctx.say(chat_id, texts::TITLE_TOO_LONG).await?;
                return Ok(Some(state));
            };

            state.draft.title = Some(title);
            state.step = SubmitStep::Description;
            ctx.say(chat_id, texts::ASK_DESCRIPTION).await?;
        }
        SubmitStep::Description => {
            let Some(description) = accepted_text(text, |t| t.chars().count() <= DESCRIPTION_MAX) else {
                ctx.say(chat_id, texts::DESCRIPTION_TOO_LONG).await?;
                return Ok(Some(state));
            };

            state.draft.description = Some(description);
            state.step = SubmitStep::Location;
            ctx.say(chat_id, texts::ASK_LOCATION).await?;
        }
        SubmitStep::Location => {
            let Some(location) = accepted_text(text, |t| t.chars().count() >= LOCATION_MIN) else {
                ctx.say(chat_id, texts::LOCATION_TOO_SHORT).await?;
                return Ok(Some(state));
            };

            state.draft.location = Some(location);
            state.step = SubmitStep::StartDate;
            ctx.say(chat_id, &ask_start_date(ctx.config)).await?;
        }
        SubmitStep::StartDate => {
            let parsed = text.and_then(|t| parse_in_tz(t, &ctx.config.date_format, ctx.config.tz()));

            let Some(start) = parsed else {
                ctx.say(chat_id, texts::INVALID_START_DATE).await?;
                ctx.say(chat_id, &ask_start_date(ctx.config)).await?;
                return Ok(Some(state));
            };

            state.step = SubmitStep::EndDate { start };
            ctx.say(chat_id, &ask_end_date(ctx.config)).await?;
        }
        SubmitStep::EndDate { start } => {
            let parsed = text.and_then(|t| parse_in_tz(t, &ctx.config.date_format, ctx.config.tz()));

            // The end must lie strictly after the start.
            let Some(end) = parsed.filter(|end| *end > start) else {
                ctx.say(chat_id, texts::INVALID_END_DATE).await?;
                ctx.say(chat_id, &ask_end_date(ctx.config)).await?;
                return Ok(Some(state));
            };

            let keyboard = InlineKeyboard::new()
                .text(format!("{} {}", texts::ICON_APPROVE, texts::CONFIRM_DATES), "dates_confirm")
                .text(format!("{} {}", texts::ICON_RESET, texts::RESET_DATES), "dates_reset");

            ctx.prompt(chat_id, &dates_summary(start, end, ctx.config), keyboard).await?;
            state.step = SubmitStep::ConfirmDates { start, end };
        }
        SubmitStep::Links => {
            let Some(text) = text else {
                return Ok(Some(state));
            };

            state.draft.links = parse_links(text);
            state.step = SubmitStep::Image;
            ctx.say(chat_id, texts::ASK_IMAGE).await?;
        }
        SubmitStep::Image => {
            if let Some(file_id) = photo_file_id {
                match ctx.chat.download_file(file_id).await {
                    Ok(bytes) => state.draft.image_base64 = Some(BASE64.encode(bytes)),
                    Err(_) => {
                        ctx.say(chat_id, texts::IMAGE_DOWNLOAD_FAILED).await?;
                        return Ok(Some(state));
                    }
                }
            } else if !matches!(text.map(str::trim), Some("no")) {
                ctx.say(chat_id, texts::IMAGE_INVALID).await?;
                return Ok(Some(state));
            }

            finish(&state.draft, chat_id, ctx).await?;
            return Ok(None);
        }
        // These steps only react to button presses.
        SubmitStep::ConfirmDates { .. } | SubmitStep::Category => {}
    }

    Ok(Some(state))
}

/// Advance the dialogue with a button press.
pub async fn on_callback(mut state: SubmitState, chat_id: i64, callback_id: &str, data: &str, ctx: &Ctx<'_>) -> Res<Option<SubmitState>> {
    match (&state.step, data) {
        (SubmitStep::ConfirmDates { start, end }, "dates_confirm") => {
            state.draft.date = Some(*start);
            state.draft.end_date = Some(*end);

            ctx.answer(callback_id, Some(texts::DATES_SAVED)).await?;
            ctx.prompt(chat_id, texts::ASK_CATEGORY, category_keyboard()).await?;
            state.step = SubmitStep::Category;
        }
        (SubmitStep::ConfirmDates { .. }, "dates_reset") => {
            ctx.answer(callback_id, Some(texts::DATES_RESET)).await?;
            ctx.say(chat_id, &ask_start_date(ctx.config)).await?;
            state.step = SubmitStep::StartDate;
        }
        (SubmitStep::Category, "cat_done") => {
            if state.draft.category.is_empty() {
                ctx.alert(callback_id, texts::CATEGORY_REQUIRED).await?;
                return Ok(Some(state));
            }

            ctx.answer(callback_id, Some(texts::CATEGORIES_SAVED)).await?;
            ctx.say(chat_id, texts::ASK_LINKS).await?;
            state.step = SubmitStep::Links;
        }
        (SubmitStep::Category, "cat_reset") => {
            state.draft.reset_categories();
            ctx.answer(callback_id, Some(texts::CATEGORIES_CLEARED)).await?;
        }
        (SubmitStep::Category, _) if data.starts_with("cat_") => {
            let name = data.trim_start_matches("cat_");
            state.draft.toggle_category(name);
            ctx.answer(callback_id, None).await?;
        }
        _ => {
            ctx.answer(callback_id, None).await?;
        }
    }

    Ok(Some(state))
}

/// Persist the finished draft and hand it to the admins.
///
/// Every field was validated at its step, so a validation failure here is
/// unexpected; it still ends the dialogue with a notice instead of leaving
/// the user without an answer.
async fn finish(draft: &EventDraft, chat_id: i64, ctx: &Ctx<'_>) -> Void {
    let event = match ctx.engine().submit(draft).await {
        Ok(event) => event,
        Err(LifecycleError::Validation { .. }) => {
            ctx.say(chat_id, texts::SUBMISSION_INVALID).await?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    ctx.say(chat_id, texts::SUBMISSION_RECEIVED).await?;
    ctx.notifier().notify_admins(&event, false).await?;

    Ok(())
}

fn accepted_text(text: Option<&str>, check: impl Fn(&str) -> bool) -> Option<String> {
    text.map(str::trim).filter(|t| !t.is_empty() && check(t)).map(str::to_string)
}

/// Up to two whitespace-separated links; "no" means none.
fn parse_links(text: &str) -> Vec<String> {
    if text.trim().eq_ignore_ascii_case("no") {
        return Vec::new();
    }

    text.split_whitespace().take(LINKS_MAX).map(str::to_string).collect()
}

fn ask_start_date(config: &Config) -> String {
    format!("Bitte gib das Startdatum ein (z.B. {}):", date_example(config, true))
}

fn ask_end_date(config: &Config) -> String {
    format!("Bitte gib das Enddatum ein (z.B. {}):", date_example(config, true))
}

fn dates_summary(start: DateTime<Utc>, end: DateTime<Utc>, config: &Config) -> String {
    let tz = config.tz();
    let locale = config.chrono_locale();

    format!(
        "{} Start: {}\n{} Ende: {}",
        texts::ICON_DATE,
        crate::format::dates::format_in_tz(start, tz, &config.date_format, locale),
        texts::ICON_DATE,
        crate::format::dates::format_in_tz(end, tz, &config.date_format, locale),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_input_accepts_no_and_limits_count() {
        assert!(parse_links("no").is_empty());
        assert!(parse_links(" NO ").is_empty());

        let links = parse_links("https://a.example https://b.example https://c.example");
        assert_eq!(links.len(), LINKS_MAX);
        assert_eq!(links[0], "https://a.example");
    }

    #[test]
    fn text_acceptance_trims_and_checks() {
        assert_eq!(accepted_text(Some("  hi  "), |t| t.len() >= 2), Some("hi".to_string()));
        assert_eq!(accepted_text(Some("x"), |t| t.len() >= 2), None);
        assert_eq!(accepted_text(None, |_| true), None);
        assert_eq!(accepted_text(Some("   "), |_| true), None);
    }
}
