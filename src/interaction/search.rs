//! The event search dialogue.
//!
//! A small menu loop: today, tomorrow, or a specific date. Each query sends
//! the matching published events and then re-offers the menu until the user
//! exits.

use chrono::{Duration, NaiveDate};

use crate::{
    base::{
        config::Config,
        texts,
        types::{Res, Void},
    },
    format::dates::{day_bounds, parse_date_only, today_in},
    service::chat::InlineKeyboard,
};

use super::{Ctx, date_example};

/// Suspended state of one search dialogue.
#[derive(Debug, Clone)]
pub enum SearchState {
    /// The option menu is showing; its message ID allows keyboard removal.
    Menu { message_id: i64 },
    /// Waiting for a typed date.
    AwaitDate,
}

/// Open the dialogue with the option menu.
pub async fn start(chat_id: i64, ctx: &Ctx<'_>) -> Res<SearchState> {
    let message_id = show_menu(chat_id, ctx).await?;
    Ok(SearchState::Menu { message_id })
}

/// Advance the dialogue with a button press.
pub async fn on_callback(state: SearchState, chat_id: i64, callback_id: &str, data: &str, ctx: &Ctx<'_>) -> Res<Option<SearchState>> {
    let SearchState::Menu { message_id } = state else {
        ctx.answer(callback_id, None).await?;
        return Ok(Some(state));
    };

    let chat = chat_id.to_string();

    match data {
        "search_today" => {
            ctx.answer(callback_id, None).await?;
            // The menu is one-shot; drop its keyboard before acting.
            ctx.chat.edit_message_reply_markup(&chat, message_id, None).await?;

            run_day_search(today_in(ctx.config.tz()), chat_id, ctx).await?;

            let message_id = show_menu(chat_id, ctx).await?;
            Ok(Some(SearchState::Menu { message_id }))
        }
        "search_tomorrow" => {
            ctx.answer(callback_id, None).await?;
            ctx.chat.edit_message_reply_markup(&chat, message_id, None).await?;

            run_day_search(today_in(ctx.config.tz()) + Duration::days(1), chat_id, ctx).await?;

            let message_id = show_menu(chat_id, ctx).await?;
            Ok(Some(SearchState::Menu { message_id }))
        }
        "search_specific" => {
            ctx.answer(callback_id, None).await?;
            ctx.chat.edit_message_reply_markup(&chat, message_id, None).await?;

            ctx.say(chat_id, &ask_date(ctx.config)).await?;
            Ok(Some(SearchState::AwaitDate))
        }
        "search_exit" => {
            ctx.answer(callback_id, Some(texts::SEARCH_ENDED)).await?;
            ctx.chat.edit_message_reply_markup(&chat, message_id, None).await?;

            ctx.say(chat_id, texts::SEARCH_FINISHED).await?;
            Ok(None)
        }
        _ => {
            ctx.answer(callback_id, None).await?;
            Ok(Some(SearchState::Menu { message_id }))
        }
    }
}

/// Advance the dialogue with an inbound message.
pub async fn on_message(state: SearchState, chat_id: i64, text: Option<&str>, ctx: &Ctx<'_>) -> Res<Option<SearchState>> {
    let SearchState::AwaitDate = state else {
        return Ok(Some(state));
    };

    let parsed = text.and_then(|t| parse_date_only(t, &ctx.config.date_only_format));

    let Some(day) = parsed else {
        ctx.say(chat_id, texts::INVALID_SEARCH_DATE).await?;
        ctx.say(chat_id, &ask_date(ctx.config)).await?;
        return Ok(Some(SearchState::AwaitDate));
    };

    run_day_search(day, chat_id, ctx).await?;

    let message_id = show_menu(chat_id, ctx).await?;
    Ok(Some(SearchState::Menu { message_id }))
}

/// Query the published events overlapping the day and send them out.
async fn run_day_search(day: NaiveDate, chat_id: i64, ctx: &Ctx<'_>) -> Void {
    let (start, end) = day_bounds(day, ctx.config.tz());
    let events = ctx.db.find_published_events_overlapping_day(start, end).await?;

    let label = day.format(&ctx.config.date_only_format).to_string();
    ctx.notifier().send_search_results(&events, &label, chat_id).await
}

async fn show_menu(chat_id: i64, ctx: &Ctx<'_>) -> Res<i64> {
    let keyboard = InlineKeyboard::new()
        .text(texts::SEARCH_TODAY, "search_today")
        .text(texts::SEARCH_TOMORROW, "search_tomorrow")
        .row()
        .text(format!("{} {}", texts::ICON_DATE, texts::SEARCH_SPECIFIC), "search_specific")
        .text(texts::SEARCH_EXIT, "search_exit");

    ctx.prompt(chat_id, texts::CHOOSE_SEARCH_OPTION, keyboard).await
}

fn ask_date(config: &Config) -> String {
    format!("Bitte gib das Datum ein (z.B. {}):", date_example(config, false))
}
