//! Admin review decisions, triggered from the review card buttons.

use tracing::error;

use crate::{
    base::{texts, types::Void},
    domain::LifecycleError,
    format::markdown::escape_text,
    service::chat::ParseMode,
};

use super::{Ctx, reject::RejectState};

/// Approve an event and deliver it to the channel.
///
/// Lifecycle conflicts (gone, already published, wrong status) surface as
/// alert popups on the pressed button; a delivery failure after a successful
/// status transition is reported but leaves the record approved, so pressing
/// approve again retries the delivery.
pub async fn handle_approval(event_id: &str, callback_id: &str, chat_id: i64, ctx: &Ctx<'_>) -> Void {
    let event = match ctx.engine().request_approval(event_id).await {
        Ok(event) => event,
        Err(LifecycleError::NotFound) => return ctx.alert(callback_id, texts::EVENT_NOT_FOUND).await,
        Err(LifecycleError::AlreadyPublished) => return ctx.alert(callback_id, texts::EVENT_ALREADY_PUBLISHED).await,
        Err(LifecycleError::InvalidState(_)) => return ctx.alert(callback_id, texts::EVENT_UNKNOWN_STATUS).await,
        Err(err) => return Err(err.into()),
    };

    if let Err(err) = ctx.notifier().deliver(&event).await {
        error!("Delivering event {} failed: {}", event_id, err);
        return ctx.alert(callback_id, texts::PUBLISH_FAILED).await;
    }

    ctx.answer(callback_id, Some(texts::EVENT_PUBLISHED)).await?;

    let confirmation = format!(
        "{} Die Veranstaltung \"{}\" wurde erfolgreich im Kanal {} veröffentlicht\\!",
        texts::ICON_APPROVE,
        escape_text(&event.title),
        escape_text(&ctx.config.channel_id),
    );
    ctx.chat.send_message(&chat_id.to_string(), &confirmation, ParseMode::MarkdownV2, None).await?;

    Ok(())
}

/// Open the rejection reason dialogue for an event, if it still exists.
pub async fn handle_rejection(event_id: &str, callback_id: &str, chat_id: i64, ctx: &Ctx<'_>) -> crate::base::types::Res<Option<RejectState>> {
    if ctx.db.find_event_by_id(event_id).await?.is_none() {
        ctx.alert(callback_id, texts::EVENT_NOT_FOUND).await?;
        return Ok(None);
    }

    ctx.answer(callback_id, None).await?;
    ctx.say(chat_id, texts::ASK_REJECTION_REASON).await?;

    Ok(Some(RejectState {
        event_id: event_id.to_string(),
    }))
}
