//! The rejection reason dialogue, running in the admin chat.
//!
//! Opened when an admin presses a reject button; the next text message in
//! the admin chat becomes the rejection reason.

use crate::{
    base::{texts, types::Res},
    domain::LifecycleError,
};

use super::Ctx;

/// Suspended state of one rejection dialogue.
#[derive(Debug, Clone)]
pub struct RejectState {
    pub event_id: String,
}

/// Take the typed reason, reject the event, and tell the submitter.
pub async fn on_message(state: RejectState, chat_id: i64, text: Option<&str>, ctx: &Ctx<'_>) -> Res<Option<RejectState>> {
    let Some(reason) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        ctx.say(chat_id, texts::ASK_REJECTION_REASON).await?;
        return Ok(Some(state));
    };

    match ctx.engine().request_rejection(&state.event_id, reason).await {
        Ok(event) => {
            ctx.notifier().notify_submitter(&event, reason).await;
            ctx.say(chat_id, texts::REJECTION_DONE).await?;
            Ok(None)
        }
        Err(LifecycleError::NotFound) => {
            ctx.say(chat_id, texts::EVENT_NOT_FOUND).await?;
            Ok(None)
        }
        Err(LifecycleError::InvalidState(_)) => {
            ctx.say(chat_id, texts::REJECTION_FAILED).await?;
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
