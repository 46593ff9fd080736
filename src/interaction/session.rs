//! Per-chat dialogue sessions.
//!
//! Every dialogue is an explicit resumable state machine: the current step
//! plus the accumulated partial input live here, keyed by chat, and each
//! inbound update advances the machine by one step. Different chats are
//! independent and share nothing but the store.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use super::{edit::EditState, reject::RejectState, search::SearchState, submit::SubmitState};

/// The suspended state of one chat's active dialogue.
#[derive(Debug, Clone)]
pub enum Dialogue {
    Submit(SubmitState),
    Edit(EditState),
    Search(SearchState),
    Reject(RejectState),
}

/// In-process store of suspended dialogues, keyed by chat ID.
///
/// Trivially cloneable; handlers `take` the dialogue, advance it, and `put`
/// it back while it is still live.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<i64, Dialogue>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the active dialogue of a chat, if any.
    pub async fn take(&self, chat_id: i64) -> Option<Dialogue> {
        self.inner.lock().await.remove(&chat_id)
    }

    /// Suspend a dialogue for the next inbound update of the chat.
    ///
    /// Starting a new dialogue replaces whatever was active before.
    pub async fn put(&self, chat_id: i64, dialogue: Dialogue) {
        self.inner.lock().await.insert(chat_id, dialogue);
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::EventDraft;

    use super::{super::submit::SubmitStep, *};

    #[tokio::test]
    async fn take_removes_the_dialogue() {
        let store = SessionStore::new();

        let state = SubmitState {
            draft: EventDraft::new(1, "alice".to_string()),
            step: SubmitStep::Title,
        };
        store.put(7, Dialogue::Submit(state)).await;

        assert!(store.take(7).await.is_some());
        assert!(store.take(7).await.is_none());
    }
}
