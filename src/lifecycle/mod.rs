//! The event lifecycle state machine.
//!
//! Transitions over [`EventStatus`]:
//!
//! ```text
//! PENDING        --approve--> APPROVED          (new channel post)
//! PENDING        --reject -->  REJECTED          (terminal)
//! EDITED_PENDING --approve--> EDITED_APPROVED   (update of the existing post)
//! EDITED_PENDING --reject -->  REJECTED          (terminal)
//! APPROVED / EDITED_APPROVED --edit--> EDITED_PENDING
//! ```
//!
//! No transition skips review. The engine only mutates state through the
//! store adapter; delivering notifications is the caller's next step and is
//! deliberately not transactional with the status write (a crash in between
//! leaves a record that is published-by-status but has no channel message
//! reference, which the notifier treats as "not yet published").

use tracing::instrument;

use crate::{
    base::types::EventStatus,
    domain::{Event, EventDraft, EventPatch, LifecycleError},
    service::db::DbClient,
};

/// Validates and applies lifecycle transitions.
#[derive(Clone)]
pub struct Engine {
    db: DbClient,
}

impl Engine {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }

    /// Validate a finished draft and persist it as `PENDING`.
    #[instrument(skip_all)]
    pub async fn submit(&self, draft: &EventDraft) -> Result<Event, LifecycleError> {
        let event = draft.finish()?;

        Ok(self.db.create_event(&event).await?)
    }

    /// Approve a pending event.
    ///
    /// The transition is a conditional update on the current status, so two
    /// admins approving concurrently cannot both succeed; the loser observes
    /// [`LifecycleError::AlreadyPublished`].
    #[instrument(skip(self))]
    pub async fn request_approval(&self, event_id: &str) -> Result<Event, LifecycleError> {
        let event = self.db.find_event_by_id(event_id).await?.ok_or(LifecycleError::NotFound)?;

        let target = match event.status {
            EventStatus::Pending => EventStatus::Approved,
            EventStatus::EditedPending => EventStatus::EditedApproved,
            EventStatus::Approved | EventStatus::EditedApproved => return Err(LifecycleError::AlreadyPublished),
            status => return Err(LifecycleError::InvalidState(status)),
        };

        self.db
            .update_status_if(event_id, &[event.status], target)
            .await?
            .ok_or(LifecycleError::AlreadyPublished)
    }

    /// Reject a pending event, storing the reason. Terminal.
    ///
    /// Status and reason are written in one guarded store update, so there is
    /// no window in which the event is rejected without its reason.
    #[instrument(skip(self, reason))]
    pub async fn request_rejection(&self, event_id: &str, reason: &str) -> Result<Event, LifecycleError> {
        let event = self.db.find_event_by_id(event_id).await?.ok_or(LifecycleError::NotFound)?;

        if !event.status.is_pending() {
            return Err(LifecycleError::InvalidState(event.status));
        }

        self.db
            .reject_event_if_pending(event_id, reason)
            .await?
            .ok_or(LifecycleError::InvalidState(event.status))
    }

    /// Apply an edit to a published event, sending it back to review.
    ///
    /// Writes only the supplied field subset and forces `EDITED_PENDING`.
    #[instrument(skip(self, changes))]
    pub async fn apply_edit(&self, event_id: &str, changes: &EventPatch) -> Result<Event, LifecycleError> {
        let event = self.db.find_event_by_id(event_id).await?.ok_or(LifecycleError::NotFound)?;

        if !event.status.is_published() {
            return Err(LifecycleError::InvalidState(event.status));
        }

        // The merged record must still satisfy all invariants.
        changes.merged(&event).validate()?;

        let mut patch = changes.clone();
        patch.status = Some(EventStatus::EditedPending);

        Ok(self.db.update_event_fields(event_id, &patch).await?)
    }
}
