//! Error taxonomy for the event lifecycle.

use crate::base::types::EventStatus;

/// Everything that can go wrong while moving an event through its lifecycle.
///
/// Validation failures are recovered by re-prompting the offending workflow
/// step; the remaining variants surface as a single user-visible notice.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// A submitted field violates the data-model invariants.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The referenced event does not exist.
    #[error("event not found")]
    NotFound,

    /// The event has already been published to the channel.
    #[error("event has already been published")]
    AlreadyPublished,

    /// The requested transition is not legal from the current status.
    #[error("operation not allowed in status {0}")]
    InvalidState(EventStatus),

    /// The store adapter failed.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl LifecycleError {
    pub fn validation(field: &'static str, message: String) -> Self {
        LifecycleError::Validation { field, message }
    }
}
