use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Review status of an event.
///
/// New submissions start out as `Pending`; edits of an already published
/// event move it back to `EditedPending` so the change goes through review
/// again. `Rejected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
    EditedPending,
    EditedApproved,
}

impl EventStatus {
    /// Whether the event has passed review and lives in the channel.
    pub fn is_published(&self) -> bool {
        matches!(self, EventStatus::Approved | EventStatus::EditedApproved)
    }

    /// Whether the event is waiting for an admin decision.
    pub fn is_pending(&self) -> bool {
        matches!(self, EventStatus::Pending | EventStatus::EditedPending)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventStatus::Pending => "PENDING",
            EventStatus::Approved => "APPROVED",
            EventStatus::Rejected => "REJECTED",
            EventStatus::EditedPending => "EDITED_PENDING",
            EventStatus::EditedApproved => "EDITED_APPROVED",
        };
        write!(f, "{name}")
    }
}
