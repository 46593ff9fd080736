//! The event entity and its validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::base::types::EventStatus;

use super::error::LifecycleError;

/// Maximum title length.
pub const TITLE_MAX: usize = 65;
/// Maximum description length. Telegram caps photo captions at 1024
/// characters; 600 leaves headroom for the rendered frame around it.
pub const DESCRIPTION_MAX: usize = 600;
/// Minimum location length.
pub const LOCATION_MIN: usize = 3;
/// Maximum number of external links.
pub const LINKS_MAX: usize = 2;

/// The fixed set of selectable categories.
pub const CATEGORIES: [&str; 7] = ["Tanz", "Musik", "Konzert", "Unterhaltung", "Politisch", "Sport", "Bildung"];

/// A community event as submitted through the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Record ID, assigned by the store on creation.
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Start of the event.
    pub date: DateTime<Utc>,
    /// End of the event; strictly after `date`.
    pub end_date: DateTime<Utc>,
    /// Selected categories, at least one.
    pub category: Vec<String>,
    /// Up to [`LINKS_MAX`] external links.
    pub links: Vec<String>,
    /// Optional event image, base64-encoded at rest.
    pub image_base64: Option<String>,
    /// Chat ID of the submitter, used for direct notifications.
    pub submitted_by_id: i64,
    /// Display name of the submitter.
    pub submitted_by: String,
    pub status: EventStatus,
    /// Reason given by the rejecting admin, if any.
    pub rejection_reason: Option<String>,
    /// Message ID of the channel post; set once published.
    pub channel_message_id: Option<i64>,
}

impl Event {
    /// Check the data-model invariants, naming the first offending field.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        if self.title.is_empty() || self.title.chars().count() > TITLE_MAX {
            return Err(LifecycleError::validation("title", format!("must be 1..={TITLE_MAX} characters")));
        }

        if self.description.chars().count() > DESCRIPTION_MAX {
            return Err(LifecycleError::validation("description", format!("must be at most {DESCRIPTION_MAX} characters")));
        }

        if self.location.chars().count() < LOCATION_MIN {
            return Err(LifecycleError::validation("location", format!("must be at least {LOCATION_MIN} characters")));
        }

        if self.end_date <= self.date {
            return Err(LifecycleError::validation("end_date", "must be after the start date".to_string()));
        }

        if self.category.is_empty() {
            return Err(LifecycleError::validation("category", "at least one category is required".to_string()));
        }

        if self.links.len() > LINKS_MAX {
            return Err(LifecycleError::validation("links", format!("at most {LINKS_MAX} links are allowed")));
        }

        Ok(())
    }
}

/// A partial update to an event, as produced by the edit workflow.
///
/// `None` fields are left untouched. The image is doubly optional so an edit
/// can distinguish "keep the image" from "remove the image".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_message_id: Option<i64>,
}

impl EventPatch {
    /// Whether the patch carries any user-editable change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.date.is_none()
            && self.end_date.is_none()
            && self.category.is_none()
            && self.links.is_none()
            && self.image_base64.is_none()
    }

    /// Apply the patch to an in-memory copy of the event.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(location) = &self.location {
            event.location = location.clone();
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(end_date) = self.end_date {
            event.end_date = end_date;
        }
        if let Some(category) = &self.category {
            event.category = category.clone();
        }
        if let Some(links) = &self.links {
            event.links = links.clone();
        }
        if let Some(image) = &self.image_base64 {
            event.image_base64 = image.clone();
        }
        if let Some(status) = self.status {
            event.status = status;
        }
        if let Some(reason) = &self.rejection_reason {
            event.rejection_reason = Some(reason.clone());
        }
        if let Some(message_id) = self.channel_message_id {
            event.channel_message_id = Some(message_id);
        }
    }

    /// The event as it would look with the patch applied.
    pub fn merged(&self, event: &Event) -> Event {
        let mut merged = event.clone();
        self.apply_to(&mut merged);
        merged
    }
}
