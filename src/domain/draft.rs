//! Incrementally filled event submission.

use chrono::{DateTime, Utc};

use crate::base::types::EventStatus;

use super::{error::LifecycleError, event::Event};

/// A partially collected event, filled in one field per workflow step.
///
/// The intake workflow keeps the draft inside the dialogue session so a
/// validation failure on one step never loses previously accepted fields.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub submitted_by_id: i64,
    pub submitted_by: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub category: Vec<String>,
    pub links: Vec<String>,
    pub image_base64: Option<String>,
}

impl EventDraft {
    pub fn new(submitted_by_id: i64, submitted_by: String) -> Self {
        Self {
            submitted_by_id,
            submitted_by,
            ..Default::default()
        }
    }

    /// Toggle a category selection. Selecting adds, re-selecting removes.
    ///
    /// Returns `true` when the category is selected afterwards.
    pub fn toggle_category(&mut self, name: &str) -> bool {
        if let Some(pos) = self.category.iter().position(|c| c == name) {
            self.category.remove(pos);
            false
        } else {
            self.category.push(name.to_string());
            true
        }
    }

    pub fn reset_categories(&mut self) {
        self.category.clear();
    }

    /// Turn the draft into a `Pending` event, enforcing all invariants.
    pub fn finish(&self) -> Result<Event, LifecycleError> {
        let event = Event {
            id: None,
            title: self.title.clone().ok_or_else(|| LifecycleError::validation("title", "missing".to_string()))?,
            description: self.description.clone().unwrap_or_default(),
            location: self.location.clone().ok_or_else(|| LifecycleError::validation("location", "missing".to_string()))?,
            date: self.date.ok_or_else(|| LifecycleError::validation("date", "missing".to_string()))?,
            end_date: self.end_date.ok_or_else(|| LifecycleError::validation("end_date", "missing".to_string()))?,
            category: self.category.clone(),
            links: self.links.clone(),
            image_base64: self.image_base64.clone(),
            submitted_by_id: self.submitted_by_id,
            submitted_by: self.submitted_by.clone(),
            status: EventStatus::Pending,
            rejection_reason: None,
            channel_message_id: None,
        };

        event.validate()?;

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_toggle_is_idempotent() {
        let mut draft = EventDraft::new(1, "alice".to_string());

        assert!(draft.toggle_category("Musik"));
        assert!(draft.toggle_category("Tanz"));
        assert_eq!(draft.category, vec!["Musik", "Tanz"]);

        // Re-selecting removes, returning to the prior set.
        assert!(!draft.toggle_category("Tanz"));
        assert_eq!(draft.category, vec!["Musik"]);
    }

    #[test]
    fn finish_requires_all_mandatory_fields() {
        let draft = EventDraft::new(1, "alice".to_string());
        assert!(matches!(draft.finish(), Err(LifecycleError::Validation { .. })));
    }
}
