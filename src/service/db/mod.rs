//! Storage of event records.

pub mod surreal;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    base::types::{EventStatus, Res},
    domain::{Event, EventPatch},
};

// Traits.

/// Generic database client trait that storage backends must implement.
///
/// The store exclusively owns persisted event records; everything else holds
/// transient copies. Per-record updates are atomic, and status transitions go
/// through [`GenericDbClient::update_status_if`] so two concurrent admin
/// decisions cannot both land.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Persist a new event and return it with its assigned ID.
    async fn create_event(&self, event: &Event) -> Res<Event>;

    /// Fetch an event by ID.
    async fn find_event_by_id(&self, id: &str) -> Res<Option<Event>>;

    /// Apply a partial update to an event; fails if the ID is unknown.
    async fn update_event_fields(&self, id: &str, patch: &EventPatch) -> Res<Event>;

    /// Set the status, but only while the current status is one of `expected`.
    ///
    /// Returns `None` when the guard does not hold (including unknown IDs),
    /// leaving the record untouched.
    async fn update_status_if(&self, id: &str, expected: &[EventStatus], new: EventStatus) -> Res<Option<Event>>;

    /// Reject an event, writing status and reason in one guarded update.
    ///
    /// Same guard semantics as [`GenericDbClient::update_status_if`]: `None`
    /// when the event is not awaiting review, with nothing written.
    async fn reject_event_if_pending(&self, id: &str, reason: &str) -> Res<Option<Event>>;

    /// Record the channel message reference after a successful publication.
    async fn set_channel_message_id(&self, id: &str, message_id: i64) -> Res<Event>;

    /// Published events whose [start, end] interval overlaps the given UTC
    /// window, ascending by start time.
    async fn find_published_events_overlapping_day(&self, day_start: DateTime<Utc>, day_end: DateTime<Utc>) -> Res<Vec<Event>>;

    /// Published upcoming events of one submitter, ascending by start time.
    async fn find_approved_upcoming_events_by_submitter(&self, submitter_id: i64, now: DateTime<Utc>) -> Res<Vec<Event>>;
}

// Structs.

/// Database client for the application.
///
/// This is trivially cloneable and can be passed around without the need for
/// `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}
