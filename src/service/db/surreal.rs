//! SurrealDB implementation of the event store.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{
    Surreal,
    engine::any::{Any, connect},
    opt::auth::Root,
    sql::{Datetime, Thing},
};
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{EventStatus, Res},
    },
    domain::{Event, EventPatch},
};

use super::{DbClient, GenericDbClient};

// Extra constructors on `DbClient` provided by the surreal implementation.

impl DbClient {
    /// Connect to the endpoint configured in `db_endpoint`.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealDbClient::new(config).await?;
        Ok(Self::new(Arc::new(client)))
    }

    /// An embedded in-memory instance, used by tests.
    pub async fn memory() -> Res<Self> {
        let client = SurrealDbClient::memory().await?;
        Ok(Self::new(Arc::new(client)))
    }
}

// Structs.

/// SurrealDB-backed event store.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
}

/// An event row as stored in SurrealDB.
///
/// Dates are `sql::Datetime` so range comparisons in queries operate on real
/// datetimes rather than strings.
#[derive(Debug, Serialize, Deserialize)]
struct EventRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Thing>,
    title: String,
    description: String,
    location: String,
    date: Datetime,
    end_date: Datetime,
    category: Vec<String>,
    links: Vec<String>,
    image_base64: Option<String>,
    submitted_by_id: i64,
    submitted_by: String,
    status: EventStatus,
    rejection_reason: Option<String>,
    channel_message_id: Option<i64>,
}

/// Mirror of [`EventPatch`] with store-level date types, fed to `merge`.
#[derive(Debug, Serialize)]
struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    links: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_base64: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_message_id: Option<i64>,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        Self {
            id: None,
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            date: event.date.into(),
            end_date: event.end_date.into(),
            category: event.category.clone(),
            links: event.links.clone(),
            image_base64: event.image_base64.clone(),
            submitted_by_id: event.submitted_by_id,
            submitted_by: event.submitted_by.clone(),
            status: event.status,
            rejection_reason: event.rejection_reason.clone(),
            channel_message_id: event.channel_message_id,
        }
    }
}

impl From<EventRecord> for Event {
    fn from(record: EventRecord) -> Self {
        Self {
            id: record.id.map(|thing| thing.id.to_raw()),
            title: record.title,
            description: record.description,
            location: record.location,
            date: record.date.into(),
            end_date: record.end_date.into(),
            category: record.category,
            links: record.links,
            image_base64: record.image_base64,
            submitted_by_id: record.submitted_by_id,
            submitted_by: record.submitted_by,
            status: record.status,
            rejection_reason: record.rejection_reason,
            channel_message_id: record.channel_message_id,
        }
    }
}

impl From<&EventPatch> for RecordPatch {
    fn from(patch: &EventPatch) -> Self {
        Self {
            title: patch.title.clone(),
            description: patch.description.clone(),
            location: patch.location.clone(),
            date: patch.date.map(Into::into),
            end_date: patch.end_date.map(Into::into),
            category: patch.category.clone(),
            links: patch.links.clone(),
            image_base64: patch.image_base64.clone(),
            status: patch.status,
            rejection_reason: patch.rejection_reason.clone(),
            channel_message_id: patch.channel_message_id,
        }
    }
}

impl SurrealDbClient {
    /// Connect and initialize the schema.
    #[instrument(name = "SurrealDbClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let db = connect(&config.db_endpoint).await?;

        if let (Some(username), Some(password)) = (&config.db_username, &config.db_password) {
            db.signin(Root { username, password }).await?;
        }

        Self::init(db).await
    }

    /// An embedded in-memory instance.
    pub async fn memory() -> Res<Self> {
        let db = connect("mem://").await?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Any>) -> Res<Self> {
        db.use_ns("events").use_db("bot").await?;

        // Define the schema.
        db.query("DEFINE TABLE IF NOT EXISTS event SCHEMALESS").await?;
        db.query("DEFINE INDEX IF NOT EXISTS event_date ON event FIELDS date").await?;
        db.query("DEFINE INDEX IF NOT EXISTS event_submitter ON event FIELDS submitted_by_id").await?;

        info!("Database initialized successfully.");

        Ok(Self { db })
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(skip_all)]
    async fn create_event(&self, event: &Event) -> Res<Event> {
        let created: Option<EventRecord> = self.db.create("event").content(EventRecord::from(event)).await?;

        created.map(Into::into).ok_or_else(|| anyhow!("Failed to create event record"))
    }

    #[instrument(skip(self))]
    async fn find_event_by_id(&self, id: &str) -> Res<Option<Event>> {
        let record: Option<EventRecord> = self.db.select(("event", id)).await?;

        Ok(record.map(Into::into))
    }

    #[instrument(skip(self, patch))]
    async fn update_event_fields(&self, id: &str, patch: &EventPatch) -> Res<Event> {
        let updated: Option<EventRecord> = self.db.update(("event", id)).merge(RecordPatch::from(patch)).await?;

        updated.map(Into::into).ok_or_else(|| anyhow!("Event `{}` not found", id))
    }

    #[instrument(skip(self))]
    async fn update_status_if(&self, id: &str, expected: &[EventStatus], new: EventStatus) -> Res<Option<Event>> {
        // The guard runs inside a single atomic update, so a concurrent
        // transition on the same record cannot pass it as well.
        let mut response = self
            .db
            .query("UPDATE type::thing('event', $id) SET status = $new WHERE status IN $expected RETURN AFTER")
            .bind(("id", id.to_string()))
            .bind(("new", new))
            .bind(("expected", expected.to_vec()))
            .await?;

        let updated: Vec<EventRecord> = response.take(0)?;

        Ok(updated.into_iter().next().map(Into::into))
    }

    #[instrument(skip(self, reason))]
    async fn reject_event_if_pending(&self, id: &str, reason: &str) -> Res<Option<Event>> {
        // Status and reason land in the same atomic update; a failure cannot
        // leave a rejected record without its reason.
        let mut response = self
            .db
            .query("UPDATE type::thing('event', $id) SET status = $new, rejection_reason = $reason WHERE status IN $expected RETURN AFTER")
            .bind(("id", id.to_string()))
            .bind(("new", EventStatus::Rejected))
            .bind(("reason", reason.to_string()))
            .bind(("expected", vec![EventStatus::Pending, EventStatus::EditedPending]))
            .await?;

        let updated: Vec<EventRecord> = response.take(0)?;

        Ok(updated.into_iter().next().map(Into::into))
    }

    #[instrument(skip(self))]
    async fn set_channel_message_id(&self, id: &str, message_id: i64) -> Res<Event> {
        let patch = EventPatch {
            channel_message_id: Some(message_id),
            ..Default::default()
        };

        self.update_event_fields(id, &patch).await
    }

    #[instrument(skip(self))]
    async fn find_published_events_overlapping_day(&self, day_start: DateTime<Utc>, day_end: DateTime<Utc>) -> Res<Vec<Event>> {
        let mut response = self
            .db
            .query("SELECT * FROM event WHERE status IN $statuses AND date <= $day_end AND end_date >= $day_start ORDER BY date ASC")
            .bind(("statuses", vec![EventStatus::Approved, EventStatus::EditedApproved]))
            .bind(("day_start", Datetime::from(day_start)))
            .bind(("day_end", Datetime::from(day_end)))
            .await?;

        let records: Vec<EventRecord> = response.take(0)?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_approved_upcoming_events_by_submitter(&self, submitter_id: i64, now: DateTime<Utc>) -> Res<Vec<Event>> {
        let mut response = self
            .db
            .query("SELECT * FROM event WHERE submitted_by_id = $submitter AND status IN $statuses AND date >= $now ORDER BY date ASC")
            .bind(("submitter", submitter_id))
            .bind(("statuses", vec![EventStatus::Approved, EventStatus::EditedApproved]))
            .bind(("now", Datetime::from(now)))
            .await?;

        let records: Vec<EventRecord> = response.take(0)?;

        Ok(records.into_iter().map(Into::into).collect())
    }
}
