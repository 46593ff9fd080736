#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use event_bot::{
    base::{
        config::{Config, ConfigInner},
        texts,
        types::{EventStatus, Res, Void},
    },
    domain::{EventDraft, EventPatch, LifecycleError},
    interaction::{
        Ctx, edit,
        edit::{EditState, EditStep},
        submit,
        submit::{SubmitState, SubmitStep},
    },
    lifecycle::Engine,
    notify::Notifier,
    service::{
        chat::{ChatClient, GenericChatClient, InlineKeyboard, ParseMode},
        db::DbClient,
    },
};
use mockall::{mock, predicate};

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn start(&self) -> Void;
        async fn send_message(&self, chat_id: &str, text: &str, mode: ParseMode, keyboard: Option<InlineKeyboard>) -> Res<i64>;
        async fn send_photo(&self, chat_id: &str, image: Vec<u8>, caption: &str, mode: ParseMode, keyboard: Option<InlineKeyboard>, spoiler: bool) -> Res<i64>;
        async fn edit_message_text(&self, chat_id: &str, message_id: i64, text: &str, mode: ParseMode) -> Void;
        async fn edit_message_reply_markup(&self, chat_id: &str, message_id: i64, keyboard: Option<InlineKeyboard>) -> Void;
        async fn delete_message(&self, chat_id: &str, message_id: i64) -> Void;
        async fn answer_callback(&self, callback_id: &str, text: Option<String>, show_alert: bool) -> Void;
        async fn download_file(&self, file_id: &str) -> Res<Vec<u8>>;
    }
}

// Helpers.

fn test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            telegram_token: "test-token".to_string(),
            admin_chat_id: -100,
            channel_id: "@events".to_string(),
            timezone: "Europe/Berlin".to_string(),
            date_format: "%d.%m.%Y %H:%M".to_string(),
            date_only_format: "%d.%m.%Y".to_string(),
            locale: "de".to_string(),
            db_endpoint: "mem://".to_string(),
            db_username: None,
            db_password: None,
        }),
    }
}

fn valid_draft() -> EventDraft {
    EventDraft {
        submitted_by_id: 42,
        submitted_by: "alice".to_string(),
        title: Some("Jazz Night".to_string()),
        description: Some("An evening of jazz.".to_string()),
        location: Some("Parkhalle".to_string()),
        date: Some(Utc.with_ymd_and_hms(2030, 6, 1, 17, 0, 0).unwrap()),
        end_date: Some(Utc.with_ymd_and_hms(2030, 6, 1, 20, 0, 0).unwrap()),
        category: vec!["Musik".to_string()],
        links: vec![],
        image_base64: None,
    }
}

fn notifier(db: &DbClient, mock: MockChat) -> Notifier {
    Notifier::new(ChatClient::new(Arc::new(mock)), db.clone(), test_config())
}

// Tests.

#[tokio::test]
async fn submission_is_persisted_as_pending() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    let event = engine.submit(&valid_draft()).await.unwrap();

    assert!(event.id.is_some());
    assert_eq!(event.status, EventStatus::Pending);

    let stored = db.find_event_by_id(event.id.as_deref().unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.title, "Jazz Night");
    assert_eq!(stored.channel_message_id, None);
}

#[tokio::test]
async fn overlong_description_is_rejected_before_persisting() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    let mut draft = valid_draft();
    draft.description = Some("x".repeat(601));

    let err = engine.submit(&draft).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Validation { field: "description", .. }));

    // Nothing was written.
    let window_start = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let window_end = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();
    let events = db.find_published_events_overlapping_day(window_start, window_end).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn approval_publishes_exactly_once() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    let event = engine.submit(&valid_draft()).await.unwrap();
    let event_id = event.id.clone().unwrap();

    let mut mock = MockChat::new();
    mock.expect_send_message()
        .with(predicate::eq("@events"), predicate::always(), predicate::eq(ParseMode::MarkdownV2), predicate::always())
        .times(1)
        .returning(|_, _, _, _| Ok(555));

    let approved = engine.request_approval(&event_id).await.unwrap();
    assert_eq!(approved.status, EventStatus::Approved);

    let delivered = notifier(&db, mock).deliver(&approved).await.unwrap();
    assert_eq!(delivered.channel_message_id, Some(555));

    // A second approval attempt loses the race against the first.
    let err = engine.request_approval(&event_id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::AlreadyPublished));
}

#[tokio::test]
async fn concurrent_status_transition_has_one_winner() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    let event = engine.submit(&valid_draft()).await.unwrap();
    let event_id = event.id.clone().unwrap();

    let first = db.update_status_if(&event_id, &[EventStatus::Pending], EventStatus::Approved).await.unwrap();
    let second = db.update_status_if(&event_id, &[EventStatus::Pending], EventStatus::Approved).await.unwrap();

    assert!(first.is_some());
    assert!(second.is_none());
}

#[tokio::test]
async fn approved_edit_updates_the_existing_post_in_place() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    // Publish a text-only event.
    let event = engine.submit(&valid_draft()).await.unwrap();
    let event_id = event.id.clone().unwrap();

    let mut publish_mock = MockChat::new();
    publish_mock.expect_send_message().times(1).returning(|_, _, _, _| Ok(555));

    let approved = engine.request_approval(&event_id).await.unwrap();
    notifier(&db, publish_mock).deliver(&approved).await.unwrap();

    // Edit it and approve the edit.
    let patch = EventPatch {
        title: Some("Blues Night".to_string()),
        ..Default::default()
    };

    let edited = engine.apply_edit(&event_id, &patch).await.unwrap();
    assert_eq!(edited.status, EventStatus::EditedPending);

    let reapproved = engine.request_approval(&event_id).await.unwrap();
    assert_eq!(reapproved.status, EventStatus::EditedApproved);

    // The existing channel message is edited; no new post is sent.
    let mut edit_mock = MockChat::new();
    edit_mock
        .expect_edit_message_text()
        .with(
            predicate::eq("@events"),
            predicate::eq(555),
            predicate::function(|text: &str| text.contains("Blues Night")),
            predicate::eq(ParseMode::MarkdownV2),
        )
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    notifier(&db, edit_mock).deliver(&reapproved).await.unwrap();
}

#[tokio::test]
async fn edit_of_a_pending_event_is_refused() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    let event = engine.submit(&valid_draft()).await.unwrap();
    let event_id = event.id.clone().unwrap();

    let patch = EventPatch {
        title: Some("Blues Night".to_string()),
        ..Default::default()
    };

    let err = engine.apply_edit(&event_id, &patch).await.unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidState(EventStatus::Pending)));
}

#[tokio::test]
async fn edit_violating_an_invariant_is_refused_whole() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    let event = engine.submit(&valid_draft()).await.unwrap();
    let event_id = event.id.clone().unwrap();
    db.update_status_if(&event_id, &[EventStatus::Pending], EventStatus::Approved).await.unwrap();

    // End before the (unchanged) start.
    let patch = EventPatch {
        title: Some("Blues Night".to_string()),
        end_date: Some(Utc.with_ymd_and_hms(2030, 6, 1, 10, 0, 0).unwrap()),
        ..Default::default()
    };

    let err = engine.apply_edit(&event_id, &patch).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Validation { field: "end_date", .. }));

    // The valid part of the patch was not applied either.
    let stored = db.find_event_by_id(&event_id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Jazz Night");
    assert_eq!(stored.status, EventStatus::Approved);
}

#[tokio::test]
async fn rejection_stores_the_reason_and_survives_notify_failure() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    let event = engine.submit(&valid_draft()).await.unwrap();
    let event_id = event.id.clone().unwrap();

    let rejected = engine.request_rejection(&event_id, "Duplicate of an existing event.").await.unwrap();
    assert_eq!(rejected.status, EventStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Duplicate of an existing event."));

    // The submitter notification failing must not bubble up.
    let mut mock = MockChat::new();
    mock.expect_send_message().times(1).returning(|_, _, _, _| Err(anyhow::anyhow!("blocked by user")));

    notifier(&db, mock).notify_submitter(&rejected, "Duplicate of an existing event.").await;

    // A rejected event cannot be approved afterwards.
    let err = engine.request_approval(&event_id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidState(EventStatus::Rejected)));
}

#[tokio::test]
async fn day_search_returns_overlapping_published_events_in_order() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    // Three events: one on the day, one spanning into it, one unrelated.
    let mut on_day = valid_draft();
    on_day.title = Some("On the day".to_string());
    on_day.date = Some(Utc.with_ymd_and_hms(2030, 6, 1, 18, 0, 0).unwrap());
    on_day.end_date = Some(Utc.with_ymd_and_hms(2030, 6, 1, 20, 0, 0).unwrap());

    let mut spanning = valid_draft();
    spanning.title = Some("Spanning".to_string());
    spanning.date = Some(Utc.with_ymd_and_hms(2030, 5, 31, 10, 0, 0).unwrap());
    spanning.end_date = Some(Utc.with_ymd_and_hms(2030, 6, 2, 10, 0, 0).unwrap());

    let mut unrelated = valid_draft();
    unrelated.title = Some("Unrelated".to_string());
    unrelated.date = Some(Utc.with_ymd_and_hms(2030, 7, 1, 18, 0, 0).unwrap());
    unrelated.end_date = Some(Utc.with_ymd_and_hms(2030, 7, 1, 20, 0, 0).unwrap());

    for draft in [&on_day, &spanning, &unrelated] {
        let event = engine.submit(draft).await.unwrap();
        db.update_status_if(event.id.as_deref().unwrap(), &[EventStatus::Pending], EventStatus::Approved).await.unwrap();
    }

    // A fourth, still pending event on the day must not show up.
    let mut pending = valid_draft();
    pending.title = Some("Pending".to_string());
    pending.date = Some(Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap());
    pending.end_date = Some(Utc.with_ymd_and_hms(2030, 6, 1, 14, 0, 0).unwrap());
    engine.submit(&pending).await.unwrap();

    let day_start = Utc.with_ymd_and_hms(2030, 5, 31, 22, 0, 0).unwrap();
    let day_end = day_start + Duration::days(1) - Duration::seconds(1);

    let found = db.find_published_events_overlapping_day(day_start, day_end).await.unwrap();
    let titles: Vec<_> = found.iter().map(|e| e.title.as_str()).collect();

    // Ascending by start time.
    assert_eq!(titles, vec!["Spanning", "On the day"]);
}

#[tokio::test]
async fn editable_event_listing_is_scoped_to_the_submitter() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    let mine = engine.submit(&valid_draft()).await.unwrap();
    db.update_status_if(mine.id.as_deref().unwrap(), &[EventStatus::Pending], EventStatus::Approved).await.unwrap();

    let mut theirs = valid_draft();
    theirs.submitted_by_id = 99;
    theirs.title = Some("Someone else's".to_string());
    let theirs = engine.submit(&theirs).await.unwrap();
    db.update_status_if(theirs.id.as_deref().unwrap(), &[EventStatus::Pending], EventStatus::Approved).await.unwrap();

    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let editable = db.find_approved_upcoming_events_by_submitter(42, now).await.unwrap();

    assert_eq!(editable.len(), 1);
    assert_eq!(editable[0].title, "Jazz Night");
}

// Dialogue-level tests, driving the intake state machines directly.

/// A chat mock that accepts any prompt or acknowledgement.
fn chatting_mock() -> MockChat {
    let mut mock = MockChat::new();
    mock.expect_send_message().returning(|_, _, _, _| Ok(1));
    mock.expect_answer_callback().returning(|_, _, _| Ok(()));
    mock
}

#[tokio::test]
async fn submit_end_date_equal_to_start_re_prompts_without_losing_the_draft() {
    let db = DbClient::memory().await.unwrap();
    let config = test_config();
    let chat = ChatClient::new(Arc::new(chatting_mock()));
    let ctx = Ctx { db: &db, chat: &chat, config: &config };

    let start = Utc.with_ymd_and_hms(2030, 6, 1, 17, 0, 0).unwrap();
    let mut draft = EventDraft::new(42, "alice".to_string());
    draft.title = Some("Jazz Night".to_string());

    let state = SubmitState {
        draft,
        step: SubmitStep::EndDate { start },
    };

    // 17:00 UTC is 19:00 in Berlin; an end equal to the start is refused
    // and the step repeats with the accepted fields intact.
    let state = submit::on_message(state, 7, Some("01.06.2030 19:00"), None, &ctx).await.unwrap().unwrap();

    assert!(matches!(state.step, SubmitStep::EndDate { .. }));
    assert_eq!(state.draft.title.as_deref(), Some("Jazz Night"));

    // A strictly later end moves on to the confirmation step.
    let state = submit::on_message(state, 7, Some("01.06.2030 21:00"), None, &ctx).await.unwrap().unwrap();
    assert!(matches!(state.step, SubmitStep::ConfirmDates { .. }));
}

#[tokio::test]
async fn submit_overlong_description_re_prompts_and_keeps_earlier_fields() {
    let db = DbClient::memory().await.unwrap();
    let config = test_config();
    let chat = ChatClient::new(Arc::new(chatting_mock()));
    let ctx = Ctx { db: &db, chat: &chat, config: &config };

    let mut draft = EventDraft::new(42, "alice".to_string());
    draft.title = Some("Jazz Night".to_string());

    let state = SubmitState {
        draft,
        step: SubmitStep::Description,
    };

    let overlong = "x".repeat(601);
    let state = submit::on_message(state, 7, Some(&overlong), None, &ctx).await.unwrap().unwrap();

    assert!(matches!(state.step, SubmitStep::Description));
    assert_eq!(state.draft.description, None);
    assert_eq!(state.draft.title.as_deref(), Some("Jazz Night"));

    let state = submit::on_message(state, 7, Some("An evening of jazz."), None, &ctx).await.unwrap().unwrap();
    assert!(matches!(state.step, SubmitStep::Location));
    assert_eq!(state.draft.description.as_deref(), Some("An evening of jazz."));
}

#[tokio::test]
async fn submit_category_done_requires_a_selection() {
    let db = DbClient::memory().await.unwrap();
    let config = test_config();

    // Pressing done with nothing selected only raises an alert popup.
    let mut mock = MockChat::new();
    mock.expect_answer_callback().withf(|_, _, show_alert| *show_alert).times(1).returning(|_, _, _| Ok(()));

    let chat = ChatClient::new(Arc::new(mock));
    let ctx = Ctx { db: &db, chat: &chat, config: &config };

    let state = SubmitState {
        draft: EventDraft::new(42, "alice".to_string()),
        step: SubmitStep::Category,
    };

    let state = submit::on_callback(state, 7, "cb1", "cat_done", &ctx).await.unwrap().unwrap();
    assert!(matches!(state.step, SubmitStep::Category));
}

#[tokio::test]
async fn edit_save_with_merged_invalid_dates_reports_instead_of_escaping() {
    let db = DbClient::memory().await.unwrap();
    let config = test_config();
    let engine = Engine::new(db.clone());

    let created = engine.submit(&valid_draft()).await.unwrap();
    let event_id = created.id.clone().unwrap();
    db.update_status_if(&event_id, &[EventStatus::Pending], EventStatus::Approved).await.unwrap();
    let event = db.find_event_by_id(&event_id).await.unwrap().unwrap();

    let mut mock = MockChat::new();
    mock.expect_answer_callback().returning(|_, _, _| Ok(()));
    mock.expect_send_message()
        .withf(|_, text, _, _| text == texts::CHANGES_INVALID)
        .times(1)
        .returning(|_, _, _, _| Ok(1));

    let chat = ChatClient::new(Arc::new(mock));
    let ctx = Ctx { db: &db, chat: &chat, config: &config };

    // Only the start moves, to a time after the stored end.
    let patch = EventPatch {
        date: Some(event.end_date + Duration::hours(1)),
        ..Default::default()
    };

    let state = EditState::Editing {
        event,
        patch,
        step: EditStep::ConfirmSave,
    };

    // The dialogue ends with a notice instead of returning an error.
    let result = edit::on_callback(state, 7, "cb1", "save_changes", &ctx).await.unwrap();
    assert!(result.is_none());

    // Nothing was written.
    let stored = db.find_event_by_id(&event_id).await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::Approved);
    assert_eq!(stored.date, created.date);
}

#[tokio::test]
async fn rejection_guard_failure_writes_nothing() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    let event = engine.submit(&valid_draft()).await.unwrap();
    let event_id = event.id.clone().unwrap();
    db.update_status_if(&event_id, &[EventStatus::Pending], EventStatus::Approved).await.unwrap();

    let err = engine.request_rejection(&event_id, "Too late.").await.unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidState(EventStatus::Approved)));

    // Neither status nor reason changed.
    let stored = db.find_event_by_id(&event_id).await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::Approved);
    assert_eq!(stored.rejection_reason, None);
}

#[tokio::test]
async fn retriable_publish_after_a_missed_message_reference() {
    let db = DbClient::memory().await.unwrap();
    let engine = Engine::new(db.clone());

    let event = engine.submit(&valid_draft()).await.unwrap();
    let event_id = event.id.clone().unwrap();

    // Approved, but the first delivery crashed before recording the post.
    let approved = engine.request_approval(&event_id).await.unwrap();
    assert_eq!(approved.channel_message_id, None);

    // The next delivery publishes fresh instead of editing nothing.
    let mut mock = MockChat::new();
    mock.expect_send_message().times(1).returning(|_, _, _, _| Ok(777));

    let delivered = notifier(&db, mock).deliver(&approved).await.unwrap();
    assert_eq!(delivered.channel_message_id, Some(777));
}
