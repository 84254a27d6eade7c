use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use chronos_core::db::open_db_in_memory;
use chronos_core::{
    AccountService, AgendaFeed, CreateEventRequest, CreateTaskRequest, DayBucket, EventPatch,
    EventService, FeedStatus, FixedClock, OwnerId, RecordSource, RegisterProfileRequest,
    ServiceError, Session, SnapshotHub, SourceError, SqliteEventRepository,
    SqliteProfileRepository, SqliteTaskRepository, TaskPatch, TaskService,
};
use std::sync::Arc;
use std::time::Duration;

fn tz() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).unwrap()
}

fn ms(d: u32, h: u32, min: u32) -> i64 {
    tz().with_ymd_and_hms(2024, 6, d, h, min, 0)
        .single()
        .unwrap()
        .timestamp_millis()
}

fn session(owner: &str) -> Session {
    Session::signed_in(OwnerId::parse(owner).unwrap())
}

#[test]
fn create_task_combines_date_and_time_and_starts_incomplete() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::with_parts(
        SqliteTaskRepository::try_new(&conn).unwrap(),
        SnapshotHub::new("tasks"),
        Arc::new(FixedClock(77)),
    );
    let alice = session("alice");

    let request = CreateTaskRequest::at_local(
        &tz(),
        "  Gym  ",
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        NaiveTime::from_hms_opt(18, 30, 0),
    )
    .unwrap()
    .with_note("leg day");
    let task = service.create_task(&alice, request).unwrap();

    assert_eq!(task.title, "Gym");
    assert_eq!(task.date, Some(ms(15, 18, 30)));
    assert_eq!(task.created_at, 77);
    assert!(!task.is_completed);
    assert_eq!(service.get_task(&alice, task.id).unwrap(), task);
}

#[test]
fn task_mutations_require_signed_in_session() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let signed_out = Session::signed_out();

    let err = service
        .create_task(&signed_out, CreateTaskRequest::new("nope", 0))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthenticated));
    assert!(matches!(
        service.subscribe(&signed_out),
        Err(SourceError::Unauthenticated)
    ));
}

#[test]
fn task_update_complete_and_delete_flow() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let alice = session("alice");

    let task = service
        .create_task(&alice, CreateTaskRequest::new("draft", ms(15, 9, 0)))
        .unwrap();

    let updated = service
        .update_task(
            &alice,
            task.id,
            TaskPatch {
                title: Some(" final ".to_string()),
                note: Some(Some("details".to_string())),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.title, "final");
    assert_eq!(updated.note.as_deref(), Some("details"));

    let completed = service.set_task_completed(&alice, task.id, true).unwrap();
    assert!(completed.is_completed);
    assert!(service.get_task(&alice, task.id).unwrap().is_completed);

    service.delete_task(&alice, task.id).unwrap();
    assert!(matches!(
        service.get_task(&alice, task.id),
        Err(ServiceError::NotFound(id)) if id == task.id
    ));
    assert!(matches!(
        service.delete_task(&alice, task.id),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn invalid_attachment_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let err = service
        .create_task(
            &session("alice"),
            CreateTaskRequest::new("upload", 0).with_attachment("C:\\file.pdf"),
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn event_service_creates_updates_and_deletes() {
    let conn = open_db_in_memory().unwrap();
    let service = EventService::new(SqliteEventRepository::try_new(&conn).unwrap());
    let alice = session("alice");

    let event = service
        .create_event(
            &alice,
            CreateEventRequest::new("Conference", ms(16, 9, 0)).ending_at(ms(16, 17, 0)),
        )
        .unwrap();
    assert!(!event.is_all_day);

    let err = service
        .update_event(
            &alice,
            event.id,
            EventPatch {
                end_date: Some(Some(ms(15, 9, 0))),
                ..EventPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let updated = service
        .update_event(
            &alice,
            event.id,
            EventPatch {
                is_all_day: Some(true),
                end_date: Some(None),
                ..EventPatch::default()
            },
        )
        .unwrap();
    assert!(updated.is_all_day);
    assert_eq!(service.list_events(&alice).unwrap(), vec![updated]);

    service.delete_event(&alice, event.id).unwrap();
    assert!(service.list_events(&alice).unwrap().is_empty());
}

#[test]
fn subscription_receives_initial_snapshot_then_one_per_mutation() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let alice = session("alice");

    service
        .create_task(&alice, CreateTaskRequest::new("before", ms(15, 8, 0)))
        .unwrap();
    let subscription = service.subscribe(&alice).unwrap();
    let initial = subscription.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(initial.len(), 1);

    let created = service
        .create_task(&alice, CreateTaskRequest::new("after", ms(15, 9, 0)))
        .unwrap();
    let second = subscription.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(second.len(), 2);

    service.set_task_completed(&alice, created.id, true).unwrap();
    let third = subscription.try_latest().unwrap();
    assert!(third.iter().any(|task| task.id == created.id && task.is_completed));
    assert!(subscription.try_latest().is_none());
}

#[test]
fn subscriptions_are_scoped_to_their_owner() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let alice = session("alice");
    let bob = session("bob");

    let bob_subscription = service.subscribe(&bob).unwrap();
    assert_eq!(bob_subscription.try_latest(), Some(Vec::new()));

    service
        .create_task(&alice, CreateTaskRequest::new("private", 0))
        .unwrap();
    assert!(bob_subscription.try_latest().is_none());
}

#[test]
fn unsubscribe_stops_delivery_and_prunes_registry() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let alice = session("alice");
    let owner = OwnerId::parse("alice").unwrap();

    let first = service.subscribe(&alice).unwrap();
    let second = service.subscribe(&alice).unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(service.hub().subscriber_count(&owner), 2);

    first.unsubscribe();
    assert_eq!(service.hub().subscriber_count(&owner), 1);

    drop(second);
    assert_eq!(service.hub().subscriber_count(&owner), 0);
    assert_eq!(service.hub().publish(&owner, &[]), 0);
}

#[test]
fn feed_waits_for_both_channels_and_regroups_on_every_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let events = EventService::new(SqliteEventRepository::try_new(&conn).unwrap());
    let alice = session("alice");
    let now = tz().with_ymd_and_hms(2024, 6, 15, 12, 0, 0).single().unwrap();

    tasks
        .create_task(&alice, CreateTaskRequest::new("yesterday", ms(14, 9, 0)))
        .unwrap();

    let task_subscription = tasks.subscribe(&alice).unwrap();
    let mut feed_tasks_only = AgendaFeed::from_subscriptions(
        task_subscription,
        events.subscribe(&alice).unwrap(),
    );
    let grouped = feed_tasks_only.poll(&now).unwrap();
    assert_eq!(feed_tasks_only.status(), FeedStatus::Ready);
    assert_eq!(grouped.get(DayBucket::Yesterday).len(), 1);
    assert!(feed_tasks_only.poll(&now).is_none());

    events
        .create_event(
            &alice,
            CreateEventRequest::new("tomorrow", ms(16, 0, 1)).all_day(),
        )
        .unwrap();
    tasks
        .create_task(&alice, CreateTaskRequest::new("tonight", ms(15, 23, 59)))
        .unwrap();
    tasks
        .create_task(&alice, CreateTaskRequest::new("later", ms(20, 0, 0)))
        .unwrap();

    let grouped = feed_tasks_only.poll(&now).unwrap();
    assert_eq!(grouped.get(DayBucket::Yesterday)[0].title(), "yesterday");
    assert_eq!(grouped.get(DayBucket::Today)[0].title(), "tonight");
    let tomorrow = grouped.get(DayBucket::Tomorrow)[0].as_event().unwrap();
    assert!(tomorrow.is_all_day);
    assert_eq!(grouped.get(DayBucket::Others)[0].title(), "later");
    assert_eq!(feed_tasks_only.current(&now), Some(grouped));
}

#[test]
fn dropped_source_closes_subscription_after_pending_snapshots() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let alice = session("alice");

    let subscription = service.subscribe(&alice).unwrap();
    service
        .create_task(&alice, CreateTaskRequest::new("last", ms(15, 9, 0)))
        .unwrap();
    drop(service);

    assert!(!subscription.is_closed());
    let last = subscription.try_latest().unwrap();
    assert_eq!(last.len(), 1);
    assert!(subscription.is_closed());
    assert!(subscription.try_latest().is_none());
    assert!(subscription
        .recv_timeout(Duration::from_millis(10))
        .is_none());
}

#[test]
fn feed_reports_closed_when_a_source_is_dropped() {
    let conn = open_db_in_memory().unwrap();
    let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let events = EventService::new(SqliteEventRepository::try_new(&conn).unwrap());
    let alice = session("alice");
    let now = tz().with_ymd_and_hms(2024, 6, 15, 12, 0, 0).single().unwrap();

    let mut feed = AgendaFeed::subscribe(&tasks, &events, &alice).unwrap();
    assert!(feed.poll(&now).is_some());
    assert_eq!(feed.status(), FeedStatus::Ready);

    drop(tasks);

    assert!(feed.poll(&now).is_none());
    assert_eq!(
        feed.status(),
        FeedStatus::Closed {
            tasks_closed: true,
            events_closed: false
        }
    );
    assert!(feed.is_closed());

    events
        .create_event(&alice, CreateEventRequest::new("still live", ms(15, 10, 0)))
        .unwrap();
    let grouped = feed.poll(&now).unwrap();
    assert_eq!(grouped.get(DayBucket::Today)[0].title(), "still live");
    assert!(feed.is_closed());
}

#[test]
fn feed_subscribe_reports_loading_until_first_poll() {
    let conn = open_db_in_memory().unwrap();
    let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let events = EventService::new(SqliteEventRepository::try_new(&conn).unwrap());
    let now = tz().with_ymd_and_hms(2024, 6, 15, 12, 0, 0).single().unwrap();

    let mut feed = AgendaFeed::subscribe(&tasks, &events, &session("alice")).unwrap();
    assert_eq!(
        feed.status(),
        FeedStatus::Loading {
            tasks_ready: false,
            events_ready: false
        }
    );
    assert!(feed.current(&now).is_none());

    let grouped = feed.poll(&now).unwrap();
    assert!(grouped.is_empty());
    feed.unsubscribe();
    assert_eq!(
        tasks
            .hub()
            .subscriber_count(&OwnerId::parse("alice").unwrap()),
        0
    );

    assert!(matches!(
        AgendaFeed::subscribe(&tasks, &events, &Session::signed_out()),
        Err(SourceError::Unauthenticated)
    ));
}

#[test]
fn account_profile_register_and_read() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::with_clock(
        SqliteProfileRepository::try_new(&conn).unwrap(),
        Arc::new(FixedClock(5)),
    );
    let alice = session("alice");

    assert!(matches!(
        service.get_profile(&alice),
        Err(ServiceError::ProfileNotFound(_))
    ));

    let profile = service
        .register_profile(
            &alice,
            RegisterProfileRequest {
                name: " Alice ".to_string(),
                last_name: "Liddell".to_string(),
                email: "alice@example.com".to_string(),
            },
        )
        .unwrap();
    assert_eq!(profile.full_name(), "Alice Liddell");
    assert_eq!(profile.created_at, 5);
    assert_eq!(service.get_profile(&alice).unwrap(), profile);

    let err = service
        .register_profile(
            &alice,
            RegisterProfileRequest {
                name: "A".to_string(),
                last_name: "L".to_string(),
                email: "broken".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}
