use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use taskmate_core::collab::{
    CollabResult, CollaboratorError, FileRef, LocalObjectStorage, ObjectStorage,
};
use taskmate_core::db::open_db_in_memory;
use taskmate_core::service::task_service::TaskImage;
use taskmate_core::{
    Bucket, FixedClock, Priority, Schedule, ServiceError, SqliteDocumentStore, TaskDraft,
    TaskService, TaskStatus, TaskTab, TimeOfDay, ValidationError,
};

struct BrokenStorage;

impl ObjectStorage for BrokenStorage {
    fn upload(&self, _: &str, _: &str, _: &[u8], _: &str) -> CollabResult<FileRef> {
        Err(CollaboratorError::Unavailable("bucket offline".to_string()))
    }

    fn public_url(&self, _: &str, _: &str) -> CollabResult<String> {
        Err(CollaboratorError::Unavailable("bucket offline".to_string()))
    }
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(at(14, 9)))
}

fn draft(title: &str, deadline: Option<NaiveDateTime>) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        deadline,
        ..TaskDraft::default()
    }
}

#[test]
fn create_requires_title_and_future_deadline() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let dir = tempfile::tempdir().unwrap();
    let service = TaskService::new(&store, LocalObjectStorage::new(dir.path()), clock());

    assert!(matches!(
        service.create(&draft(" ", Some(at(14, 12))), None),
        Err(ServiceError::Validation(ValidationError::Required { field: "Title" }))
    ));
    assert!(matches!(
        service.create(&draft("Code Review", None), None),
        Err(ServiceError::Validation(ValidationError::Required { field: "Deadline" }))
    ));
    assert!(matches!(
        service.create(&draft("Code Review", Some(at(14, 8))), None),
        Err(ServiceError::Validation(ValidationError::TimeInPast { .. }))
    ));

    let task = service
        .create(&draft("Code Review", Some(at(14, 12))), None)
        .unwrap();
    assert_eq!(task.category, "Work");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.status, TaskStatus::MyTasks);
    assert!(task.image.is_none());
}

#[test]
fn create_uploads_image_and_resolves_its_url() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let dir = tempfile::tempdir().unwrap();
    let service = TaskService::new(&store, LocalObjectStorage::new(dir.path()), clock());

    let image = TaskImage {
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
        file_name: "mock.png".to_string(),
    };
    let task = service
        .create(&draft("UI Design Updates", Some(at(15, 10))), Some(&image))
        .unwrap();
    assert!(task.image.is_some());

    let url = service.image_url(&task).unwrap().unwrap();
    assert!(url.starts_with("file://"));
    assert!(url.contains("task-images"));
}

#[test]
fn failed_upload_still_creates_the_task() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let service = TaskService::new(&store, BrokenStorage, clock());
    let image = TaskImage {
        bytes: vec![1, 2, 3],
        file_name: "mock.png".to_string(),
    };

    let task = service
        .create(&draft("Fix Login Issue", Some(at(15, 10))), Some(&image))
        .unwrap();
    assert!(task.image.is_none());
    assert_eq!(service.list().unwrap().items.len(), 1);
}

#[test]
fn status_changes_drive_search_summary_and_agenda() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let dir = tempfile::tempdir().unwrap();
    let service = TaskService::new(&store, LocalObjectStorage::new(dir.path()), clock());

    let review = service
        .create(&draft("Code Review", Some(at(14, 12))), None)
        .unwrap();
    let docs = service
        .create(&draft("Write Documentation", Some(at(16, 12))), None)
        .unwrap();
    service
        .create(&draft("Review Backend", Some(at(15, 12))), None)
        .unwrap();

    service.set_status(&review.id, TaskStatus::Completed).unwrap();
    service.set_status(&docs.id, TaskStatus::InProgress).unwrap();

    let hits = service.search("review", TaskTab::ViewAll).unwrap();
    assert_eq!(hits.len(), 2);
    let completed = service.search("", TaskTab::Completed).unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, review.id);

    let summary = service.summary().unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.in_progress, 1);
    assert_eq!(summary.my_tasks, 1);

    let agenda = service.agenda_at(at(14, 13)).unwrap();
    let buckets = &agenda.report.buckets;
    assert_eq!(buckets.get(Bucket::Today).len(), 1);
    assert_eq!(buckets.get(Bucket::Tomorrow).len(), 1);
    assert_eq!(buckets.get(Bucket::Upcoming).len(), 1);
    assert!(buckets.get(Bucket::Missed).is_empty());
}

#[test]
fn update_keeps_image_and_delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let dir = tempfile::tempdir().unwrap();
    let service = TaskService::new(&store, LocalObjectStorage::new(dir.path()), clock());
    let image = TaskImage {
        bytes: vec![7; 8],
        file_name: "a.png".to_string(),
    };
    let task = service
        .create(&draft("Team Meeting", Some(at(15, 9))), Some(&image))
        .unwrap();

    let mut edit = draft("Team Meeting (moved)", Some(at(16, 9)));
    edit.priority = Priority::Low;
    let updated = service.update(&task.id, &edit).unwrap();
    assert_eq!(updated.title, "Team Meeting (moved)");
    assert_eq!(updated.priority, Priority::Low);
    assert_eq!(updated.image, task.image);

    service.delete(&task.id).unwrap();
    service.delete(&task.id).unwrap();
    assert!(service.list().unwrap().items.is_empty());
}

#[test]
fn past_deadline_is_only_rejected_for_daily_tasks() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let dir = tempfile::tempdir().unwrap();
    let service = TaskService::new(&store, LocalObjectStorage::new(dir.path()), clock());

    let mut weekly = draft("Plan Sprint", Some(at(13, 10)));
    weekly.schedule = Schedule::Weekly;
    let task = service.create(&weekly, None).unwrap();
    assert_eq!(task.schedule, Schedule::Weekly);

    let mut monthly = draft("Pay Rent", Some(at(14, 8)));
    monthly.schedule = Schedule::Monthly;
    assert!(service.create(&monthly, None).is_ok());

    assert!(matches!(
        service.create(&draft("Stretch", Some(at(14, 8))), None),
        Err(ServiceError::Validation(ValidationError::TimeInPast { .. }))
    ));
}

#[test]
fn repeated_skips_unlock_a_time_of_day_suggestion() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let dir = tempfile::tempdir().unwrap();
    let service = TaskService::new(&store, LocalObjectStorage::new(dir.path()), clock());

    let mut task = service
        .create(&draft("Evening Run", Some(at(14, 19))), None)
        .unwrap();
    assert_eq!(task.skip_count, 0);
    for _ in 0..3 {
        task = service.record_skip(&task).unwrap();
    }
    assert_eq!(task.skip_count, 3);
    assert_eq!(service.suggest_time(&task), None);

    task = service.record_skip(&task).unwrap();
    assert_eq!(task.skip_count, 4);
    assert_eq!(service.suggest_time(&task), Some(TimeOfDay::Evening));

    // Editing the task keeps its skip history.
    let edited = service
        .update(&task.id, &draft("Evening Run", Some(at(15, 19))))
        .unwrap();
    assert_eq!(edited.skip_count, 4);
}
