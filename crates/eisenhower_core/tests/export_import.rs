use chrono::{Duration, TimeZone, Utc};
use eisenhower_core::db::open_db_in_memory;
use eisenhower_core::{
    ExportSnapshot, Quadrant, SettingsService, SnapshotTask, SqliteSettingsRepository,
    SqliteTaskRepository, TaskInput, TaskService, TaskValidationError, Theme, TransferError,
    TransferService,
};
use rusqlite::Connection;
use std::collections::BTreeMap;

type SqliteTransfer<'conn> =
    TransferService<SqliteTaskRepository<'conn>, SqliteSettingsRepository<'conn>>;
type SqliteTasks<'conn> = TaskService<SqliteTaskRepository<'conn>, SqliteSettingsRepository<'conn>>;

fn settings(conn: &Connection) -> SettingsService<SqliteSettingsRepository<'_>> {
    SettingsService::new(SqliteSettingsRepository::try_new(conn).unwrap())
}

fn task_service(conn: &Connection) -> SqliteTasks<'_> {
    TaskService::new(SqliteTaskRepository::try_new(conn).unwrap(), settings(conn))
}

fn transfer(conn: &Connection) -> SqliteTransfer<'_> {
    TransferService::new(SqliteTaskRepository::try_new(conn).unwrap(), settings(conn))
}

fn seed(conn: &Connection) {
    let service = task_service(conn);
    service
        .create(
            &TaskInput::new("Pay rent")
                .with_notes("before the 5th")
                .with_due_date(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap()),
        )
        .unwrap();
    let done = service
        .create(&TaskInput::new("Renew passport").with_quadrant(Quadrant::NotUrgentImportant))
        .unwrap();
    service.toggle_completion(done.id).unwrap();
    service
        .create(&TaskInput::new("Sort photos").with_quadrant(Quadrant::NotUrgentNotImportant))
        .unwrap();
}

fn snapshot_with(tasks: Vec<SnapshotTask>, settings: BTreeMap<String, String>) -> ExportSnapshot {
    ExportSnapshot {
        version: "1.0".to_string(),
        exported_at: Utc::now(),
        tasks,
        settings,
    }
}

fn snapshot_task(title: &str) -> SnapshotTask {
    SnapshotTask {
        title: title.to_string(),
        notes: None,
        quadrant: Quadrant::UrgentNotImportant,
        due_date: None,
        is_completed: false,
        created_at: Utc.with_ymd_and_hms(2023, 12, 1, 9, 0, 0).unwrap(),
    }
}

#[test]
fn export_captures_all_tasks_and_settings() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    settings(&conn).set_theme(Theme::Dark).unwrap();

    let snapshot = transfer(&conn).export_snapshot().unwrap();
    assert_eq!(snapshot.version, "1.0");
    assert_eq!(snapshot.tasks.len(), 3);
    assert_eq!(snapshot.tasks[0].title, "Pay rent");
    assert!(snapshot.tasks[1].is_completed);
    assert_eq!(snapshot.settings.get("Theme").map(String::as_str), Some("Dark"));
    assert_eq!(snapshot.settings.len(), 3);
}

#[test]
fn export_then_import_into_empty_store_reproduces_tasks() {
    let source = open_db_in_memory().unwrap();
    seed(&source);
    let json = transfer(&source).export_json().unwrap();

    let target = open_db_in_memory().unwrap();
    task_service(&target)
        .create(&TaskInput::new("will be cleared"))
        .unwrap();
    let outcome = transfer(&target).import_json(&json, true).unwrap();
    assert_eq!(outcome.tasks_imported, 3);
    assert!(outcome.settings_imported);

    let mut expected = task_service(&source).list_all().unwrap();
    let mut actual = task_service(&target).list_all().unwrap();
    expected.sort_by(|a, b| a.title.cmp(&b.title));
    actual.sort_by(|a, b| a.title.cmp(&b.title));
    assert_eq!(actual.len(), expected.len());
    for (got, want) in actual.iter().zip(&expected) {
        assert_eq!(got.title, want.title);
        assert_eq!(got.notes, want.notes);
        assert_eq!(got.quadrant, want.quadrant);
        assert_eq!(got.due_date, want.due_date);
        assert_eq!(got.completed, want.completed);
        assert_eq!(got.created_at, want.created_at);
    }
}

#[test]
fn import_without_clearing_appends_duplicates() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let snapshot = transfer(&conn).export_snapshot().unwrap();

    transfer(&conn).import_snapshot(&snapshot, false).unwrap();
    transfer(&conn).import_snapshot(&snapshot, false).unwrap();

    let counts = task_service(&conn).counts().unwrap();
    assert_eq!(counts.total, 9);
    assert_eq!(counts.completed, 3);
}

#[test]
fn imported_tasks_keep_created_at_and_get_fresh_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let before = Utc::now() - Duration::seconds(1);
    let snapshot = snapshot_with(vec![snapshot_task("imported")], BTreeMap::new());

    transfer(&conn).import_snapshot(&snapshot, false).unwrap();

    let task = task_service(&conn).list_all().unwrap().remove(0);
    assert_eq!(task.created_at, snapshot.tasks[0].created_at);
    assert!(task.updated_at >= before);
    assert_eq!(task.quadrant, Quadrant::UrgentNotImportant);
}

#[test]
fn future_created_at_keeps_updated_not_before_created() {
    let conn = open_db_in_memory().unwrap();
    let mut future = snapshot_task("from the future");
    future.created_at = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();

    transfer(&conn)
        .import_snapshot(&snapshot_with(vec![future], BTreeMap::new()), false)
        .unwrap();

    let task = task_service(&conn).list_all().unwrap().remove(0);
    assert!(task.updated_at >= task.created_at);
}

#[test]
fn empty_settings_map_leaves_settings_untouched() {
    let conn = open_db_in_memory().unwrap();
    settings(&conn).set_theme(Theme::Dark).unwrap();

    let outcome = transfer(&conn)
        .import_snapshot(&snapshot_with(vec![snapshot_task("a")], BTreeMap::new()), true)
        .unwrap();
    assert_eq!(outcome.tasks_imported, 1);
    assert!(!outcome.settings_imported);
    assert_eq!(settings(&conn).theme().unwrap(), Theme::Dark);
}

#[test]
fn clearing_does_not_touch_settings() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let mut values = BTreeMap::new();
    values.insert("ViewMode".to_string(), "List".to_string());
    values.insert("Custom".to_string(), "kept".to_string());

    transfer(&conn)
        .import_snapshot(&snapshot_with(Vec::new(), values), true)
        .unwrap();

    assert_eq!(task_service(&conn).counts().unwrap().total, 0);
    let all = settings(&conn).all_as_map().unwrap();
    assert_eq!(all.get("Theme").map(String::as_str), Some("Light"));
    assert_eq!(all.get("ViewMode").map(String::as_str), Some("List"));
    assert_eq!(all.get("Custom").map(String::as_str), Some("kept"));
}

#[test]
fn malformed_document_is_a_format_error_and_store_is_untouched() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    for raw in [
        "{ not json",
        r#"{"version": "1.0", "tasks": []}"#,
        r#"{"version": "1.0", "exportedAt": "yesterday", "tasks": []}"#,
        r#"{"version": "1.0", "exportedAt": "2024-01-01T00:00:00Z", "tasks": [
            {"title": "x", "quadrant": 9, "isCompleted": false, "createdAt": "2024-01-01T00:00:00Z"}
        ]}"#,
    ] {
        let err = transfer(&conn).import_json(raw, true).unwrap_err();
        assert!(matches!(err, TransferError::Format(_)), "{raw}");
        assert!(!err.is_store_failure());
    }
    assert_eq!(task_service(&conn).counts().unwrap().total, 3);
}

#[test]
fn invalid_task_entry_is_rejected_before_clearing() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let snapshot = snapshot_with(
        vec![snapshot_task("fine"), snapshot_task("   ")],
        BTreeMap::new(),
    );

    let err = transfer(&conn).import_snapshot(&snapshot, true).unwrap_err();
    match err {
        TransferError::InvalidTask { index, error } => {
            assert_eq!(index, 1);
            assert_eq!(error, TaskValidationError::TitleRequired);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(task_service(&conn).counts().unwrap().total, 3);
}

#[test]
fn oversized_setting_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let mut values = BTreeMap::new();
    values.insert("Theme".to_string(), "v".repeat(501));

    let err = transfer(&conn)
        .import_snapshot(&snapshot_with(vec![snapshot_task("a")], values), false)
        .unwrap_err();
    assert!(matches!(err, TransferError::InvalidSetting(_)));
    assert_eq!(task_service(&conn).counts().unwrap().total, 0);
}

#[test]
fn legacy_pascal_case_export_imports() {
    let conn = open_db_in_memory().unwrap();
    let raw = r#"{
        "Version": "1.0",
        "ExportedAt": "2024-01-06T10:00:00.123Z",
        "Tasks": [
            {"Title": "Water plants", "Notes": null, "Quadrant": 1,
             "DueDate": "2024-01-07T00:00:00", "IsCompleted": false,
             "CreatedAt": "2024-01-02T08:00:00"}
        ],
        "Settings": {"Theme": "System", "ShowCompletedTasks": "false", "ViewMode": "List"}
    }"#;

    let outcome = transfer(&conn).import_json(raw, false).unwrap();
    assert_eq!(outcome.tasks_imported, 1);
    assert!(outcome.settings_imported);

    let task = task_service(&conn).list_all().unwrap().remove(0);
    assert_eq!(task.title, "Water plants");
    assert_eq!(task.quadrant, Quadrant::NotUrgentImportant);
    assert_eq!(
        task.due_date,
        Some(Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap())
    );
    let settings_service = settings(&conn);
    assert_eq!(settings_service.theme().unwrap(), Theme::System);
    assert!(!settings_service.show_completed().unwrap());
}
