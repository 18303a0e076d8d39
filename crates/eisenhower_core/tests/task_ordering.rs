use chrono::{DateTime, TimeZone, Utc};
use eisenhower_core::db::open_db_in_memory;
use eisenhower_core::{
    NewTask, Quadrant, SettingsService, SqliteSettingsRepository, SqliteTaskRepository, Task,
    TaskId, TaskInput, TaskRepository, TaskService,
};
use rusqlite::Connection;

fn task_service(
    conn: &Connection,
) -> TaskService<SqliteTaskRepository<'_>, SqliteSettingsRepository<'_>> {
    TaskService::new(
        SqliteTaskRepository::try_new(conn).unwrap(),
        SettingsService::new(SqliteSettingsRepository::try_new(conn).unwrap()),
    )
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

fn seed(
    conn: &Connection,
    title: &str,
    quadrant: Quadrant,
    due_date: Option<DateTime<Utc>>,
    completed: bool,
    created_at: DateTime<Utc>,
) -> TaskId {
    let repo = SqliteTaskRepository::try_new(conn).unwrap();
    repo.insert_task(&NewTask {
        title: title.to_string(),
        notes: None,
        quadrant,
        due_date,
        completed,
        created_at,
        updated_at: created_at,
    })
    .unwrap()
}

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}

#[test]
fn list_all_orders_incomplete_first_then_due_date_then_newest() {
    let conn = open_db_in_memory().unwrap();
    let q = Quadrant::UrgentImportant;
    seed(&conn, "done-early", q, Some(day(1)), true, day(1));
    seed(&conn, "due-10", q, Some(day(10)), false, day(1));
    seed(&conn, "no-due-old", q, None, false, day(2));
    seed(&conn, "due-5", q, Some(day(5)), false, day(1));
    seed(&conn, "no-due-new", q, None, false, day(3));
    seed(&conn, "done-no-due", q, None, true, day(4));
    seed(&conn, "due-5-newer", q, Some(day(5)), false, day(6));

    let listed = task_service(&conn).list_all().unwrap();
    assert_eq!(
        titles(&listed),
        vec![
            "due-5-newer",
            "due-5",
            "due-10",
            "no-due-new",
            "no-due-old",
            "done-early",
            "done-no-due",
        ]
    );
}

#[test]
fn list_all_keeps_completed_after_incomplete_for_any_mix() {
    let conn = open_db_in_memory().unwrap();
    let service = task_service(&conn);
    for index in 0..12u32 {
        let mut input = TaskInput::new(format!("task {index}"))
            .with_quadrant(Quadrant::ALL[(index % 4) as usize]);
        if index % 3 != 0 {
            input = input.with_due_date(day(1 + index % 7));
        }
        let task = service.create(&input).unwrap();
        if index % 2 == 0 {
            service.toggle_completion(task.id).unwrap();
        }
    }

    let listed = service.list_all().unwrap();
    let first_completed = listed
        .iter()
        .position(|task| task.completed)
        .unwrap_or(listed.len());
    assert!(listed[first_completed..].iter().all(|task| task.completed));

    for group in [&listed[..first_completed], &listed[first_completed..]] {
        for pair in group.windows(2) {
            match (pair[0].due_date, pair[1].due_date) {
                (Some(a), Some(b)) => assert!(a <= b),
                (None, Some(_)) => panic!("missing due date sorted before a dated task"),
                _ => {}
            }
            if pair[0].due_date == pair[1].due_date {
                assert!(pair[0].created_at >= pair[1].created_at);
            }
        }
    }
}

#[test]
fn list_by_quadrant_filters_with_same_order() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "other", Quadrant::UrgentImportant, None, false, day(1));
    seed(&conn, "done", Quadrant::NotUrgentImportant, None, true, day(9));
    seed(&conn, "later", Quadrant::NotUrgentImportant, Some(day(8)), false, day(1));
    seed(&conn, "sooner", Quadrant::NotUrgentImportant, Some(day(2)), false, day(1));

    let listed = task_service(&conn)
        .list_by_quadrant(Quadrant::NotUrgentImportant)
        .unwrap();
    assert_eq!(titles(&listed), vec!["sooner", "later", "done"]);
}

#[test]
fn pay_rent_example_moves_to_end_and_is_cleared() {
    let conn = open_db_in_memory().unwrap();
    let service = task_service(&conn);
    service.create(&TaskInput::new("Buy milk")).unwrap();
    service
        .create(&TaskInput::new("Plan trip").with_quadrant(Quadrant::NotUrgentImportant))
        .unwrap();
    let rent = service
        .create(
            &TaskInput::new("Pay rent")
                .with_quadrant(Quadrant::UrgentImportant)
                .with_due_date(day(5)),
        )
        .unwrap();

    assert_eq!(service.list_all().unwrap()[0].id, rent.id);

    service.toggle_completion(rent.id).unwrap();
    let listed = service.list_all().unwrap();
    assert_eq!(listed.last().unwrap().id, rent.id);
    assert!(listed[..listed.len() - 1].iter().all(|task| !task.completed));

    assert_eq!(service.clear_completed().unwrap(), 1);
    let remaining = service.list_all().unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|task| task.id != rent.id));
}
