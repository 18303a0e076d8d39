use eisenhower_core::db::migrations::{apply_migrations, latest_version};
use eisenhower_core::db::{open_db, open_db_in_memory, DbError};
use eisenhower_core::{SettingsService, SqliteSettingsRepository, Theme};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "tasks");
    assert_table_exists(&conn, "settings");
}

#[test]
fn fresh_store_is_seeded_with_default_settings() {
    let conn = open_db_in_memory().unwrap();

    let rows: Vec<(String, String)> = conn
        .prepare("SELECT key, value FROM settings ORDER BY id;")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            ("Theme".to_string(), "Light".to_string()),
            ("ShowCompletedTasks".to_string(), "true".to_string()),
            ("ViewMode".to_string(), "Card".to_string()),
        ]
    );
}

#[test]
fn migrating_a_current_store_again_changes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "UPDATE settings SET value = 'Dark' WHERE key = 'Theme';",
        [],
    )
    .unwrap();

    apply_migrations(&mut conn).unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    let theme: String = conn
        .query_row("SELECT value FROM settings WHERE key = 'Theme';", [], |row| row.get(0))
        .unwrap();
    assert_eq!(theme, "Dark");
}

#[test]
fn reopening_keeps_schema_and_user_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eisenhower.db");

    let conn_first = open_db(&path).unwrap();
    let settings = SettingsService::new(SqliteSettingsRepository::try_new(&conn_first).unwrap());
    settings.set_theme(Theme::Dark).unwrap();
    drop(settings);
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let settings = SettingsService::new(SqliteSettingsRepository::try_new(&conn_second).unwrap());
    assert_eq!(settings.theme().unwrap(), Theme::Dark);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteSettingsRepository::try_new(&conn).err().unwrap();
    assert!(err.to_string().contains("settings"));
    assert!(err.is_store_failure());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
