//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and bulk APIs over the `tasks` table.
//! - Own the canonical listing order.
//!
//! # Invariants
//! - Write paths validate title/notes before SQL mutations.
//! - Every mutation advances `updated_at` to `max(now, updated_at + 1)`.
//! - Listings order by incomplete first, due date ascending with missing
//!   dates last, then creation time descending (row id descending breaks
//!   remaining ties).

use super::{ensure_table, RepoError, RepoResult};
use crate::model::task::{validate_fields, Quadrant, Task, TaskId, TaskInput};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    notes,
    quadrant,
    due_date,
    is_completed,
    created_at,
    updated_at
FROM tasks";

const DISPLAY_ORDER_SQL: &str =
    " ORDER BY is_completed ASC, due_date IS NULL ASC, due_date ASC, created_at DESC, id DESC";

/// Row order for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskOrder {
    /// Canonical user-facing order.
    #[default]
    Display,
    /// Ascending row id, used by exports.
    Insertion,
}

/// Query options for listing tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskListQuery {
    pub quadrant: Option<Quadrant>,
    pub include_completed: bool,
    pub order: TaskOrder,
}

impl TaskListQuery {
    /// Every task, completed included, in display order.
    pub fn all() -> Self {
        Self {
            include_completed: true,
            ..Self::default()
        }
    }

    pub fn in_quadrant(quadrant: Quadrant) -> Self {
        Self {
            quadrant: Some(quadrant),
            ..Self::all()
        }
    }
}

/// Fully specified row for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub notes: Option<String>,
    pub quadrant: Quadrant,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewTask {
    /// Fresh, incomplete task stamped at `now`.
    pub fn from_input(input: &TaskInput, now: DateTime<Utc>) -> Self {
        Self {
            title: input.title.clone(),
            notes: input.notes.clone(),
            quadrant: input.quadrant,
            due_date: input.due_date,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Total and completed task counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub total: u64,
    pub completed: u64,
}

/// Repository interface for task persistence.
pub trait TaskRepository {
    fn insert_task(&self, task: &NewTask) -> RepoResult<TaskId>;
    /// Inserts all rows in one transaction and returns the inserted count.
    fn insert_tasks(&self, tasks: &[NewTask]) -> RepoResult<usize>;
    /// Full replacement of editable fields. Returns `false` when absent.
    fn update_task(&self, id: TaskId, input: &TaskInput, now: DateTime<Utc>) -> RepoResult<bool>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<bool>;
    fn toggle_completed(&self, id: TaskId, now: DateTime<Utc>) -> RepoResult<bool>;
    fn delete_completed(&self) -> RepoResult<usize>;
    fn delete_all(&self) -> RepoResult<usize>;
    fn count_tasks(&self) -> RepoResult<TaskCounts>;
}

/// SQLite-backed task repository.
#[derive(Clone, Copy)]
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// Returns `MissingRequiredTable` when migrations have not run.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "tasks")?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &NewTask) -> RepoResult<TaskId> {
        insert_row(self.conn, task)
    }

    fn insert_tasks(&self, tasks: &[NewTask]) -> RepoResult<usize> {
        for task in tasks {
            validate_fields(&task.title, task.notes.as_deref())?;
        }

        let tx = self.conn.unchecked_transaction()?;
        for task in tasks {
            insert_row(&tx, task)?;
        }
        tx.commit()?;
        Ok(tasks.len())
    }

    fn update_task(&self, id: TaskId, input: &TaskInput, now: DateTime<Utc>) -> RepoResult<bool> {
        input.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?2,
                notes = ?3,
                quadrant = ?4,
                due_date = ?5,
                is_completed = ?6,
                updated_at = MAX(?7, updated_at + 1)
             WHERE id = ?1;",
            params![
                id,
                input.title.as_str(),
                input.notes.as_deref(),
                input.quadrant.ordinal(),
                input.due_date.as_ref().map(DateTime::timestamp_millis),
                bool_to_int(input.completed),
                now.timestamp_millis(),
            ],
        )?;

        Ok(changed > 0)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_completed {
            sql.push_str(" AND is_completed = 0");
        }

        if let Some(quadrant) = query.quadrant {
            sql.push_str(" AND quadrant = ?");
            bind_values.push(Value::Integer(i64::from(quadrant.ordinal())));
        }

        match query.order {
            TaskOrder::Display => sql.push_str(DISPLAY_ORDER_SQL),
            TaskOrder::Insertion => sql.push_str(" ORDER BY id ASC"),
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn toggle_completed(&self, id: TaskId, now: DateTime<Utc>) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                is_completed = 1 - is_completed,
                updated_at = MAX(?2, updated_at + 1)
             WHERE id = ?1;",
            params![id, now.timestamp_millis()],
        )?;
        Ok(changed > 0)
    }

    fn delete_completed(&self) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM tasks WHERE is_completed = 1;", [])?;
        Ok(removed)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM tasks;", [])?;
        Ok(removed)
    }

    fn count_tasks(&self) -> RepoResult<TaskCounts> {
        let (total, completed): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_completed), 0) FROM tasks;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(TaskCounts {
            total: u64::try_from(total).unwrap_or_default(),
            completed: u64::try_from(completed).unwrap_or_default(),
        })
    }
}

fn insert_row(conn: &Connection, task: &NewTask) -> RepoResult<TaskId> {
    validate_fields(&task.title, task.notes.as_deref())?;

    let updated_at = task.updated_at.max(task.created_at);
    conn.execute(
        "INSERT INTO tasks (
            title,
            notes,
            quadrant,
            due_date,
            is_completed,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            task.title.as_str(),
            task.notes.as_deref(),
            task.quadrant.ordinal(),
            task.due_date.as_ref().map(DateTime::timestamp_millis),
            bool_to_int(task.completed),
            task.created_at.timestamp_millis(),
            updated_at.timestamp_millis(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;

    let quadrant_value: i64 = row.get("quadrant")?;
    let quadrant = Quadrant::from_ordinal(quadrant_value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid quadrant `{quadrant_value}` in tasks.quadrant for id {id}"
        ))
    })?;

    let completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in tasks.is_completed for id {id}"
            )));
        }
    };

    let due_date = match row.get::<_, Option<i64>>("due_date")? {
        Some(value) => Some(parse_epoch_ms(value, "due_date")?),
        None => None,
    };

    Ok(Task {
        id,
        title: row.get("title")?,
        notes: row.get("notes")?,
        quadrant,
        due_date,
        completed,
        created_at: parse_epoch_ms(row.get("created_at")?, "created_at")?,
        updated_at: parse_epoch_ms(row.get("updated_at")?, "updated_at")?,
    })
}

fn parse_epoch_ms(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timestamp `{value}` in tasks.{column}"))
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
