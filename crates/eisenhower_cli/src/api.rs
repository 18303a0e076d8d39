//! Caller-facing boundary over core services.
//!
//! # Responsibility
//! - Build services per call from one open connection.
//! - Convert every failure into a user-facing response.
//!
//! # Invariants
//! - Validation and format rejections are shown verbatim and
//!   field-attributed.
//! - Store failures are logged with their full error chain and shown as a
//!   generic message.
//! - Unknown task ids produce `ok=false` responses without error logs.

use eisenhower_core::{
    MatrixView, Quadrant, RepoError, SettingsService, SettingsSummary, SqliteSettingsRepository,
    SqliteTaskRepository, Task, TaskId, TaskInput, TaskService, TaskServiceError, Theme,
    TransferError, TransferService, ViewMode,
};
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Task touched by the operation, when there is one.
    pub task_id: Option<TaskId>,
    /// Human-readable outcome.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, task_id: Option<TaskId>) -> Self {
        Self {
            ok: true,
            task_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

impl From<String> for ActionResponse {
    fn from(message: String) -> Self {
        Self::failure(message)
    }
}

/// Failure classified for presentation.
enum Failure {
    /// Caller input problem; message is safe to show.
    Rejected(String),
    /// Unexpected store problem; detail is for logs only.
    Store(String),
}

impl From<RepoError> for Failure {
    fn from(value: RepoError) -> Self {
        if value.is_store_failure() {
            Self::Store(error_chain(&value))
        } else {
            Self::Rejected(value.to_string())
        }
    }
}

impl From<TaskServiceError> for Failure {
    fn from(value: TaskServiceError) -> Self {
        if value.is_store_failure() {
            Self::Store(error_chain(&value))
        } else {
            Self::Rejected(value.to_string())
        }
    }
}

impl From<TransferError> for Failure {
    fn from(value: TransferError) -> Self {
        match value {
            TransferError::Format(err) => Self::Rejected(format!("Invalid snapshot format: {err}")),
            other if other.is_store_failure() => Self::Store(error_chain(&other)),
            other => Self::Rejected(format!("Invalid snapshot: {other}")),
        }
    }
}

struct Services<'conn> {
    task_repo: SqliteTaskRepository<'conn>,
    tasks: TaskService<SqliteTaskRepository<'conn>, SqliteSettingsRepository<'conn>>,
    settings: SettingsService<SqliteSettingsRepository<'conn>>,
    transfer: TransferService<SqliteTaskRepository<'conn>, SqliteSettingsRepository<'conn>>,
}

impl<'conn> Services<'conn> {
    fn try_new(conn: &'conn Connection) -> Result<Self, RepoError> {
        let task_repo = SqliteTaskRepository::try_new(conn)?;
        let settings_repo = SqliteSettingsRepository::try_new(conn)?;
        Ok(Self {
            task_repo,
            tasks: TaskService::new(task_repo, SettingsService::new(settings_repo)),
            settings: SettingsService::new(settings_repo),
            transfer: TransferService::new(task_repo, SettingsService::new(settings_repo)),
        })
    }
}

/// Runs `f` and maps failures to a user-facing message.
///
/// `action` completes the sentence "An error occurred while ...".
fn run<T>(
    conn: &Connection,
    event: &'static str,
    action: &'static str,
    f: impl FnOnce(&Services<'_>) -> Result<T, Failure>,
) -> Result<T, String> {
    let outcome = Services::try_new(conn)
        .map_err(Failure::from)
        .and_then(|services| f(&services));

    outcome.map_err(|failure| match failure {
        Failure::Rejected(message) => {
            info!("event={event} module=api status=rejected");
            message
        }
        Failure::Store(detail) => {
            error!(
                "event={event} module=api status=error error_code=store_failure error={detail}"
            );
            format!("An error occurred while {action}.")
        }
    })
}

pub fn task_list(conn: &Connection, quadrant: Option<Quadrant>) -> Result<Vec<Task>, String> {
    run(conn, "task_list", "loading tasks", |services| {
        let tasks = match quadrant {
            Some(quadrant) => services.tasks.list_by_quadrant(quadrant)?,
            None => services.tasks.list_all()?,
        };
        Ok(tasks)
    })
}

pub fn task_get(conn: &Connection, id: TaskId) -> Result<Option<Task>, String> {
    run(conn, "task_get", "loading the task", |services| {
        Ok(services.tasks.get(id)?)
    })
}

pub fn matrix(conn: &Connection, filter: Option<Quadrant>) -> Result<MatrixView, String> {
    run(conn, "matrix_view", "loading the matrix", |services| {
        Ok(services.tasks.matrix_view(filter)?)
    })
}

pub fn task_create(conn: &Connection, input: &TaskInput) -> ActionResponse {
    match run(conn, "task_create", "creating the task", |services| {
        Ok(services.tasks.create(input)?)
    }) {
        Ok(task) => ActionResponse::success("Task created successfully!", Some(task.id)),
        Err(message) => message.into(),
    }
}

pub fn task_update(conn: &Connection, id: TaskId, input: &TaskInput) -> ActionResponse {
    match run(conn, "task_update", "updating the task", |services| {
        Ok(services.tasks.update(id, input)?)
    }) {
        Ok(Some(task)) => ActionResponse::success("Task updated successfully!", Some(task.id)),
        Ok(None) => ActionResponse::failure("Task not found."),
        Err(message) => message.into(),
    }
}

pub fn task_move(conn: &Connection, id: TaskId, quadrant: Quadrant) -> ActionResponse {
    match run(conn, "task_move", "moving the task", |services| {
        Ok(services.tasks.move_to_quadrant(id, quadrant)?)
    }) {
        Ok(Some(task)) => {
            ActionResponse::success(format!("Task moved to {quadrant}."), Some(task.id))
        }
        Ok(None) => ActionResponse::failure("Task not found."),
        Err(message) => message.into(),
    }
}

pub fn task_toggle(conn: &Connection, id: TaskId) -> ActionResponse {
    match run(conn, "task_toggle", "updating the task", |services| {
        Ok(services.tasks.toggle_completion(id)?)
    }) {
        Ok(true) => ActionResponse::success("Task updated.", Some(id)),
        Ok(false) => ActionResponse::failure("Task not found."),
        Err(message) => message.into(),
    }
}

pub fn task_delete(conn: &Connection, id: TaskId) -> ActionResponse {
    match run(conn, "task_delete", "deleting the task", |services| {
        Ok(services.tasks.delete(id)?)
    }) {
        Ok(true) => ActionResponse::success("Task deleted successfully!", Some(id)),
        Ok(false) => ActionResponse::failure("Task not found."),
        Err(message) => message.into(),
    }
}

pub fn tasks_clear_completed(conn: &Connection) -> ActionResponse {
    match run(conn, "task_clear_completed", "clearing tasks", |services| {
        Ok(services.tasks.clear_completed()?)
    }) {
        Ok(count) => ActionResponse::success(format!("Cleared {count} completed task(s)."), None),
        Err(message) => message.into(),
    }
}

pub fn settings_summary(conn: &Connection) -> Result<SettingsSummary, String> {
    run(conn, "settings_summary", "loading settings", |services| {
        Ok(services.settings.settings_summary(&services.task_repo)?)
    })
}

pub fn settings_set_theme(conn: &Connection, theme: Theme) -> ActionResponse {
    match run(conn, "settings_set_theme", "updating theme", |services| {
        Ok(services.settings.set_theme(theme)?)
    }) {
        Ok(()) => ActionResponse::success("Theme updated successfully!", None),
        Err(message) => message.into(),
    }
}

pub fn settings_set_show_completed(conn: &Connection, show: bool) -> ActionResponse {
    match run(conn, "settings_set_show_completed", "updating settings", |services| {
        Ok(services.settings.set_show_completed(show)?)
    }) {
        Ok(()) => ActionResponse::success("Settings updated.", None),
        Err(message) => message.into(),
    }
}

pub fn settings_set_view_mode(conn: &Connection, view_mode: ViewMode) -> ActionResponse {
    match run(conn, "settings_set_view_mode", "updating settings", |services| {
        Ok(services.settings.set_view_mode(view_mode)?)
    }) {
        Ok(()) => ActionResponse::success("Settings updated.", None),
        Err(message) => message.into(),
    }
}

/// Exported snapshot JSON plus the number of tasks it holds.
pub fn snapshot_export(conn: &Connection) -> Result<(String, u64), String> {
    run(conn, "snapshot_export", "exporting data", |services| {
        let json = services.transfer.export_json()?;
        let counts = services.tasks.counts()?;
        Ok((json, counts.total))
    })
}

pub fn snapshot_import(conn: &Connection, raw: &str, clear_existing: bool) -> ActionResponse {
    match run(conn, "snapshot_import", "importing data", |services| {
        Ok(services.transfer.import_json(raw, clear_existing)?)
    }) {
        Ok(outcome) => {
            let mut message = format!("Successfully imported {} task(s)", outcome.tasks_imported);
            if outcome.settings_imported {
                message.push_str(" and settings");
            }
            message.push('.');
            ActionResponse::success(message, None)
        }
        Err(message) => message.into(),
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !chain.ends_with(&text) {
            chain.push_str(": ");
            chain.push_str(&text);
        }
        source = cause.source();
    }
    chain
}
