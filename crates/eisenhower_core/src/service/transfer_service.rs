//! Export/import use-case service.
//!
//! # Responsibility
//! - Serialize all tasks and settings into a versioned snapshot.
//! - Restore a snapshot, optionally clearing existing tasks first.
//!
//! # Invariants
//! - Imported tasks are always inserted as new rows (no deduplication).
//! - The whole snapshot is validated before the first store mutation.
//! - Settings are only touched when the snapshot carries any.
//! - Clearing and inserting are separate store calls.

use crate::model::settings::{validate_setting, SettingValidationError};
use crate::model::snapshot::{ExportSnapshot, SnapshotTask, SNAPSHOT_VERSION};
use crate::model::task::{validate_fields, TaskValidationError};
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::task_repo::{NewTask, TaskListQuery, TaskOrder, TaskRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::settings_service::SettingsService;
use chrono::Utc;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result counters of one import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub tasks_imported: usize,
    pub settings_imported: bool,
}

/// Service error for export/import use-cases.
#[derive(Debug)]
pub enum TransferError {
    /// Document could not be parsed into the snapshot shape.
    Format(serde_json::Error),
    /// Snapshot could not be encoded.
    Encode(serde_json::Error),
    /// Task entry at `index` breaks task input rules.
    InvalidTask {
        index: usize,
        error: TaskValidationError,
    },
    /// Settings pair breaks storage bounds.
    InvalidSetting(SettingValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl TransferError {
    /// True when the failure is not caused by the submitted document.
    pub fn is_store_failure(&self) -> bool {
        match self {
            Self::Format(_) | Self::InvalidTask { .. } | Self::InvalidSetting(_) => false,
            Self::Encode(_) => true,
            Self::Repo(err) => err.is_store_failure(),
        }
    }
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format(err) => write!(f, "invalid snapshot format: {err}"),
            Self::Encode(err) => write!(f, "snapshot encoding failed: {err}"),
            Self::InvalidTask { index, error } => {
                write!(f, "task #{index} {}: {error}", error.field())
            }
            Self::InvalidSetting(err) => write!(f, "{}: {err}", err.field()),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Format(err) | Self::Encode(err) => Some(err),
            Self::InvalidTask { error, .. } => Some(error),
            Self::InvalidSetting(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for TransferError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::SettingValidation(err) => Self::InvalidSetting(err),
            other => Self::Repo(other),
        }
    }
}

/// Snapshot facade composing task and settings persistence.
pub struct TransferService<R: TaskRepository, S: SettingsRepository> {
    tasks: R,
    settings: SettingsService<S>,
}

impl<R: TaskRepository, S: SettingsRepository> TransferService<R, S> {
    pub fn new(tasks: R, settings: SettingsService<S>) -> Self {
        Self { tasks, settings }
    }

    /// Captures every task and setting, stamped now with the current version.
    pub fn export_snapshot(&self) -> RepoResult<ExportSnapshot> {
        let query = TaskListQuery {
            order: TaskOrder::Insertion,
            ..TaskListQuery::all()
        };
        let tasks = self
            .tasks
            .list_tasks(&query)?
            .into_iter()
            .map(|task| SnapshotTask {
                title: task.title,
                notes: task.notes,
                quadrant: task.quadrant,
                due_date: task.due_date,
                is_completed: task.completed,
                created_at: task.created_at,
            })
            .collect::<Vec<_>>();
        let settings = self.settings.all_as_map()?;

        info!(
            "event=snapshot_export module=service status=ok tasks={} settings={}",
            tasks.len(),
            settings.len()
        );
        Ok(ExportSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            exported_at: Utc::now(),
            tasks,
            settings,
        })
    }

    /// Export encoded as indented JSON.
    pub fn export_json(&self) -> Result<String, TransferError> {
        let snapshot = self.export_snapshot()?;
        snapshot.to_json_pretty().map_err(TransferError::Encode)
    }

    /// Parses `raw` and imports it.
    ///
    /// # Errors
    /// Returns `TransferError::Format` without touching the store when the
    /// document is not a valid snapshot.
    pub fn import_json(
        &self,
        raw: &str,
        clear_existing: bool,
    ) -> Result<ImportOutcome, TransferError> {
        let snapshot = ExportSnapshot::from_json(raw).map_err(TransferError::Format)?;
        self.import_snapshot(&snapshot, clear_existing)
    }

    /// Restores `snapshot`, inserting every task as a new row.
    pub fn import_snapshot(
        &self,
        snapshot: &ExportSnapshot,
        clear_existing: bool,
    ) -> Result<ImportOutcome, TransferError> {
        validate_snapshot(snapshot)?;
        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                "event=snapshot_import module=service status=version_mismatch version={}",
                snapshot.version
            );
        }

        if clear_existing {
            let removed = self.tasks.delete_all()?;
            info!("event=snapshot_import module=service status=cleared removed={removed}");
        }

        let now = Utc::now();
        let records = snapshot
            .tasks
            .iter()
            .map(|task| NewTask {
                title: task.title.clone(),
                notes: task.notes.clone(),
                quadrant: task.quadrant,
                due_date: task.due_date,
                completed: task.is_completed,
                created_at: task.created_at,
                updated_at: now,
            })
            .collect::<Vec<_>>();
        let tasks_imported = self.tasks.insert_tasks(&records)?;

        let settings_imported = !snapshot.settings.is_empty();
        if settings_imported {
            self.settings.import_all(&snapshot.settings)?;
        }

        info!(
            "event=snapshot_import module=service status=ok tasks={} settings_imported={}",
            tasks_imported, settings_imported
        );
        Ok(ImportOutcome {
            tasks_imported,
            settings_imported,
        })
    }
}

fn validate_snapshot(snapshot: &ExportSnapshot) -> Result<(), TransferError> {
    for (index, task) in snapshot.tasks.iter().enumerate() {
        validate_fields(&task.title, task.notes.as_deref())
            .map_err(|error| TransferError::InvalidTask { index, error })?;
    }
    for (key, value) in &snapshot.settings {
        validate_setting(key, value).map_err(TransferError::InvalidSetting)?;
    }
    Ok(())
}
