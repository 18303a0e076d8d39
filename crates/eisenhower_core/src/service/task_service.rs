//! Task use-case service.
//!
//! # Responsibility
//! - Provide task CRUD, completion, quadrant moves and bulk clearing.
//! - Assemble the four-quadrant matrix view from current settings.
//!
//! # Invariants
//! - Input is validated before any store mutation.
//! - Unknown ids are an expected outcome (`None` / `false`), not errors.
//! - The matrix filter narrows the working set before partitioning, so
//!   every quadrant list is always present.

use crate::model::settings::{Theme, ViewMode};
use crate::model::task::{Quadrant, Task, TaskId, TaskInput, TaskValidationError};
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::task_repo::{NewTask, TaskCounts, TaskListQuery, TaskRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::settings_service::SettingsService;
use chrono::Utc;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Field-attributed input rejection.
    Validation(TaskValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back did not find the row.
    InconsistentState(&'static str),
}

impl TaskServiceError {
    /// True when the failure is not the caller's fault.
    pub fn is_store_failure(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::Repo(err) => err.is_store_failure(),
            Self::InconsistentState(_) => true,
        }
    }
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{}: {err}", err.field()),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent task state: {details}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TaskValidation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Four-quadrant view-model with the settings that shaped it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixView {
    pub urgent_important: Vec<Task>,
    pub not_urgent_important: Vec<Task>,
    pub urgent_not_important: Vec<Task>,
    pub not_urgent_not_important: Vec<Task>,
    pub show_completed: bool,
    pub view_mode: ViewMode,
    pub theme: Theme,
    pub filter: Option<Quadrant>,
}

impl MatrixView {
    /// Ordered tasks of one quadrant.
    pub fn tasks(&self, quadrant: Quadrant) -> &[Task] {
        match quadrant {
            Quadrant::UrgentImportant => &self.urgent_important,
            Quadrant::NotUrgentImportant => &self.not_urgent_important,
            Quadrant::UrgentNotImportant => &self.urgent_not_important,
            Quadrant::NotUrgentNotImportant => &self.not_urgent_not_important,
        }
    }

    /// Number of tasks across all four lists.
    pub fn len(&self) -> usize {
        Quadrant::ALL
            .into_iter()
            .map(|quadrant| self.tasks(quadrant).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn tasks_mut(&mut self, quadrant: Quadrant) -> &mut Vec<Task> {
        match quadrant {
            Quadrant::UrgentImportant => &mut self.urgent_important,
            Quadrant::NotUrgentImportant => &mut self.not_urgent_important,
            Quadrant::UrgentNotImportant => &mut self.urgent_not_important,
            Quadrant::NotUrgentNotImportant => &mut self.not_urgent_not_important,
        }
    }
}

/// Task facade over repository implementations.
pub struct TaskService<R: TaskRepository, S: SettingsRepository> {
    repo: R,
    settings: SettingsService<S>,
}

impl<R: TaskRepository, S: SettingsRepository> TaskService<R, S> {
    /// Creates a service reading display settings through `settings`.
    pub fn new(repo: R, settings: SettingsService<S>) -> Self {
        Self { repo, settings }
    }

    /// Every task in display order.
    pub fn list_all(&self) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(&TaskListQuery::all())
    }

    /// Tasks of one quadrant in display order.
    pub fn list_by_quadrant(&self, quadrant: Quadrant) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(&TaskListQuery::in_quadrant(quadrant))
    }

    pub fn get(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    /// Creates an incomplete task stamped with the current time.
    ///
    /// `input.completed` is ignored.
    pub fn create(&self, input: &TaskInput) -> Result<Task, TaskServiceError> {
        input.validate()?;

        let id = self
            .repo
            .insert_task(&NewTask::from_input(input, Utc::now()))?;
        debug!(
            "event=task_create module=service status=ok task_id={id} quadrant={}",
            input.quadrant.ordinal()
        );
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::InconsistentState(
                "created task not found in read-back",
            ))
    }

    /// Replaces every editable field. Returns `None` for unknown ids.
    pub fn update(&self, id: TaskId, input: &TaskInput) -> Result<Option<Task>, TaskServiceError> {
        input.validate()?;

        if !self.repo.update_task(id, input, Utc::now())? {
            debug!("event=task_update module=service status=not_found task_id={id}");
            return Ok(None);
        }
        debug!("event=task_update module=service status=ok task_id={id}");
        Ok(self.repo.get_task(id)?)
    }

    /// Moves a task by re-submitting its current fields with a new quadrant.
    pub fn move_to_quadrant(
        &self,
        id: TaskId,
        quadrant: Quadrant,
    ) -> Result<Option<Task>, TaskServiceError> {
        let Some(task) = self.repo.get_task(id)? else {
            return Ok(None);
        };
        let input = TaskInput {
            quadrant,
            ..task.to_input()
        };
        self.update(id, &input)
    }

    /// Returns `true` when a row was removed.
    pub fn delete(&self, id: TaskId) -> RepoResult<bool> {
        let removed = self.repo.delete_task(id)?;
        debug!("event=task_delete module=service status=ok task_id={id} removed={removed}");
        Ok(removed)
    }

    /// Flips completion. Returns `false` for unknown ids.
    pub fn toggle_completion(&self, id: TaskId) -> RepoResult<bool> {
        let toggled = self.repo.toggle_completed(id, Utc::now())?;
        debug!("event=task_toggle module=service status=ok task_id={id} found={toggled}");
        Ok(toggled)
    }

    /// Deletes every completed task and returns how many were removed.
    pub fn clear_completed(&self) -> RepoResult<usize> {
        let removed = self.repo.delete_completed()?;
        debug!("event=task_clear_completed module=service status=ok removed={removed}");
        Ok(removed)
    }

    pub fn counts(&self) -> RepoResult<TaskCounts> {
        self.repo.count_tasks()
    }

    /// Builds the matrix honoring the show-completed setting and `filter`.
    pub fn matrix_view(&self, filter: Option<Quadrant>) -> RepoResult<MatrixView> {
        let show_completed = self.settings.show_completed()?;
        let view_mode = self.settings.view_mode()?;
        let theme = self.settings.theme()?;

        let query = TaskListQuery {
            quadrant: filter,
            include_completed: show_completed,
            ..TaskListQuery::default()
        };
        let tasks = self.repo.list_tasks(&query)?;

        let mut view = MatrixView {
            urgent_important: Vec::new(),
            not_urgent_important: Vec::new(),
            urgent_not_important: Vec::new(),
            not_urgent_not_important: Vec::new(),
            show_completed,
            view_mode,
            theme,
            filter,
        };
        for task in tasks {
            view.tasks_mut(task.quadrant).push(task);
        }
        Ok(view)
    }
}
