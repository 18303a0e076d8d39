//! Core domain logic for the Eisenhower task matrix.
//! This crate is the single source of truth for task and settings invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigOverrides};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::settings::{SettingValidationError, SettingsSummary, Theme, ViewMode};
pub use model::snapshot::{default_export_file_name, ExportSnapshot, SnapshotTask};
pub use model::task::{Quadrant, Task, TaskId, TaskInput, TaskValidationError};
pub use repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
pub use repo::task_repo::{
    NewTask, SqliteTaskRepository, TaskCounts, TaskListQuery, TaskOrder, TaskRepository,
};
pub use repo::{RepoError, RepoResult};
pub use service::settings_service::SettingsService;
pub use service::task_service::{MatrixView, TaskService, TaskServiceError};
pub use service::transfer_service::{ImportOutcome, TransferError, TransferService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
