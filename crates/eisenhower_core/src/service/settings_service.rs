//! Settings use-case service.
//!
//! # Responsibility
//! - Expose typed getters/setters over the raw key/value repository.
//! - Aggregate the settings summary with task counts.
//!
//! # Invariants
//! - Every read hits the store; nothing is cached across calls.
//! - Unset or unparseable values resolve to defaults, never to errors.
//! - `import_all` stores unknown keys verbatim.

use crate::model::settings::{
    bool_to_setting, keys, parse_bool, SettingsSummary, Theme, ViewMode, DEFAULT_SHOW_COMPLETED,
};
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoResult;
use log::{debug, warn};
use std::collections::BTreeMap;

/// Typed settings facade over repository implementations.
pub struct SettingsService<S: SettingsRepository> {
    repo: S,
}

impl<S: SettingsRepository> SettingsService<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// Current theme, `Light` when unset or unparseable.
    pub fn theme(&self) -> RepoResult<Theme> {
        self.read_typed(keys::THEME, Theme::parse, Theme::default())
    }

    pub fn set_theme(&self, theme: Theme) -> RepoResult<()> {
        self.write(keys::THEME, theme.as_str())
    }

    /// Whether completed tasks are shown, `true` when unset or unparseable.
    pub fn show_completed(&self) -> RepoResult<bool> {
        self.read_typed(
            keys::SHOW_COMPLETED_TASKS,
            parse_bool,
            DEFAULT_SHOW_COMPLETED,
        )
    }

    pub fn set_show_completed(&self, show: bool) -> RepoResult<()> {
        self.write(keys::SHOW_COMPLETED_TASKS, bool_to_setting(show))
    }

    /// Current view mode, `Card` when unset or unparseable.
    pub fn view_mode(&self) -> RepoResult<ViewMode> {
        self.read_typed(keys::VIEW_MODE, ViewMode::parse, ViewMode::default())
    }

    pub fn set_view_mode(&self, view_mode: ViewMode) -> RepoResult<()> {
        self.write(keys::VIEW_MODE, view_mode.as_str())
    }

    /// Current settings plus total/completed task counts.
    pub fn settings_summary(&self, tasks: &impl TaskRepository) -> RepoResult<SettingsSummary> {
        let counts = tasks.count_tasks()?;
        Ok(SettingsSummary {
            theme: self.theme()?,
            show_completed: self.show_completed()?,
            view_mode: self.view_mode()?,
            total_tasks: counts.total,
            completed_tasks: counts.completed,
        })
    }

    /// Every stored key/value pair.
    pub fn all_as_map(&self) -> RepoResult<BTreeMap<String, String>> {
        self.repo.list_settings()
    }

    /// Upserts every pair, including keys this build does not know.
    pub fn import_all(&self, values: &BTreeMap<String, String>) -> RepoResult<()> {
        let written = self.repo.set_settings(values)?;
        debug!("event=settings_import module=service status=ok count={written}");
        Ok(())
    }

    fn read_typed<T>(
        &self,
        key: &'static str,
        parse: impl Fn(&str) -> Option<T>,
        default: T,
    ) -> RepoResult<T> {
        let Some(raw) = self.repo.get_setting(key)? else {
            return Ok(default);
        };
        match parse(&raw) {
            Some(value) => Ok(value),
            None => {
                warn!("event=settings_read module=service status=fallback key={key}");
                Ok(default)
            }
        }
    }

    fn write(&self, key: &'static str, value: &str) -> RepoResult<()> {
        self.repo.set_setting(key, value)?;
        debug!("event=settings_write module=service status=ok key={key} value={value}");
        Ok(())
    }
}
