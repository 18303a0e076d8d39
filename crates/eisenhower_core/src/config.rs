//! Runtime configuration resolution.
//!
//! # Responsibility
//! - Resolve database path and logging options for callers.
//!
//! # Invariants
//! - Precedence: explicit override, then environment, then default.
//! - Blank values are treated as unset at every level.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "EISENHOWER_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "EISENHOWER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "EISENHOWER_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "eisenhower.db";

/// Caller-supplied values that win over environment and defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

/// Effective configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env(overrides: ConfigOverrides) -> Self {
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves configuration using `lookup` for environment access.
    pub fn resolve(overrides: ConfigOverrides, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_value = |key: &str| lookup(key).and_then(non_blank);

        let db_path = overrides
            .db_path
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| env_value(ENV_DB_PATH).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME));

        let log_level = overrides
            .log_level
            .and_then(non_blank)
            .or_else(|| env_value(ENV_LOG_LEVEL))
            .unwrap_or_else(|| default_log_level().to_string());

        let log_dir = overrides
            .log_dir
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| env_value(ENV_LOG_DIR).map(PathBuf::from))
            .unwrap_or_else(default_log_dir);

        Self {
            db_path,
            log_level,
            log_dir,
        }
    }
}

fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join("eisenhower").join("logs")
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
