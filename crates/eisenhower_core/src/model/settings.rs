//! Typed settings model over the key/value store.
//!
//! # Responsibility
//! - Name the well-known setting keys and their defaults.
//! - Convert between typed values and their string storage form.
//!
//! # Invariants
//! - Stored form of enums is the variant name; booleans are lowercase.
//! - Parsing never fails the caller: unparseable values map to `None`
//!   and services fall back to defaults.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const SETTING_KEY_MAX_CHARS: usize = 50;
pub const SETTING_VALUE_MAX_CHARS: usize = 500;

/// Well-known setting keys. Names are shared with exported snapshots.
pub mod keys {
    pub const THEME: &str = "Theme";
    pub const SHOW_COMPLETED_TASKS: &str = "ShowCompletedTasks";
    pub const VIEW_MODE: &str = "ViewMode";
}

/// UI color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
            Self::System => "System",
        }
    }

    /// Lenient parse: trimmed, case-insensitive name or decimal ordinal.
    pub fn parse(value: &str) -> Option<Self> {
        parse_named(value, &Self::ALL, |theme| theme.as_str())
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task list layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Card,
    List,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [ViewMode::Card, ViewMode::List];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "Card",
            Self::List => "List",
        }
    }

    /// Lenient parse: trimmed, case-insensitive name or decimal ordinal.
    pub fn parse(value: &str) -> Option<Self> {
        parse_named(value, &Self::ALL, |mode| mode.as_str())
    }
}

impl Display for ViewMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_SHOW_COMPLETED: bool = true;

/// Lenient boolean parse for stored flags.
pub fn parse_bool(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Storage form of a boolean flag.
pub fn bool_to_setting(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn parse_named<T: Copy>(value: &str, all: &[T], name: impl Fn(T) -> &'static str) -> Option<T> {
    let trimmed = value.trim();
    if let Ok(ordinal) = trimmed.parse::<usize>() {
        return all.get(ordinal).copied();
    }
    all.iter()
        .copied()
        .find(|candidate| name(*candidate).eq_ignore_ascii_case(trimmed))
}

/// Current settings plus task counts, as shown on a settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingsSummary {
    pub theme: Theme,
    pub show_completed: bool,
    pub view_mode: ViewMode,
    pub total_tasks: u64,
    pub completed_tasks: u64,
}

/// Field-attributed rejection of a key/value write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValidationError {
    KeyRequired,
    KeyTooLong { max: usize, actual: usize },
    ValueTooLong { key: String, max: usize, actual: usize },
}

impl SettingValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::KeyRequired | Self::KeyTooLong { .. } => "key",
            Self::ValueTooLong { .. } => "value",
        }
    }
}

impl Display for SettingValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyRequired => write!(f, "setting key is required"),
            Self::KeyTooLong { max, actual } => {
                write!(f, "setting key cannot exceed {max} characters (got {actual})")
            }
            Self::ValueTooLong { key, max, actual } => write!(
                f,
                "value of setting `{key}` cannot exceed {max} characters (got {actual})"
            ),
        }
    }
}

impl Error for SettingValidationError {}

/// Checks the storage bounds of one key/value pair.
pub fn validate_setting(key: &str, value: &str) -> Result<(), SettingValidationError> {
    if key.trim().is_empty() {
        return Err(SettingValidationError::KeyRequired);
    }
    let key_chars = key.chars().count();
    if key_chars > SETTING_KEY_MAX_CHARS {
        return Err(SettingValidationError::KeyTooLong {
            max: SETTING_KEY_MAX_CHARS,
            actual: key_chars,
        });
    }
    let value_chars = value.chars().count();
    if value_chars > SETTING_VALUE_MAX_CHARS {
        return Err(SettingValidationError::ValueTooLong {
            key: key.to_string(),
            max: SETTING_VALUE_MAX_CHARS,
            actual: value_chars,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_bool, validate_setting, Theme, ViewMode};

    #[test]
    fn theme_parse_is_lenient() {
        assert_eq!(Theme::parse("Dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse(" system "), Some(Theme::System));
        assert_eq!(Theme::parse("1"), Some(Theme::Dark));
        assert_eq!(Theme::parse("9"), None);
        assert_eq!(Theme::parse("neon"), None);
    }

    #[test]
    fn view_mode_parse_is_lenient() {
        assert_eq!(ViewMode::parse("list"), Some(ViewMode::List));
        assert_eq!(ViewMode::parse("grid"), None);
    }

    #[test]
    fn bool_parse_accepts_any_case() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" false"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn setting_bounds_are_field_attributed() {
        assert_eq!(validate_setting("", "x").unwrap_err().field(), "key");
        assert_eq!(
            validate_setting(&"k".repeat(51), "x").unwrap_err().field(),
            "key"
        );
        assert_eq!(
            validate_setting("Theme", &"v".repeat(501))
                .unwrap_err()
                .field(),
            "value"
        );
        assert!(validate_setting("Custom", "anything").is_ok());
    }
}
