//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its write model.
//! - Own quadrant encoding and input validation rules.
//!
//! # Invariants
//! - `title` is never blank and at most `TITLE_MAX_CHARS` chars.
//! - `notes` is at most `NOTES_MAX_CHARS` chars when set.
//! - `quadrant` ordinals are stable: they are persisted and exported.
//! - `updated_at >= created_at`.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned task identity.
pub type TaskId = i64;

pub const TITLE_MAX_CHARS: usize = 200;
pub const NOTES_MAX_CHARS: usize = 1000;

/// Timestamps are stored as epoch milliseconds; finer precision is dropped
/// here so values held by callers match what a read returns.
pub fn to_store_precision(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

/// One of the four priority categories of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quadrant {
    /// Do first.
    UrgentImportant,
    /// Schedule.
    NotUrgentImportant,
    /// Delegate.
    UrgentNotImportant,
    /// Eliminate.
    NotUrgentNotImportant,
}

impl Default for Quadrant {
    fn default() -> Self {
        Self::UrgentImportant
    }
}

impl Quadrant {
    /// All quadrants in ordinal order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::UrgentImportant,
        Quadrant::NotUrgentImportant,
        Quadrant::UrgentNotImportant,
        Quadrant::NotUrgentNotImportant,
    ];

    /// Stable integer encoding shared by storage and snapshots.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::UrgentImportant => 0,
            Self::NotUrgentImportant => 1,
            Self::UrgentNotImportant => 2,
            Self::NotUrgentNotImportant => 3,
        }
    }

    /// Decodes a stable ordinal, rejecting values outside `0..=3`.
    pub fn from_ordinal(value: i64) -> Result<Self, TaskValidationError> {
        match value {
            0 => Ok(Self::UrgentImportant),
            1 => Ok(Self::NotUrgentImportant),
            2 => Ok(Self::UrgentNotImportant),
            3 => Ok(Self::NotUrgentNotImportant),
            other => Err(TaskValidationError::QuadrantOutOfRange(other)),
        }
    }

    /// Kebab-case label used by command-line callers.
    pub fn label(self) -> &'static str {
        match self {
            Self::UrgentImportant => "urgent-important",
            Self::NotUrgentImportant => "not-urgent-important",
            Self::UrgentNotImportant => "urgent-not-important",
            Self::NotUrgentNotImportant => "not-urgent-not-important",
        }
    }

    /// Parses either an ordinal (`"2"`) or a label (`"urgent-not-important"`).
    pub fn parse(value: &str) -> Result<Self, TaskValidationError> {
        let trimmed = value.trim();
        if let Ok(ordinal) = trimmed.parse::<i64>() {
            return Self::from_ordinal(ordinal);
        }
        let normalized = trimmed.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|quadrant| quadrant.label() == normalized)
            .ok_or_else(|| TaskValidationError::UnknownQuadrant(trimmed.to_string()))
    }
}

impl Display for Quadrant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical task record as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub notes: Option<String>,
    pub quadrant: Quadrant,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Write model carrying this task's current editable fields.
    ///
    /// Used by partial edits such as quadrant moves, which are expressed
    /// as full updates.
    pub fn to_input(&self) -> TaskInput {
        TaskInput {
            title: self.title.clone(),
            notes: self.notes.clone(),
            quadrant: self.quadrant,
            due_date: self.due_date,
            completed: self.completed,
        }
    }
}

/// Write model for create and full-update use-cases.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskInput {
    pub title: String,
    pub notes: Option<String>,
    pub quadrant: Quadrant,
    pub due_date: Option<DateTime<Utc>>,
    /// Ignored by create; new tasks always start incomplete.
    pub completed: bool,
}

impl TaskInput {
    /// Creates an input with the given title and default fields.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_quadrant(mut self, quadrant: Quadrant) -> Self {
        self.quadrant = quadrant;
        self
    }

    /// Sets the due date at store precision (whole milliseconds).
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(to_store_precision(due_date));
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Validates user-editable fields.
    ///
    /// # Errors
    /// - `TitleRequired` when the title is blank after trim.
    /// - `TitleTooLong` / `NotesTooLong` when length bounds are exceeded.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_fields(&self.title, self.notes.as_deref())
    }
}

/// Shared title/notes rules for every task write path.
pub fn validate_fields(title: &str, notes: Option<&str>) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::TitleRequired);
    }

    let title_chars = title.chars().count();
    if title_chars > TITLE_MAX_CHARS {
        return Err(TaskValidationError::TitleTooLong {
            max: TITLE_MAX_CHARS,
            actual: title_chars,
        });
    }

    if let Some(notes) = notes {
        let notes_chars = notes.chars().count();
        if notes_chars > NOTES_MAX_CHARS {
            return Err(TaskValidationError::NotesTooLong {
                max: NOTES_MAX_CHARS,
                actual: notes_chars,
            });
        }
    }

    Ok(())
}

/// Field-attributed rejection of task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    TitleRequired,
    TitleTooLong { max: usize, actual: usize },
    NotesTooLong { max: usize, actual: usize },
    QuadrantOutOfRange(i64),
    UnknownQuadrant(String),
}

impl TaskValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::TitleRequired | Self::TitleTooLong { .. } => "title",
            Self::NotesTooLong { .. } => "notes",
            Self::QuadrantOutOfRange(_) | Self::UnknownQuadrant(_) => "quadrant",
        }
    }
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleRequired => write!(f, "title is required"),
            Self::TitleTooLong { max, actual } => {
                write!(f, "title cannot exceed {max} characters (got {actual})")
            }
            Self::NotesTooLong { max, actual } => {
                write!(f, "notes cannot exceed {max} characters (got {actual})")
            }
            Self::QuadrantOutOfRange(value) => {
                write!(f, "quadrant must be between 0 and 3 (got {value})")
            }
            Self::UnknownQuadrant(value) => write!(f, "unknown quadrant `{value}`"),
        }
    }
}

impl Error for TaskValidationError {}

#[cfg(test)]
mod tests {
    use super::{
        to_store_precision, Quadrant, TaskInput, TaskValidationError, NOTES_MAX_CHARS,
        TITLE_MAX_CHARS,
    };
    use chrono::{TimeZone, Timelike, Utc};

    #[test]
    fn blank_title_is_rejected_on_title_field() {
        let err = TaskInput::new("   ").validate().unwrap_err();
        assert_eq!(err, TaskValidationError::TitleRequired);
        assert_eq!(err.field(), "title");
    }

    #[test]
    fn length_bounds_count_chars_not_bytes() {
        let title = "é".repeat(TITLE_MAX_CHARS);
        assert!(TaskInput::new(title).validate().is_ok());

        let too_long = "x".repeat(TITLE_MAX_CHARS + 1);
        let err = TaskInput::new(too_long).validate().unwrap_err();
        assert!(matches!(err, TaskValidationError::TitleTooLong { actual: 201, .. }));

        let notes = "n".repeat(NOTES_MAX_CHARS + 1);
        let err = TaskInput::new("ok").with_notes(notes).validate().unwrap_err();
        assert_eq!(err.field(), "notes");
    }

    #[test]
    fn quadrant_parses_ordinals_and_labels() {
        assert_eq!(Quadrant::parse("0").unwrap(), Quadrant::UrgentImportant);
        assert_eq!(
            Quadrant::parse("Not_Urgent_Important").unwrap(),
            Quadrant::NotUrgentImportant
        );
        assert_eq!(
            Quadrant::parse("4").unwrap_err(),
            TaskValidationError::QuadrantOutOfRange(4)
        );
        assert_eq!(Quadrant::parse("later").unwrap_err().field(), "quadrant");
    }

    #[test]
    fn ordinals_are_stable() {
        let ordinals: Vec<u8> = Quadrant::ALL.iter().map(|q| q.ordinal()).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
        for quadrant in Quadrant::ALL {
            assert_eq!(
                Quadrant::from_ordinal(i64::from(quadrant.ordinal())).unwrap(),
                quadrant
            );
        }
    }

    #[test]
    fn due_dates_are_kept_at_millisecond_precision() {
        let due = Utc.timestamp_opt(1_704_412_800, 123_456_789).unwrap();

        let input = TaskInput::new("x").with_due_date(due);
        let stored = input.due_date.unwrap();
        assert_eq!(stored.nanosecond(), 123_000_000);
        assert_eq!(stored, to_store_precision(due));
        assert_eq!(to_store_precision(stored), stored);
    }
}
