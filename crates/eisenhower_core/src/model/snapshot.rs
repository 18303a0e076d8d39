//! Versioned export/import document.
//!
//! # Responsibility
//! - Define the JSON transfer shape for tasks and settings.
//! - Parse older documents leniently (PascalCase names, naive timestamps).
//!
//! # Invariants
//! - Field names and the integer quadrant encoding are load-bearing for
//!   round-trips with earlier exports.
//! - Snapshot tasks carry no identity; imports always create new rows.

use crate::model::task::{to_store_precision, Quadrant};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version tag written by this build.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Full export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    #[serde(alias = "Version")]
    pub version: String,
    #[serde(alias = "ExportedAt", with = "timestamp")]
    pub exported_at: DateTime<Utc>,
    #[serde(alias = "Tasks")]
    pub tasks: Vec<SnapshotTask>,
    #[serde(alias = "Settings", default)]
    pub settings: BTreeMap<String, String>,
}

/// Task entry inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotTask {
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Notes", default)]
    pub notes: Option<String>,
    #[serde(alias = "Quadrant", with = "quadrant_ordinal")]
    pub quadrant: Quadrant,
    #[serde(alias = "DueDate", default, with = "optional_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(alias = "IsCompleted")]
    pub is_completed: bool,
    #[serde(alias = "CreatedAt", with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ExportSnapshot {
    /// Parses a snapshot document.
    ///
    /// # Errors
    /// Returns the JSON error for malformed, missing, or mistyped fields.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serializes this snapshot as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Suggested download name, e.g. `eisenhower_backup_20240105_093000.json`.
pub fn default_export_file_name(now: DateTime<Local>) -> String {
    format!("eisenhower_backup_{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// Parses RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (as UTC) or `YYYY-MM-DD`.
///
/// Results are truncated to whole milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_exact(raw).map(to_store_precision)
}

fn parse_timestamp_exact(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
}

mod timestamp {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }
}

mod optional_timestamp {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&format_timestamp(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
            None => Ok(None),
        }
    }
}

mod quadrant_ordinal {
    use crate::model::task::Quadrant;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Quadrant, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(value.ordinal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Quadrant, D::Error> {
        let ordinal = i64::deserialize(deserializer)?;
        Quadrant::from_ordinal(ordinal).map_err(D::Error::custom)
    }
}
