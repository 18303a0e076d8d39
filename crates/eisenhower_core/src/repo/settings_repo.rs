//! Key/value settings repository.
//!
//! # Responsibility
//! - Read and upsert raw string settings.
//!
//! # Invariants
//! - Keys are unique; writes are create-or-update.
//! - Key/value length bounds are checked before SQL mutations.
//! - Values are stored verbatim; typing happens in the service layer.

use super::{ensure_table, RepoResult};
use crate::model::settings::validate_setting;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

/// Repository interface for key/value settings.
pub trait SettingsRepository {
    fn get_setting(&self, key: &str) -> RepoResult<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Upserts every pair in one transaction.
    fn set_settings(&self, values: &BTreeMap<String, String>) -> RepoResult<usize>;
    fn list_settings(&self) -> RepoResult<BTreeMap<String, String>>;
}

/// SQLite-backed settings repository.
#[derive(Clone, Copy)]
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "settings")?;
        Ok(Self { conn })
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn get_setting(&self, key: &str) -> RepoResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM settings WHERE key = ?1;")?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }
        Ok(None)
    }

    fn set_setting(&self, key: &str, value: &str) -> RepoResult<()> {
        upsert(self.conn, key, value)
    }

    fn set_settings(&self, values: &BTreeMap<String, String>) -> RepoResult<usize> {
        for (key, value) in values {
            validate_setting(key, value)?;
        }

        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in values {
            upsert(&tx, key, value)?;
        }
        tx.commit()?;
        Ok(values.len())
    }

    fn list_settings(&self) -> RepoResult<BTreeMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM settings ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut settings = BTreeMap::new();
        while let Some(row) = rows.next()? {
            settings.insert(row.get("key")?, row.get("value")?);
        }
        Ok(settings)
    }
}

fn upsert(conn: &Connection, key: &str, value: &str) -> RepoResult<()> {
    validate_setting(key, value)?;
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
        params![key, value],
    )?;
    Ok(())
}
