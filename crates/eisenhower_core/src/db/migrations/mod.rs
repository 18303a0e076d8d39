//! Ordered schema steps for the tasks/settings store.
//!
//! Version 1 creates both tables with their length and range checks and
//! seeds the three default settings. The applied step number lives in
//! `PRAGMA user_version`; all pending steps run in one transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Highest schema version this build can create.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Brings the store up to `latest_version()`.
///
/// # Errors
/// `UnsupportedSchemaVersion` when the file is ahead of this build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending = STEPS
        .iter()
        .filter(|step| step.version > from_version)
        .collect::<Vec<_>>();
    let Some(target) = pending.last().map(|step| step.version) else {
        return Ok(());
    };

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
    }
    tx.pragma_update(None, "user_version", target)?;
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        from_version,
        target,
        pending.len()
    );
    Ok(())
}
