//! Ordered schema steps for the LifeAlign database.
//!
//! # Responsibility
//! - List the schema steps behind the task store and the reminder outbox.
//! - Bring an older file up to date in one transaction.
//!
//! # Invariants
//! - Step versions start at 1 and grow by one.
//! - `PRAGMA user_version` equals the last step applied.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    file: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        file: "0001_kv_entries.sql",
        sql: include_str!("0001_kv_entries.sql"),
    },
    SchemaStep {
        version: 2,
        file: "0002_reminder_outbox.sql",
        sql: include_str!("0002_reminder_outbox.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Runs every step newer than the file's `user_version`.
///
/// # Contract
/// - A file already at `latest_version()` is left untouched.
/// - A newer file fails with `UnsupportedSchemaVersion`.
/// - A failing step rolls the whole run back and names the step.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = stored_version(conn)?;
    let latest = latest_version();
    if found > latest {
        error!(
            "event=schema_upgrade module=db status=error found={found} supported={latest}"
        );
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }
    if found == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS.iter().filter(|step| step.version > found) {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| {
                error!(
                    "event=schema_step module=db status=error version={} file={}",
                    step.version, step.file
                );
                DbError::SchemaStep {
                    version: step.version,
                    file: step.file,
                    source,
                }
            })?;
        info!(
            "event=schema_step module=db status=ok version={} file={}",
            step.version, step.file
        );
    }
    tx.commit()?;

    info!("event=schema_upgrade module=db status=ok from={found} to={latest}");
    Ok(())
}

fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}
