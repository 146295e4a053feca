//! Rotation schema revisions.
//!
//! Each revision is a SQL script applied in one transaction together with
//! every other pending revision, so a failed open leaves the store at its
//! previous `user_version`.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, Transaction};

/// (revision, script) in strictly increasing revision order.
const SCHEMA_REVISIONS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Newest schema revision this build can read and write.
pub fn latest_version() -> u32 {
    SCHEMA_REVISIONS.last().map_or(0, |(version, _)| *version)
}

/// Brings the store up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store is ahead of this build.
/// - `Migration` naming the first revision whose script failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }
    if from_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for &(version, script) in SCHEMA_REVISIONS
        .iter()
        .filter(|(version, _)| *version > from_version)
    {
        apply_revision(&tx, version, script).map_err(|source| {
            error!(
                "event=db_migrate module=db status=error from_version={from_version} failed_version={version} error={source}"
            );
            DbError::Migration { version, source }
        })?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={latest}");
    Ok(())
}

fn apply_revision(tx: &Transaction<'_>, version: u32, script: &str) -> rusqlite::Result<()> {
    tx.execute_batch(script)?;
    tx.pragma_update(None, "user_version", version)
}

/// Schema revision currently recorded in the store.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
