//! Rotation store bootstrap.
//!
//! Opening a store yields a connection whose schema already holds the
//! `families`, `members`, `tasks` and `task_assignments` tables. Repositories
//! in `crate::repo` re-check that state in `try_new` and never migrate.
//!
//! # Invariants
//! - The schema revision lives in `PRAGMA user_version`.
//! - A store written by a newer build is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Rotation store failures below the repository layer.
#[derive(Debug)]
pub enum DbError {
    /// Any SQLite call outside a schema script, including repository queries.
    Sqlite(rusqlite::Error),
    /// A schema script failed; the store keeps its previous revision.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "rotation store query failed: {err}"),
            Self::Migration { version, source } => {
                write!(f, "rotation schema revision {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "rotation store is at schema revision {db_version}; this build reads up to {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Migration { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
