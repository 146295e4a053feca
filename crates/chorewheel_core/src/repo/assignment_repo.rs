//! Assignment history store contract and SQLite implementation.
//!
//! # Responsibility
//! - Answer "latest assignment for a task" for the rotation engine.
//! - Append new assignments produced by a rotation run.
//!
//! # Invariants
//! - History is append-only; `set_status` is the only mutation.
//! - `(task_uuid, scheduled_date)` is unique; a second insert for the same
//!   day fails with `RepoError::Duplicate`.
//! - Latest means `scheduled_date DESC, created_at DESC, rowid DESC`.

use crate::model::assignment::{Assignment, AssignmentId, AssignmentStatus, NewAssignment};
use crate::model::task::TaskId;
use crate::repo::codec::{bool_to_int, date_to_db, parse_bool, parse_date, parse_uuid};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::schema::ensure_table_ready;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const ASSIGNMENT_SELECT_SQL: &str = "SELECT
    assignment_uuid,
    task_uuid,
    member_uuid,
    scheduled_date,
    status,
    is_rollover,
    created_at
FROM task_assignments";

/// Append-only store of task assignments.
pub trait AssignmentHistoryStore {
    /// Returns the most recent assignment of `task_uuid`, if any.
    fn latest_assignment(&self, task_uuid: TaskId) -> RepoResult<Option<Assignment>>;
    /// Appends one `pending` assignment and returns the stored record.
    fn create_assignment(&self, new_assignment: &NewAssignment) -> RepoResult<Assignment>;
}

/// SQLite-backed assignment history repository.
pub struct SqliteAssignmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssignmentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "task_assignments",
            &[
                "assignment_uuid",
                "task_uuid",
                "member_uuid",
                "scheduled_date",
                "status",
                "is_rollover",
                "created_at",
            ],
        )?;
        Ok(Self { conn })
    }

    /// Loads one assignment by id.
    pub fn get_assignment(&self, assignment_uuid: AssignmentId) -> RepoResult<Option<Assignment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ASSIGNMENT_SELECT_SQL} WHERE assignment_uuid = ?1;"))?;
        let mut rows = stmt.query([assignment_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_assignment_row(row)?));
        }
        Ok(None)
    }

    /// Lists the full history of one task, oldest first.
    pub fn list_assignments(&self, task_uuid: TaskId) -> RepoResult<Vec<Assignment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSIGNMENT_SELECT_SQL}
             WHERE task_uuid = ?1
             ORDER BY scheduled_date ASC, created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([task_uuid.to_string()])?;
        let mut assignments = Vec::new();
        while let Some(row) = rows.next()? {
            assignments.push(parse_assignment_row(row)?);
        }
        Ok(assignments)
    }

    /// Records a completion-state change made outside the rotation engine.
    pub fn set_status(
        &self,
        assignment_uuid: AssignmentId,
        status: AssignmentStatus,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE task_assignments SET status = ?1 WHERE assignment_uuid = ?2;",
            params![status.as_str(), assignment_uuid.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "assignment",
                id: assignment_uuid,
            });
        }
        Ok(())
    }
}

impl AssignmentHistoryStore for SqliteAssignmentRepository<'_> {
    fn latest_assignment(&self, task_uuid: TaskId) -> RepoResult<Option<Assignment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSIGNMENT_SELECT_SQL}
             WHERE task_uuid = ?1
             ORDER BY scheduled_date DESC, created_at DESC, rowid DESC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([task_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_assignment_row(row)?));
        }
        Ok(None)
    }

    fn create_assignment(&self, new_assignment: &NewAssignment) -> RepoResult<Assignment> {
        let assignment_uuid = Uuid::new_v4();
        let inserted = self.conn.execute(
            "INSERT INTO task_assignments (
                assignment_uuid,
                task_uuid,
                member_uuid,
                scheduled_date,
                status,
                is_rollover
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                assignment_uuid.to_string(),
                new_assignment.task_uuid.to_string(),
                new_assignment.member_uuid.to_string(),
                date_to_db(new_assignment.scheduled_date),
                AssignmentStatus::Pending.as_str(),
                bool_to_int(new_assignment.is_rollover),
            ],
        );

        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(RepoError::Duplicate(format!(
                    "task {} already has an assignment on {}",
                    new_assignment.task_uuid, new_assignment.scheduled_date
                )));
            }
            return Err(err.into());
        }

        self.get_assignment(assignment_uuid)?
            .ok_or(RepoError::NotFound {
                entity: "assignment",
                id: assignment_uuid,
            })
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn parse_assignment_row(row: &Row<'_>) -> RepoResult<Assignment> {
    let id_text: String = row.get("assignment_uuid")?;
    let task_text: String = row.get("task_uuid")?;
    let member_text: String = row.get("member_uuid")?;
    let date_text: String = row.get("scheduled_date")?;
    let status_text: String = row.get("status")?;

    let status = AssignmentStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in task_assignments.status"
        ))
    })?;

    Ok(Assignment {
        assignment_uuid: parse_uuid(&id_text, "task_assignments.assignment_uuid")?,
        task_uuid: parse_uuid(&task_text, "task_assignments.task_uuid")?,
        member_uuid: parse_uuid(&member_text, "task_assignments.member_uuid")?,
        scheduled_date: parse_date(&date_text, "task_assignments.scheduled_date")?,
        status,
        is_rollover: parse_bool(row.get("is_rollover")?, "task_assignments.is_rollover")?,
        created_at: row.get("created_at")?,
    })
}
