//! Task source contract and SQLite task repository.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Rotation-enabled listing is deterministic: `created_at ASC, task_uuid ASC`.

use crate::model::family::FamilyId;
use crate::model::task::{Task, TaskId};
use crate::repo::codec::{bool_to_int, parse_bool, parse_uuid};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::schema::ensure_table_ready;
use rusqlite::{params, Connection, OptionalExtension, Row};

const TASK_SELECT_SQL: &str = "SELECT
    task_uuid,
    family_uuid,
    title,
    description,
    rotation_enabled,
    frequency_days
FROM tasks";

/// Source of tasks eligible for a rotation run.
pub trait TaskSource {
    fn list_rotation_enabled_tasks(&self) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "tasks",
            &[
                "task_uuid",
                "family_uuid",
                "title",
                "description",
                "rotation_enabled",
                "frequency_days",
                "created_at",
            ],
        )?;
        Ok(Self { conn })
    }

    /// Inserts one task owned by an existing family.
    pub fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;
        self.ensure_family_exists(task.family_uuid)?;

        self.conn.execute(
            "INSERT INTO tasks (
                task_uuid,
                family_uuid,
                title,
                description,
                rotation_enabled,
                frequency_days
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                task.task_uuid.to_string(),
                task.family_uuid.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                bool_to_int(task.rotation_enabled),
                i64::from(task.frequency_days),
            ],
        )?;
        Ok(task.task_uuid)
    }

    /// Loads one task by id.
    pub fn get_task(&self, task_uuid: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE task_uuid = ?1;"))?;
        let mut rows = stmt.query([task_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn ensure_family_exists(&self, family_uuid: FamilyId) -> RepoResult<()> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM families WHERE family_uuid = ?1;",
                [family_uuid.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(RepoError::NotFound {
                entity: "family",
                id: family_uuid,
            });
        }
        Ok(())
    }
}

impl TaskSource for SqliteTaskRepository<'_> {
    fn list_rotation_enabled_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE rotation_enabled = 1
             ORDER BY created_at ASC, task_uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("task_uuid")?;
    let family_text: String = row.get("family_uuid")?;
    let frequency: i64 = row.get("frequency_days")?;
    let frequency_days = u32::try_from(frequency).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid frequency_days value `{frequency}` in tasks.frequency_days"
        ))
    })?;

    let task = Task {
        task_uuid: parse_uuid(&id_text, "tasks.task_uuid")?,
        family_uuid: parse_uuid(&family_text, "tasks.family_uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        rotation_enabled: parse_bool(row.get("rotation_enabled")?, "tasks.rotation_enabled")?,
        frequency_days,
    };
    task.validate()?;
    Ok(task)
}
