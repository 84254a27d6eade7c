//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD APIs over the `tasks` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Listing order is `date ASC` with undated tasks last, then
//!   `created_at ASC, uuid ASC`.
//! - Deletion is permanent.

use crate::model::record::{OwnerId, RecordId};
use crate::model::task::Task;
use crate::repo::schema::{ensure_table_ready, TASK_COLUMNS};
use crate::repo::{bool_to_int, parse_flag, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    date,
    created_at,
    is_completed,
    note,
    attachment_url
FROM tasks";

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    fn create_task(&self, owner: &OwnerId, task: &Task) -> RepoResult<RecordId>;
    fn update_task(&self, owner: &OwnerId, task: &Task) -> RepoResult<()>;
    fn get_task(&self, owner: &OwnerId, id: RecordId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, owner: &OwnerId) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, owner: &OwnerId, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Fails when the connection schema is not at the latest version or the
    /// `tasks` table is incomplete.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "tasks", TASK_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, owner: &OwnerId, task: &Task) -> RepoResult<RecordId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                owner_id,
                title,
                date,
                created_at,
                is_completed,
                note,
                attachment_url
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                task.id.to_string(),
                owner.as_str(),
                task.title.as_str(),
                task.date,
                task.created_at,
                bool_to_int(task.is_completed),
                task.note.as_deref(),
                task.attachment_url.as_deref(),
            ],
        )?;

        Ok(task.id)
    }

    fn update_task(&self, owner: &OwnerId, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                date = ?2,
                is_completed = ?3,
                note = ?4,
                attachment_url = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6 AND owner_id = ?7;",
            params![
                task.title.as_str(),
                task.date,
                bool_to_int(task.is_completed),
                task.note.as_deref(),
                task.attachment_url.as_deref(),
                task.id.to_string(),
                owner.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }

        Ok(())
    }

    fn get_task(&self, owner: &OwnerId, id: RecordId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE uuid = ?1 AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), owner.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, owner: &OwnerId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY date IS NULL, date ASC, created_at ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([owner.as_str()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn delete_task(&self, owner: &OwnerId, id: RecordId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE uuid = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let task = Task {
        id: parse_uuid(&uuid_text, "tasks.uuid")?,
        title: row.get("title")?,
        date: row.get("date")?,
        created_at: row.get("created_at")?,
        is_completed: parse_flag(row.get("is_completed")?, "tasks.is_completed")?,
        note: row.get("note")?,
        attachment_url: row.get("attachment_url")?,
    };
    task.validate()?;
    Ok(task)
}
