//! Connection readiness checks shared by repository constructors.

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::{RepoError, RepoResult};
use rusqlite::Connection;

pub(crate) const TASK_COLUMNS: &[&str] = &[
    "uuid",
    "owner_id",
    "title",
    "date",
    "created_at",
    "is_completed",
    "note",
    "attachment_url",
];

pub(crate) const EVENT_COLUMNS: &[&str] = &[
    "uuid",
    "owner_id",
    "title",
    "start_date",
    "end_date",
    "is_all_day",
    "created_at",
    "note",
];

pub(crate) const USER_COLUMNS: &[&str] = &["owner_id", "name", "last_name", "email", "created_at"];

/// Rejects connections that were not opened through `open_db*`.
pub(crate) fn ensure_table_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in columns {
        if !present.iter().any(|name| name.as_str() == column) {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}
