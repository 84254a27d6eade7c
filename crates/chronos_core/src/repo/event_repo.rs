//! Event repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `start_date ASC` with undated events last, then
//!   `created_at ASC, uuid ASC`.
//! - Deletion is permanent.

use crate::model::event::Event;
use crate::model::record::{OwnerId, RecordId};
use crate::repo::schema::{ensure_table_ready, EVENT_COLUMNS};
use crate::repo::{bool_to_int, parse_flag, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    start_date,
    end_date,
    is_all_day,
    created_at,
    note
FROM events";

/// Repository interface for event CRUD operations.
pub trait EventRepository {
    fn create_event(&self, owner: &OwnerId, event: &Event) -> RepoResult<RecordId>;
    fn update_event(&self, owner: &OwnerId, event: &Event) -> RepoResult<()>;
    fn get_event(&self, owner: &OwnerId, id: RecordId) -> RepoResult<Option<Event>>;
    fn list_events(&self, owner: &OwnerId) -> RepoResult<Vec<Event>>;
    fn delete_event(&self, owner: &OwnerId, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "events", EVENT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, owner: &OwnerId, event: &Event) -> RepoResult<RecordId> {
        event.validate()?;

        self.conn.execute(
            "INSERT INTO events (
                uuid,
                owner_id,
                title,
                start_date,
                end_date,
                is_all_day,
                created_at,
                note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                event.id.to_string(),
                owner.as_str(),
                event.title.as_str(),
                event.start_date,
                event.end_date,
                bool_to_int(event.is_all_day),
                event.created_at,
                event.note.as_deref(),
            ],
        )?;

        Ok(event.id)
    }

    fn update_event(&self, owner: &OwnerId, event: &Event) -> RepoResult<()> {
        event.validate()?;

        let changed = self.conn.execute(
            "UPDATE events
             SET
                title = ?1,
                start_date = ?2,
                end_date = ?3,
                is_all_day = ?4,
                note = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6 AND owner_id = ?7;",
            params![
                event.title.as_str(),
                event.start_date,
                event.end_date,
                bool_to_int(event.is_all_day),
                event.note.as_deref(),
                event.id.to_string(),
                owner.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(event.id));
        }

        Ok(())
    }

    fn get_event(&self, owner: &OwnerId, id: RecordId) -> RepoResult<Option<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE uuid = ?1 AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), owner.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }

        Ok(None)
    }

    fn list_events(&self, owner: &OwnerId) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY start_date IS NULL, start_date ASC, created_at ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([owner.as_str()])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        Ok(events)
    }

    fn delete_event(&self, owner: &OwnerId, id: RecordId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM events WHERE uuid = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let uuid_text: String = row.get("uuid")?;
    let event = Event {
        id: parse_uuid(&uuid_text, "events.uuid")?,
        title: row.get("title")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        is_all_day: parse_flag(row.get("is_all_day")?, "events.is_all_day")?,
        created_at: row.get("created_at")?,
        note: row.get("note")?,
    };
    event.validate()?;
    Ok(event)
}
