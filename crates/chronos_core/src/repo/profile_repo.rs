//! User profile repository.

use crate::model::profile::UserProfile;
use crate::model::record::OwnerId;
use crate::repo::schema::{ensure_table_ready, USER_COLUMNS};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait ProfileRepository {
    /// Inserts or replaces the profile for `profile.id`.
    fn upsert_profile(&self, profile: &UserProfile) -> RepoResult<()>;
    fn get_profile(&self, owner: &OwnerId) -> RepoResult<Option<UserProfile>>;
}

pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "users", USER_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn upsert_profile(&self, profile: &UserProfile) -> RepoResult<()> {
        profile.validate()?;

        self.conn.execute(
            "INSERT INTO users (owner_id, name, last_name, email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(owner_id) DO UPDATE SET
                name = excluded.name,
                last_name = excluded.last_name,
                email = excluded.email;",
            params![
                profile.id.as_str(),
                profile.name.as_str(),
                profile.last_name.as_str(),
                profile.email.as_str(),
                profile.created_at,
            ],
        )?;

        Ok(())
    }

    fn get_profile(&self, owner: &OwnerId) -> RepoResult<Option<UserProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT owner_id, name, last_name, email, created_at
                 FROM users
                 WHERE owner_id = ?1;",
                [owner.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>("owner_id")?,
                        row.get::<_, String>("name")?,
                        row.get::<_, String>("last_name")?,
                        row.get::<_, String>("email")?,
                        row.get::<_, i64>("created_at")?,
                    ))
                },
            )
            .optional()?;

        let Some((owner_id, name, last_name, email, created_at)) = row else {
            return Ok(None);
        };
        let id = OwnerId::parse(owner_id.as_str()).map_err(|_| {
            RepoError::InvalidData(format!("invalid owner id `{owner_id}` in users.owner_id"))
        })?;

        Ok(Some(UserProfile {
            id,
            name,
            last_name,
            email,
            created_at,
        }))
    }
}
