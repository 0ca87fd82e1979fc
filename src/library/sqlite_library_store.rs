use crate::library::filter::{compose_sql, Predicate};
use crate::library::models::{LibraryEntry, LibraryEntryStatus, Page, PageRequest};
use crate::library::{LibraryEntryStore, LibraryError};
use crate::media::{MediaKind, MediaRef};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned, ForeignKey, OnDelete, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use crate::user::{AuthToken, AuthTokenValue, UserAuthTokenStore, UserStore};
use anyhow::{Context, Result};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("handle", SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_user_handle", "handle")],
};
const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: OnDelete::Cascade,
            })
        ),
        sqlite_column!("value", SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[("idx_auth_token_value", "value")],
};
const LIBRARY_ENTRY_TABLE_V_0: Table = Table {
    name: "library_entry",
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: OnDelete::Cascade,
            })
        ),
        sqlite_column!("media_type", SqlType::Text, non_null = true),
        sqlite_column!("media_id", SqlType::Integer, non_null = true),
        sqlite_column!("status", SqlType::Integer, non_null = true),
        sqlite_column!(
            "progress",
            SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "private",
            SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("notes", SqlType::Text),
        sqlite_column!("rating", SqlType::Integer),
        sqlite_column!("created", SqlType::Integer, non_null = true),
        sqlite_column!("updated", SqlType::Integer, non_null = true),
    ],
    unique_constraints: &[&["user_id", "media_type", "media_id"]],
    indices: &[
        ("idx_library_entry_user", "user_id"),
        ("idx_library_entry_media", "media_type, media_id"),
    ],
};

/// V 1
const LIBRARY_ENTRY_TABLE_V_1: Table = Table {
    name: "library_entry",
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: OnDelete::Cascade,
            })
        ),
        sqlite_column!("media_type", SqlType::Text, non_null = true),
        sqlite_column!("media_id", SqlType::Integer, non_null = true),
        sqlite_column!("status", SqlType::Integer, non_null = true),
        sqlite_column!(
            "progress",
            SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "private",
            SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("notes", SqlType::Text),
        sqlite_column!("rating", SqlType::Integer),
        sqlite_column!("created", SqlType::Integer, non_null = true),
        sqlite_column!("updated", SqlType::Integer, non_null = true),
        sqlite_column!(
            "reconsuming",
            SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "reconsume_count",
            SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("started_at", SqlType::Integer),
        sqlite_column!("finished_at", SqlType::Integer),
        sqlite_column!("progressed_at", SqlType::Integer),
    ],
    unique_constraints: &[&["user_id", "media_type", "media_id"]],
    indices: &[
        ("idx_library_entry_user", "user_id"),
        ("idx_library_entry_media", "media_type, media_id"),
    ],
};

fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "ALTER TABLE library_entry ADD COLUMN reconsuming INTEGER NOT NULL DEFAULT 0;
         ALTER TABLE library_entry ADD COLUMN reconsume_count INTEGER NOT NULL DEFAULT 0;
         ALTER TABLE library_entry ADD COLUMN started_at INTEGER;
         ALTER TABLE library_entry ADD COLUMN finished_at INTEGER;
         ALTER TABLE library_entry ADD COLUMN progressed_at INTEGER;",
    )?;
    Ok(())
}

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[USER_TABLE_V_0, AUTH_TOKEN_TABLE_V_0, LIBRARY_ENTRY_TABLE_V_0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[USER_TABLE_V_0, AUTH_TOKEN_TABLE_V_0, LIBRARY_ENTRY_TABLE_V_1],
        migration: Some(migrate_v0_to_v1),
    },
];

const ENTRY_COLUMNS: &str = "id, user_id, media_type, media_id, status, progress, private, \
    notes, rating, reconsuming, reconsume_count, started_at, finished_at, progressed_at, \
    created, updated";

fn entry_from_row(row: &Row) -> rusqlite::Result<LibraryEntry> {
    let media_type: String = row.get(2)?;
    let kind = MediaKind::from_name(&media_type).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(2, "media_type".to_string(), Type::Text)
    })?;
    let status = LibraryEntryStatus::from_int(row.get(4)?).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(4, "status".to_string(), Type::Integer)
    })?;
    Ok(LibraryEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        media: MediaRef::new(kind, row.get(3)?),
        status,
        progress: row.get(5)?,
        private: row.get(6)?,
        notes: row.get(7)?,
        rating: row.get(8)?,
        reconsuming: row.get(9)?,
        reconsume_count: row.get(10)?,
        started_at: row.get(11)?,
        finished_at: row.get(12)?,
        progressed_at: row.get(13)?,
        created: row.get(14)?,
        updated: row.get(15)?,
    })
}

fn token_from_row(row: &Row) -> rusqlite::Result<AuthToken> {
    Ok(AuthToken {
        user_id: row.get(0)?,
        value: AuthTokenValue(row.get(1)?),
        created: row.get(2)?,
        last_used: row.get(3)?,
    })
}

/// SQLite rowids are signed 64 bit, larger ids can't name any row.
fn row_id(id: usize) -> Option<i64> {
    i64::try_from(id).ok()
}

/// Turns sqlite constraint failures on insert into the matching domain error.
fn map_insert_error(err: rusqlite::Error, entry: &LibraryEntry) -> anyhow::Error {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        match failure.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => {
                return LibraryError::AlreadyTracked {
                    user_id: entry.user_id,
                    media: entry.media,
                }
                .into()
            }
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return LibraryError::UnknownUser(entry.user_id).into()
            }
            _ => {}
        }
    }
    anyhow::Error::new(err).context("Failed to insert library entry")
}

pub struct SqliteLibraryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLibraryStore {
    /// Opens the database at `db_path`, creating it with the latest schema if missing.
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = if db_path.exists() {
            Connection::open(db_path)
                .with_context(|| format!("Failed to open db {:?}", db_path))?
        } else {
            info!("Creating new library db at {:?}", db_path);
            let conn = Connection::open(db_path)
                .with_context(|| format!("Failed to create db {:?}", db_path))?;
            VERSIONED_SCHEMAS
                .last()
                .context("No schema defined")?
                .create(&conn)?;
            conn
        };

        let version = open_versioned(&conn, VERSIONED_SCHEMAS)?;
        debug!("Library db {:?} at version {}", db_path, version);

        Ok(SqliteLibraryStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl LibraryEntryStore for SqliteLibraryStore {
    fn insert_library_entry(&self, entry: &LibraryEntry) -> Result<LibraryEntry> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO library_entry (user_id, media_type, media_id, status, progress, private, \
             notes, rating, reconsuming, reconsume_count, started_at, finished_at, progressed_at, \
             created, updated) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                entry.user_id,
                entry.media.kind.name(),
                entry.media.id,
                entry.status.to_int(),
                entry.progress,
                entry.private,
                entry.notes,
                entry.rating,
                entry.reconsuming,
                entry.reconsume_count,
                entry.started_at,
                entry.finished_at,
                entry.progressed_at,
                entry.created,
                entry.updated,
            ],
        )
        .map_err(|err| map_insert_error(err, entry))?;

        Ok(LibraryEntry {
            id: conn.last_insert_rowid() as usize,
            ..entry.clone()
        })
    }

    fn get_library_entry(&self, id: usize) -> Result<Option<LibraryEntry>> {
        let Some(row_id) = row_id(id) else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        let entry = conn
            .query_row(
                &format!("SELECT {} FROM library_entry WHERE id = ?1", ENTRY_COLUMNS),
                params![row_id],
                entry_from_row,
            )
            .optional()
            .with_context(|| format!("Failed to read library entry {}", id))?;
        Ok(entry)
    }

    fn list_library_entries(
        &self,
        predicates: &[Predicate],
        page: PageRequest,
    ) -> Result<Page<LibraryEntry>> {
        let (condition, mut values) = compose_sql(predicates);
        let conn = self.conn.lock().unwrap();

        let total_count: usize = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM library_entry WHERE {}", condition),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )
            .context("Failed to count library entries")?;

        values.push(Value::Integer(page.limit.min(i64::MAX as usize) as i64));
        values.push(Value::Integer(page.offset.min(i64::MAX as usize) as i64));
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM library_entry WHERE {} ORDER BY id ASC LIMIT ? OFFSET ?",
            ENTRY_COLUMNS, condition
        ))?;
        let items = stmt
            .query_map(params_from_iter(values.iter()), entry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read library entries")?;

        Ok(Page { items, total_count })
    }

    fn save_library_entry(&self, entry: &LibraryEntry) -> Result<bool> {
        let Some(row_id) = row_id(entry.id) else {
            return Ok(false);
        };
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE library_entry SET status = ?1, progress = ?2, private = ?3, notes = ?4, \
                 rating = ?5, reconsuming = ?6, reconsume_count = ?7, started_at = ?8, \
                 finished_at = ?9, progressed_at = ?10, updated = ?11 WHERE id = ?12",
                params![
                    entry.status.to_int(),
                    entry.progress,
                    entry.private,
                    entry.notes,
                    entry.rating,
                    entry.reconsuming,
                    entry.reconsume_count,
                    entry.started_at,
                    entry.finished_at,
                    entry.progressed_at,
                    entry.updated,
                    row_id,
                ],
            )
            .with_context(|| format!("Failed to update library entry {}", entry.id))?;
        Ok(updated > 0)
    }

    fn delete_library_entry(&self, id: usize) -> Result<bool> {
        let Some(row_id) = row_id(id) else {
            return Ok(false);
        };
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM library_entry WHERE id = ?1", params![row_id])
            .with_context(|| format!("Failed to delete library entry {}", id))?;
        Ok(deleted > 0)
    }
}

impl UserStore for SqliteLibraryStore {
    fn create_user(&self, user_handle: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user (handle) VALUES (?1)",
            params![user_handle],
        )
        .with_context(|| format!("Failed to create user {}", user_handle))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user_handle(&self, user_id: usize) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let handle = conn
            .query_row(
                "SELECT handle FROM user WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(handle)
    }

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let id = conn
            .query_row(
                "SELECT id FROM user WHERE handle = ?1",
                params![user_handle],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn get_all_user_handles(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT handle FROM user ORDER BY id")?;
        let handles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(handles)
    }

    fn delete_user(&self, user_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM user WHERE id = ?1", params![user_id])
            .with_context(|| format!("Failed to delete user {}", user_id))?;
        Ok(deleted > 0)
    }
}

impl UserAuthTokenStore for SqliteLibraryStore {
    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let token = conn
            .query_row(
                "SELECT user_id, value, created, last_used FROM auth_token WHERE value = ?1",
                params![token.0],
                token_from_row,
            )
            .optional()?;
        Ok(token)
    }

    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let Some(existing) = self.get_user_auth_token(token)? else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM auth_token WHERE value = ?1", params![token.0])?;
        Ok(Some(existing))
    }

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE auth_token SET last_used = {} WHERE value = ?1",
                DEFAULT_TIMESTAMP
            ),
            params![token.0],
        )?;
        Ok(())
    }

    fn add_user_auth_token(&self, token: AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO auth_token (user_id, value, created, last_used) VALUES (?1, ?2, ?3, ?4)",
            params![token.user_id, token.value.0, token.created, token.last_used],
        )
        .with_context(|| format!("Failed to add token for user {}", token.user_id))?;
        Ok(())
    }

    fn get_all_user_auth_tokens(&self, user_id: usize) -> Result<Vec<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT user_id, value, created, last_used FROM auth_token WHERE user_id = ?1",
        )?;
        let tokens = stmt
            .query_map(params![user_id], token_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::filter::{resolve, LibraryEntryFilter, Requester};
    use crate::library::models::NewLibraryEntry;
    use crate::sqlite_persistence::read_db_version;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn create_tmp_store() -> (SqliteLibraryStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let temp_file_path = temp_dir.path().join("test.db");
        let store = SqliteLibraryStore::new(&temp_file_path).unwrap();
        (store, temp_dir)
    }

    fn insert(
        store: &SqliteLibraryStore,
        user_id: usize,
        media: MediaRef,
        private: bool,
    ) -> LibraryEntry {
        let entry = NewLibraryEntry::new(media, LibraryEntryStatus::Current)
            .private(private)
            .into_entry(user_id, 1_700_000_000)
            .unwrap();
        store.insert_library_entry(&entry).unwrap()
    }

    fn anime(id: usize) -> MediaRef {
        MediaRef::new(MediaKind::Anime, id)
    }

    #[test]
    fn creates_users_and_tokens() {
        let (store, _temp_dir) = create_tmp_store();

        let user_id = store.create_user("test_user").unwrap();
        assert_eq!(user_id, 1);
        assert!(store.create_user("test_user").is_err());
        assert_eq!(store.get_user_id("test_user").unwrap(), Some(1));
        assert_eq!(
            store.get_user_handle(user_id).unwrap(),
            Some("test_user".to_string())
        );
        assert_eq!(store.get_user_handle(99).unwrap(), None);

        let value = AuthTokenValue::generate();
        store
            .add_user_auth_token(AuthToken {
                user_id,
                value: value.clone(),
                created: 10,
                last_used: None,
            })
            .unwrap();
        let token = store.get_user_auth_token(&value).unwrap().unwrap();
        assert_eq!(token.user_id, user_id);
        assert_eq!(token.last_used, None);

        store
            .update_user_auth_token_last_used_timestamp(&value)
            .unwrap();
        let token = store.get_user_auth_token(&value).unwrap().unwrap();
        assert!(token.last_used.is_some());

        assert_eq!(store.get_all_user_auth_tokens(user_id).unwrap().len(), 1);
        assert!(store.delete_user_auth_token(&value).unwrap().is_some());
        assert!(store.get_user_auth_token(&value).unwrap().is_none());
        assert!(store.delete_user_auth_token(&value).unwrap().is_none());
    }

    #[test]
    fn inserts_and_reads_back_entries() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store.create_user("test_user").unwrap();

        let mut new_entry = NewLibraryEntry::new(anime(3), LibraryEntryStatus::Completed);
        new_entry.rating = Some(17);
        new_entry.notes = Some("rewatch soon".to_string());
        new_entry.progress = 24;
        let entry = new_entry.into_entry(user_id, 500).unwrap();

        let inserted = store.insert_library_entry(&entry).unwrap();
        assert_eq!(inserted.id, 1);
        let read = store.get_library_entry(inserted.id).unwrap().unwrap();
        assert_eq!(read, inserted);
        assert_eq!(read.finished_at, Some(500));
        assert!(store.get_library_entry(42).unwrap().is_none());
    }

    #[test]
    fn rejects_duplicate_media_for_same_user() {
        let (store, _temp_dir) = create_tmp_store();
        let u = store.create_user("u").unwrap();
        let v = store.create_user("v").unwrap();
        insert(&store, u, anime(1), false);

        let duplicate = NewLibraryEntry::new(anime(1), LibraryEntryStatus::Planned)
            .into_entry(u, 0)
            .unwrap();
        let err = store.insert_library_entry(&duplicate).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LibraryError>(),
            Some(LibraryError::AlreadyTracked { .. })
        ));

        // Same media for another user is fine
        insert(&store, v, anime(1), false);
    }

    #[test]
    fn rejects_entries_of_unknown_users() {
        let (store, _temp_dir) = create_tmp_store();
        let entry = NewLibraryEntry::new(anime(1), LibraryEntryStatus::Planned)
            .into_entry(9, 0)
            .unwrap();
        let err = store.insert_library_entry(&entry).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LibraryError>(),
            Some(LibraryError::UnknownUser(9))
        ));
    }

    #[test]
    fn saves_and_deletes_entries() {
        let (store, _temp_dir) = create_tmp_store();
        let u = store.create_user("u").unwrap();
        let mut entry = insert(&store, u, anime(1), false);

        entry.progress = 5;
        entry.private = true;
        entry.updated = 99;
        assert!(store.save_library_entry(&entry).unwrap());
        assert_eq!(store.get_library_entry(entry.id).unwrap().unwrap(), entry);

        assert!(store.delete_library_entry(entry.id).unwrap());
        assert!(!store.delete_library_entry(entry.id).unwrap());
        assert!(!store.save_library_entry(&entry).unwrap());
    }

    #[test]
    fn ids_beyond_sqlite_range_name_no_entry() {
        let (store, _temp_dir) = create_tmp_store();
        let u = store.create_user("u").unwrap();
        let mut entry = insert(&store, u, anime(1), false);
        let oversized = i64::MAX as usize + 1;

        assert!(store.get_library_entry(oversized).unwrap().is_none());
        assert!(!store.delete_library_entry(oversized).unwrap());
        entry.id = oversized;
        assert!(!store.save_library_entry(&entry).unwrap());
    }

    #[test]
    fn deleting_user_cascades_to_entries_and_tokens() {
        let (store, _temp_dir) = create_tmp_store();
        let u = store.create_user("u").unwrap();
        let entry = insert(&store, u, anime(1), false);
        store
            .add_user_auth_token(AuthToken {
                user_id: u,
                value: AuthTokenValue::generate(),
                created: 0,
                last_used: None,
            })
            .unwrap();

        assert!(store.delete_user(u).unwrap());
        assert!(store.get_library_entry(entry.id).unwrap().is_none());
        assert!(store.get_all_user_auth_tokens(u).unwrap().is_empty());
    }

    #[test]
    fn sql_listing_agrees_with_in_memory_resolution() {
        let (store, _temp_dir) = create_tmp_store();
        let u = store.create_user("u").unwrap();
        let v = store.create_user("v").unwrap();
        let w = store.create_user("w").unwrap();
        let manga7 = MediaRef::new(MediaKind::Manga, 7);
        let entries = vec![
            insert(&store, u, anime(7), false),
            insert(&store, u, anime(8), true),
            insert(&store, v, anime(7), false),
            insert(&store, v, manga7, true),
            insert(&store, w, MediaRef::new(MediaKind::Drama, 9), false),
        ];

        let queries: Vec<Vec<(&str, String)>> = vec![
            vec![],
            vec![("filter[user_id]", u.to_string())],
            vec![("filter[user_id]", v.to_string())],
            vec![("filter[user_id]", "nope".to_string())],
            vec![("filter[user_id]", usize::MAX.to_string())],
            vec![
                ("filter[media_type]", "Anime".to_string()),
                ("filter[media_id]", usize::MAX.to_string()),
            ],
            vec![
                ("filter[media_type]", "Anime".to_string()),
                ("filter[media_id]", "7".to_string()),
            ],
            vec![
                ("filter[media_type]", "Manga".to_string()),
                ("filter[media_id]", "7".to_string()),
            ],
            vec![
                ("filter[user_id]", u.to_string()),
                ("filter[media_type]", "Anime".to_string()),
                ("filter[media_id]", "8".to_string()),
            ],
            vec![("filter[media_type]", "Anime".to_string())],
        ];
        let requesters = [
            Requester::Anonymous,
            Requester::User(u),
            Requester::User(v),
            Requester::User(w),
            Requester::User(usize::MAX),
        ];
        let pages = [
            PageRequest::unbounded(),
            PageRequest {
                limit: 1,
                offset: 1,
            },
        ];

        for query in &queries {
            let params: HashMap<String, String> = query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            let filter = LibraryEntryFilter::from_params(&params);
            for requester in requesters {
                for page in pages {
                    let expected = resolve(&entries, &filter, requester, page);
                    let actual = store
                        .list_library_entries(&filter.predicates(requester), page)
                        .unwrap();
                    assert_eq!(
                        actual, expected,
                        "query {:?} requester {:?} page {:?}",
                        query, requester, page
                    );
                }
            }
        }
    }

    #[test]
    fn migrates_v0_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("old.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            VERSIONED_SCHEMAS[0].create(&conn).unwrap();
            conn.execute("INSERT INTO user (handle) VALUES ('old')", [])
                .unwrap();
            conn.execute(
                "INSERT INTO library_entry \
                 (user_id, media_type, media_id, status, created, updated) \
                 VALUES (1, 'Manga', 4, 2, 10, 10)",
                [],
            )
            .unwrap();
        }

        let store = SqliteLibraryStore::new(&db_path).unwrap();
        let entry = store.get_library_entry(1).unwrap().unwrap();
        assert_eq!(entry.media, MediaRef::new(MediaKind::Manga, 4));
        assert_eq!(entry.status, LibraryEntryStatus::Planned);
        assert!(!entry.reconsuming);
        assert_eq!(entry.started_at, None);
        drop(store);

        let conn = Connection::open(&db_path).unwrap();
        assert_eq!(read_db_version(&conn).unwrap(), 1);
    }
}
