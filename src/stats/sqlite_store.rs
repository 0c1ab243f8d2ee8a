//! SQLite-backed store

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use super::store::{resolve_range, KeyValueStore, StoreError};

/// Stats database. Strings, lists and sets live in separate tables; list order is
/// insertion id descending, so the newest push is index 0.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_tables()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_tables()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn init_tables(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_strings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv_lists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT NOT NULL,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv_sets (
                key TEXT NOT NULL,
                member TEXT NOT NULL,
                PRIMARY KEY (key, member)
            );

            CREATE INDEX IF NOT EXISTS idx_kv_lists_key ON kv_lists(key, id);
            "#,
        )?;

        Ok(())
    }

    fn list_len(conn: &Connection, key: &str) -> Result<usize, StoreError> {
        let len: i64 = conn.query_row(
            "SELECT COUNT(*) FROM kv_lists WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(len as usize)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_strings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_strings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let current: Option<String> = tx
            .query_row(
                "SELECT value FROM kv_strings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        let next = match current {
            None => 1,
            Some(value) => {
                value
                    .parse::<i64>()
                    .map_err(|_| StoreError::NotAnInteger(key.to_string()))?
                    + 1
            }
        };
        tx.execute(
            "INSERT INTO kv_strings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, next.to_string()],
        )?;
        tx.commit()?;

        Ok(next)
    }

    fn lpush(&self, key: &str, value: &str) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_lists (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Self::list_len(&conn, key)
    }

    fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let len = Self::list_len(&conn, key)?;

        match resolve_range(len, start, stop) {
            Some((first, last)) => {
                conn.execute(
                    "DELETE FROM kv_lists WHERE key = ?1 AND id NOT IN (
                         SELECT id FROM kv_lists WHERE key = ?1
                         ORDER BY id DESC LIMIT ?2 OFFSET ?3
                     )",
                    params![key, (last - first + 1) as i64, first as i64],
                )?;
            }
            None => {
                conn.execute("DELETE FROM kv_lists WHERE key = ?1", params![key])?;
            }
        }
        Ok(())
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        let len = Self::list_len(&conn, key)?;
        let Some((first, last)) = resolve_range(len, start, stop) else {
            return Ok(Vec::new());
        };

        let mut stmt = conn.prepare(
            "SELECT value FROM kv_lists WHERE key = ?1
             ORDER BY id DESC LIMIT ?2 OFFSET ?3",
        )?;
        let values = stmt
            .query_map(
                params![key, (last - first + 1) as i64, first as i64],
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    fn llen(&self, key: &str) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        Self::list_len(&conn, key)
    }

    fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO kv_sets (key, member) VALUES (?1, ?2)",
            params![key, member],
        )?;
        Ok(inserted > 0)
    }

    fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT member FROM kv_sets WHERE key = ?1 ORDER BY member")?;
        let members = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }

    /// Reads every key under a single lock
    fn get_many(&self, keys: &[String]) -> Vec<Result<Option<String>, StoreError>> {
        let conn = match self.lock() {
            Ok(conn) => conn,
            Err(_) => return keys.iter().map(|_| Err(StoreError::LockPoisoned)).collect(),
        };
        let mut stmt = match conn.prepare_cached("SELECT value FROM kv_strings WHERE key = ?1") {
            Ok(stmt) => stmt,
            Err(e) => {
                let message = e.to_string();
                return keys
                    .iter()
                    .map(|_| Err(StoreError::Unavailable(message.clone())))
                    .collect();
            }
        };

        keys.iter()
            .map(|key| {
                stmt.query_row(params![key], |row| row.get(0))
                    .optional()
                    .map_err(StoreError::from)
            })
            .collect()
    }
}
