//! SQLite storage for access keys

use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::access_key::{masked_identity, normalize};
use super::models::AccessKeyRecord;
use super::password::{hash_password, verify_password};
use super::AuthError;

/// Database connection wrapper
#[derive(Clone)]
pub struct AuthDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl AuthDatabase {
    /// Open (or create) the database file and initialize tables
    pub fn new(path: &str) -> Result<Self, AuthError> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_tables()?;
        Ok(db)
    }

    /// Create in-memory database (for testing)
    pub fn in_memory() -> Result<Self, AuthError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_tables()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AuthError> {
        self.conn.lock().map_err(|_| AuthError::LockPoisoned)
    }

    fn init_tables(&self) -> Result<(), AuthError> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS access_keys (
                id TEXT PRIMARY KEY,
                masked TEXT NOT NULL,
                label TEXT,
                key_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                revoked INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_access_keys_masked ON access_keys(masked);
            "#,
        )?;

        Ok(())
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<AccessKeyRecord> {
        Ok(AccessKeyRecord {
            id: row.get(0)?,
            masked: row.get(1)?,
            label: row.get(2)?,
            key_hash: row.get(3)?,
            created_at: row.get(4)?,
            revoked: row.get::<_, i32>(5)? != 0,
        })
    }

    /// Store a new key. Fails if the format is invalid or an active key with the same value exists.
    pub fn add_key(&self, key: &str, label: Option<&str>) -> Result<AccessKeyRecord, AuthError> {
        if !super::access_key::is_valid_format(key.trim()) {
            return Err(AuthError::InvalidFormat);
        }
        if self.find_active_key(key)?.is_some() {
            return Err(AuthError::DuplicateKey);
        }

        let record = AccessKeyRecord {
            id: Uuid::new_v4().to_string(),
            masked: masked_identity(key),
            label: label.map(str::to_string),
            key_hash: hash_password(&normalize(key))?,
            created_at: chrono::Utc::now().to_rfc3339(),
            revoked: false,
        };

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO access_keys (id, masked, label, key_hash, created_at, revoked)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                record.id,
                record.masked,
                record.label,
                record.key_hash,
                record.created_at,
            ],
        )?;

        Ok(record)
    }

    /// Active record matching `key`, compared case-insensitively
    pub fn find_active_key(&self, key: &str) -> Result<Option<AccessKeyRecord>, AuthError> {
        let candidates = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(
                "SELECT id, masked, label, key_hash, created_at, revoked
                 FROM access_keys WHERE masked = ?1 AND revoked = 0",
            )?;
            let rows = stmt
                .query_map(params![masked_identity(key)], Self::row_to_record)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        // hashing happens outside the lock
        let normalized = normalize(key);
        for record in candidates {
            match verify_password(&normalized, &record.key_hash) {
                Ok(true) => return Ok(Some(record)),
                Ok(false) => {}
                Err(e) => log::warn!("Unreadable hash for access key {}: {}", record.id, e),
            }
        }
        Ok(None)
    }

    pub fn list_keys(&self) -> Result<Vec<AccessKeyRecord>, AuthError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, masked, label, key_hash, created_at, revoked
             FROM access_keys ORDER BY created_at",
        )?;
        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Revoke by record id. Returns false if no active key had that id.
    pub fn revoke_key(&self, id: &str) -> Result<bool, AuthError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE access_keys SET revoked = 1 WHERE id = ?1 AND revoked = 0",
            params![id],
        )?;
        Ok(updated > 0)
    }
}
