use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::application::errors::StorageError;
use crate::domain::entities::{UserRecord, LANGUAGE_KEY};
use crate::domain::traits::UserStore;

/// SQLite-backed user store.
///
/// One row per (user, attribute). The connection sits behind a mutex so
/// every operation runs alone, and multi-statement operations run inside a
/// transaction.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        init_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `op` on the blocking pool with exclusive access to the connection
    async fn with_conn<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| StorageError::Serialization("connection lock poisoned".to_string()))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
    }
}

fn init_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_attributes (
            user_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, key)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_user_attributes_user ON user_attributes(user_id)",
        [],
    )?;

    Ok(())
}

fn user_exists(conn: &Connection, user_id: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM user_attributes WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn load(&self, user_id: &str, key: &str) -> Result<String, StorageError> {
        let (user_id, key) = (user_id.to_string(), key.to_string());
        self.with_conn(move |conn| {
            let value: Option<String> = conn
                .query_row(
                    "SELECT value FROM user_attributes WHERE user_id = ?1 AND key = ?2",
                    [&user_id, &key],
                    |row| row.get(0),
                )
                .optional()?;

            match value {
                Some(value) => Ok(value),
                None if user_exists(conn, &user_id)? => Err(StorageError::KeyNotFound { user_id, key }),
                None => Err(StorageError::UserNotFound(user_id)),
            }
        })
        .await
    }

    async fn set(&self, user_id: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let (user_id, key, value) = (user_id.to_string(), key.to_string(), value.to_string());
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            if !user_exists(&tx, &user_id)? {
                return Err(StorageError::UserNotFound(user_id));
            }
            tx.execute(
                "INSERT OR REPLACE INTO user_attributes (user_id, key, value, updated_at)
                 VALUES (?1, ?2, ?3, datetime('now'))",
                [&user_id, &key, &value],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn create(&self, user_id: &str) -> Result<(), StorageError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM user_attributes WHERE user_id = ?1", [&user_id])?;
            for (key, value) in UserRecord::new().attributes() {
                tx.execute(
                    "INSERT INTO user_attributes (user_id, key, value) VALUES (?1, ?2, ?3)",
                    [user_id.as_str(), key, value],
                )?;
            }
            tx.commit()?;
            tracing::debug!("Created user {} with {}=unset", user_id, LANGUAGE_KEY);
            Ok(())
        })
        .await
    }

    async fn delete(&self, user_id: &str) -> Result<(), StorageError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM user_attributes WHERE user_id = ?1", [&user_id])?;
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM user_attributes", [])?;
            Ok(())
        })
        .await
    }
}
