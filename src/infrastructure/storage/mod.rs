//! File-based storage implementation

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::domain::traits::UserStore;
use crate::domain::entities::UserRecord;
use crate::application::errors::StorageError;

type Records = BTreeMap<String, UserRecord>;

/// JSON document store: `{ "<user_id>": { "language": "..." } }`
///
/// Records live in memory behind one mutex. Every mutation rewrites the
/// document while the lock is held, and only commits the in-memory change
/// once the write succeeded.
pub struct JsonStore {
    path: Option<PathBuf>,
    users: Mutex<Records>,
}

impl JsonStore {
    /// Store without a backing file
    pub fn in_memory() -> Self {
        Self {
            path: None,
            users: Mutex::new(Records::new()),
        }
    }

    /// Open the document at `path`, starting empty if it does not exist yet
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let users = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Records::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Serialization(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Records::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!("Loaded {} user record(s) from {}", users.len(), path.display());
        Ok(Self {
            path: Some(path),
            users: Mutex::new(users),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }

    async fn persist(&self, users: &Records) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let data = serde_json::to_vec(users)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Apply `change` to a copy of the records, persist it, then commit
    async fn mutate<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Records) -> Result<(), StorageError> + Send,
    {
        let mut users = self.users.lock().await;
        let mut next = users.clone();
        change(&mut next)?;
        self.persist(&next).await?;
        *users = next;
        Ok(())
    }
}

#[async_trait]
impl UserStore for JsonStore {
    async fn load(&self, user_id: &str, key: &str) -> Result<String, StorageError> {
        let users = self.users.lock().await;
        let record = users
            .get(user_id)
            .ok_or_else(|| StorageError::UserNotFound(user_id.to_string()))?;
        record
            .get(key)
            .map(str::to_string)
            .ok_or_else(|| StorageError::KeyNotFound {
                user_id: user_id.to_string(),
                key: key.to_string(),
            })
    }

    async fn set(&self, user_id: &str, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(|users| {
            let record = users
                .get_mut(user_id)
                .ok_or_else(|| StorageError::UserNotFound(user_id.to_string()))?;
            record.set(key, value);
            Ok(())
        })
        .await
    }

    async fn create(&self, user_id: &str) -> Result<(), StorageError> {
        self.mutate(|users| {
            users.insert(user_id.to_string(), UserRecord::new());
            Ok(())
        })
        .await
    }

    async fn delete(&self, user_id: &str) -> Result<(), StorageError> {
        self.mutate(|users| {
            users.remove(user_id);
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.mutate(|users| {
            users.clear();
            Ok(())
        })
        .await
    }
}
