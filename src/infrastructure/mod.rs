//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: JSON document store
//! - Database: SQLite store
//! - Adapters: Platform integrations (LINE, console)

pub mod config;
pub mod storage;
pub mod database;
pub mod adapters;

use std::sync::Arc;

use crate::application::errors::StorageError;
use crate::domain::traits::UserStore;
use config::{StorageBackend, StorageConfig};

/// Open the configured store, emptying it first when `reset-on-start` is set
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn UserStore>, StorageError> {
    let store: Arc<dyn UserStore> = match config.backend {
        StorageBackend::Json => Arc::new(storage::JsonStore::open(&config.path).await?) as Arc<dyn UserStore>,
        StorageBackend::Sqlite => {
            let path = config.path.clone();
            let store = tokio::task::spawn_blocking(move || database::SqliteStore::open(path))
                .await
                .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;
            Arc::new(store) as Arc<dyn UserStore>
        }
    };

    if config.reset_on_start {
        store.clear().await?;
        tracing::info!("Store reset at startup ({})", config.path.display());
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::LANGUAGE_KEY;

    #[tokio::test]
    async fn reset_on_start_empties_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StorageConfig {
            backend: StorageBackend::Json,
            path: dir.path().join("db.json"),
            reset_on_start: false,
        };

        let store = open_store(&config).await.unwrap();
        store.create("U1").await.unwrap();
        drop(store);

        let kept = open_store(&config).await.unwrap();
        assert_eq!(kept.load("U1", LANGUAGE_KEY).await.unwrap(), "unset");
        drop(kept);

        config.reset_on_start = true;
        let wiped = open_store(&config).await.unwrap();
        assert!(wiped.load("U1", LANGUAGE_KEY).await.is_err());
    }

    #[tokio::test]
    async fn sqlite_backend_is_selectable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StorageConfig {
            backend: StorageBackend::Sqlite,
            path: dir.path().join("users.db"),
            reset_on_start: true,
        };

        let store = open_store(&config).await.unwrap();
        store.create("U1").await.unwrap();
        assert_eq!(store.load("U1", LANGUAGE_KEY).await.unwrap(), "unset");
        drop(store);

        config.reset_on_start = false;
        let reopened = open_store(&config).await.unwrap();
        assert_eq!(reopened.load("U1", LANGUAGE_KEY).await.unwrap(), "unset");
    }
}
