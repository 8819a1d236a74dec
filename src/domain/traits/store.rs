use async_trait::async_trait;
use crate::application::errors::StorageError;

/// UserStore trait - per-user attribute persistence
///
/// Every operation is atomic with respect to every other operation on the
/// same store, whichever user it touches.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Read one attribute. Fails if the user or the key is absent.
    async fn load(&self, user_id: &str, key: &str) -> Result<String, StorageError>;

    /// Write one attribute of an existing user, creating the key if needed.
    async fn set(&self, user_id: &str, key: &str, value: &str) -> Result<(), StorageError>;

    /// Insert a fresh record, discarding any previous one for this user.
    async fn create(&self, user_id: &str) -> Result<(), StorageError>;

    /// Remove a record. Absent users are not an error.
    async fn delete(&self, user_id: &str) -> Result<(), StorageError>;

    /// Drop every record.
    async fn clear(&self) -> Result<(), StorageError>;
}
