//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Webhook error: {0}")]
    Webhook(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// True when the event referenced a user the store has no record for
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BotError::Storage(StorageError::UserNotFound(_) | StorageError::KeyNotFound { .. })
        )
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Key '{key}' not found for user {user_id}")]
    KeyNotFound { user_id: String, key: String },

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Delivery gateway errors
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
