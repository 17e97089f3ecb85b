use crate::types::tab::{TabId, WindowId};

// === HostError ===

/// Errors raised at the host-platform boundary (tabs, windows, messaging).
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Tab with the given ID no longer exists.
    #[error("No tab with id: {0}")]
    TabNotFound(TabId),
    /// Window with the given ID no longer exists.
    #[error("No window with id: {0}")]
    WindowNotFound(WindowId),
    /// The receiving end of a tab message is unavailable.
    #[error("Could not deliver message to tab {tab_id}: {reason}")]
    MessageUndeliverable { tab_id: TabId, reason: String },
    /// Any other failure reported by the host.
    #[error("Host call failed: {0}")]
    CallFailed(String),
}

impl HostError {
    /// True when the error only means the target disappeared, which callers treat as a no-op.
    pub fn is_gone(&self) -> bool {
        matches!(self, HostError::TabNotFound(_) | HostError::WindowNotFound(_))
    }
}

// === StorageError ===

/// Errors from the persisted key/value storage areas.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// SQLite operation failed.
    #[error("Storage database error: {0}")]
    Database(String),
    /// Stored value could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(String),
    /// The storage area is not available in this context.
    #[error("Storage area unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

// === SettingsError ===

/// Errors related to extension settings management.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading or writing the backing storage failed.
    #[error("Settings storage error: {0}")]
    Storage(#[from] StorageError),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === ResolveError ===

/// Errors from fetching or resolving links over the network.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Only http and https URLs are fetched.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    /// The request failed or returned a non-success status.
    #[error("Network error: {0}")]
    Network(String),
}

// === NotificationError ===

/// Errors answering a user response to a shown notification.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// No stored notification data under the given ID.
    #[error("notification data not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Host(#[from] HostError),
}
