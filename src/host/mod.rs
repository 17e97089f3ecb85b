//! Host-platform adapter.
//!
//! The core never talks to the browser directly. Everything it needs from the
//! host (tab and window control, message delivery, the badge, key/value
//! storage, the clock) goes through the traits in this module, so handlers see
//! one error type per concern instead of host-specific error conventions.

pub mod clock;
pub mod memory;

use serde_json::Value;

use crate::types::errors::{HostError, StorageError};
use crate::types::tab::{CreateTabOptions, Tab, TabId, TabUpdate, Window, WindowId, WindowUpdate};

pub use clock::{Clock, ManualClock, SystemClock};

/// Tab, window and messaging capabilities of the host browser.
pub trait TabHost {
    /// Point-in-time snapshot of every open tab across all windows.
    fn query_tabs(&self) -> Result<Vec<Tab>, HostError>;
    fn get_tab(&self, tab_id: TabId) -> Result<Tab, HostError>;
    fn update_tab(&mut self, tab_id: TabId, update: &TabUpdate) -> Result<Tab, HostError>;
    /// Removes all listed tabs, or none of them if any is missing.
    fn remove_tabs(&mut self, tab_ids: &[TabId]) -> Result<(), HostError>;
    fn create_tab(&mut self, options: &CreateTabOptions) -> Result<Tab, HostError>;
    fn get_window(&self, window_id: WindowId) -> Result<Window, HostError>;
    fn update_window(&mut self, window_id: WindowId, update: &WindowUpdate)
        -> Result<Window, HostError>;
    /// Delivers a message to the UI script running in `tab_id`.
    fn send_message(&mut self, tab_id: TabId, message: &Value) -> Result<(), HostError>;
    /// Sets the toolbar badge. An empty `text` clears it.
    fn set_badge(&mut self, text: &str, color: Option<&str>) -> Result<(), HostError>;
}

/// A key/value storage scope holding JSON values.
pub trait StorageArea {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// The two storage scopes the service persists into.
pub struct StorageAreas {
    /// Survives browser restarts.
    pub durable: Box<dyn StorageArea + Send>,
    /// Cleared when the browser restarts.
    pub session: Box<dyn StorageArea + Send>,
}

impl StorageAreas {
    pub fn new(
        durable: Box<dyn StorageArea + Send>,
        session: Box<dyn StorageArea + Send>,
    ) -> Self {
        Self { durable, session }
    }

    /// Both scopes in memory. Used by tests and by hosts without durable storage.
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(memory::MemoryStorage::new()),
            Box::new(memory::MemoryStorage::new()),
        )
    }
}
