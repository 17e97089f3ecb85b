use serde::{Deserialize, Serialize};

use super::tab::TabId;

/// How a user (or the service itself) responded to a duplicate-tabs notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseAction {
    Close,
    Ignore,
    /// Duplicates were closed without asking. Not counted in [`ResponseCounts`].
    #[serde(rename = "autoclose")]
    AutoClose,
}

/// Per-action response counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseCounts {
    pub close: u32,
    pub ignore: u32,
}

/// Notification history for one URL, persisted under `notificationRecord`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationRecord {
    /// Epoch milliseconds; 0 means never shown.
    pub last_shown: i64,
    pub total_shown: u32,
    pub responses: ResponseCounts,
}

/// One duplicate tab as remembered alongside a shown notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateTabInfo {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub favicon: String,
}

/// Data stored under `duplicate-tabs-<tabId>-<timestamp>` until the user responds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNotification {
    pub tab_id: TabId,
    pub duplicate_ids: Vec<TabId>,
    pub domain: String,
    pub tab_url: String,
    pub timestamp: i64,
    pub duplicates: Vec<DuplicateTabInfo>,
}

/// Payload of the `showDuplicateTabsNotification` message sent to the reference tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateNotification {
    pub count: usize,
    pub notification_id: String,
    pub domain: String,
    pub tab_url: String,
    pub duplicate_urls: Vec<String>,
    pub title: String,
    pub summary: String,
    pub titles: Vec<String>,
}

/// Prefix shared by every stored notification key.
pub const NOTIFICATION_KEY_PREFIX: &str = "duplicate-tabs-";

/// Builds the storage key / notification id for a notification shown on `tab_id` at `now`.
pub fn notification_id(tab_id: TabId, now: i64) -> String {
    format!("{}{}-{}", NOTIFICATION_KEY_PREFIX, tab_id, now)
}
