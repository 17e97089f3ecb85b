//! Throttling for "duplicate tabs found" notifications.
//!
//! Combines a per-tab cooldown, a per-URL cooldown that reacts to how the user
//! answered earlier notifications, and an ignore-list that lives for one
//! browser session (and never longer than 24 hours).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::host::{StorageArea, StorageAreas};
use crate::services::url_normalizer::NormalizationCache;
use crate::types::errors::StorageError;
use crate::types::notification::{NotificationRecord, ResponseAction};
use crate::types::tab::TabId;

/// Minimum gap between two notifications on the same tab.
pub const TAB_COOLDOWN_MS: i64 = 3 * 60 * 1000;
/// Minimum gap between two notifications for the same URL.
pub const URL_COOLDOWN_MS: i64 = 5 * 60 * 1000;
/// Ignore entries and idle notification records expire after this.
pub const EXPIRY_MS: i64 = 24 * 60 * 60 * 1000;
/// A restart later than this after the previous one starts a new browser session.
pub const SESSION_GAP_MS: i64 = 5 * 60 * 1000;
/// Duplicate counts above this override the per-tab cooldown.
const TAB_COOLDOWN_OVERRIDE_COUNT: usize = 2;

pub const NOTIFICATION_RECORD_KEY: &str = "notificationRecord";
pub const IGNORED_URLS_DATA_KEY: &str = "ignoredUrlsData";
pub const IGNORED_URLS_SESSION_KEY: &str = "ignoredUrls";
pub const LAST_SESSION_ID_KEY: &str = "lastSessionId";
pub const NEW_BROWSER_SESSION_KEY: &str = "isNewBrowserSession";

/// Durable fallback copy of the ignore-list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct IgnoredUrlsData {
    ignored_urls: HashMap<String, i64>,
    saved_at: i64,
}

/// Per-URL and per-tab notification bookkeeping.
#[derive(Debug, Default)]
pub struct NotificationTracker {
    records: HashMap<String, NotificationRecord>,
    /// Normalized URL -> time the user chose "ignore".
    ignored_urls: HashMap<String, i64>,
    tab_notifications: HashMap<TabId, i64>,
}

impl NotificationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// False while `url` is on the ignore-list. Expired entries are dropped on the way.
    pub fn should_check_url(&mut self, cache: &mut NormalizationCache, url: &str, now: i64) -> bool {
        if url.is_empty() {
            return true;
        }
        let normalized = cache.get_or_compute(url, now);
        match self.ignored_urls.get(&normalized) {
            Some(ignored_at) if now - ignored_at < EXPIRY_MS => {
                tracing::debug!(url, "url is on the ignore list");
                false
            }
            Some(_) => {
                self.ignored_urls.remove(&normalized);
                true
            }
            None => true,
        }
    }

    /// Decides whether a notification about `duplicate_count` duplicates of `url`
    /// may be shown on `tab_id` now. A `true` answer counts as shown.
    pub fn can_notify(
        &mut self,
        cache: &mut NormalizationCache,
        tab_id: TabId,
        url: &str,
        duplicate_count: usize,
        now: i64,
    ) -> bool {
        if !self.should_check_url(cache, url, now) {
            return false;
        }

        self.cleanup(now);
        let record = self.records.entry(url.to_string()).or_default();

        if let Some(tab_last) = self.tab_notifications.get(&tab_id) {
            if now - tab_last < TAB_COOLDOWN_MS && duplicate_count <= TAB_COOLDOWN_OVERRIDE_COUNT {
                tracing::debug!(tab_id, "tab notification cooldown active");
                return false;
            }
        }

        if record.last_shown != 0 && now - record.last_shown < URL_COOLDOWN_MS {
            let threshold = 1 + record.responses.close.min(2) as usize;
            if duplicate_count < threshold {
                tracing::debug!(url, duplicate_count, threshold, "url notification cooldown active");
                return false;
            }
        }

        record.last_shown = now;
        record.total_shown += 1;
        self.tab_notifications.insert(tab_id, now);
        true
    }

    /// Records how the user answered a notification keyed by `key` and persists.
    ///
    /// An `Ignore` puts the normalized `originating_url` on the ignore-list.
    pub fn record_response(
        &mut self,
        cache: &mut NormalizationCache,
        storage: &mut StorageAreas,
        key: &str,
        action: ResponseAction,
        originating_url: Option<&str>,
        now: i64,
    ) {
        if key.is_empty() {
            return;
        }
        let record = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| NotificationRecord {
                last_shown: now,
                total_shown: 1,
                ..NotificationRecord::default()
            });
        match action {
            ResponseAction::Close => record.responses.close += 1,
            ResponseAction::Ignore => record.responses.ignore += 1,
            ResponseAction::AutoClose => {}
        }

        if action == ResponseAction::Ignore {
            if let Some(url) = originating_url.filter(|u| !u.is_empty()) {
                let normalized = cache.get_or_compute(url, now);
                tracing::info!(url, normalized = %normalized, "added url to ignore list");
                self.ignored_urls.insert(normalized, now);
                self.save_ignored_urls(storage, now);
            }
        }

        if let Err(e) = self.save(storage.durable.as_mut()) {
            tracing::warn!(error = %e, "failed to save notification records");
        }
    }

    /// Drops records idle for 24 hours and expired ignore entries.
    pub fn cleanup(&mut self, now: i64) {
        self.records
            .retain(|_, record| now - record.last_shown <= EXPIRY_MS);
        self.cleanup_ignored_urls(now);
    }

    pub fn cleanup_ignored_urls(&mut self, now: i64) {
        self.ignored_urls
            .retain(|_, ignored_at| now - *ignored_at <= EXPIRY_MS);
    }

    /// Forgets the per-tab cooldown of a closed tab.
    pub fn cleanup_tab(&mut self, tab_id: TabId) {
        if self.tab_notifications.remove(&tab_id).is_some() {
            tracing::debug!(tab_id, "cleared tab notification record");
        }
    }

    /// Forgets per-tab cooldowns of every tab not in `open_tabs`.
    pub fn retain_tabs(&mut self, open_tabs: &[TabId]) {
        self.tab_notifications.retain(|id, _| open_tabs.contains(id));
    }

    /// Persists the notification records to durable storage.
    pub fn save(&self, durable: &mut dyn StorageArea) -> Result<(), StorageError> {
        durable.set(NOTIFICATION_RECORD_KEY, serde_json::to_value(&self.records)?)
    }

    /// Persists the ignore-list to session storage, falling back to a
    /// timestamped durable copy when session storage is unavailable.
    pub fn save_ignored_urls(&self, storage: &mut StorageAreas, now: i64) {
        let value = match serde_json::to_value(&self.ignored_urls) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode ignore list");
                return;
            }
        };
        if let Err(e) = storage.session.set(IGNORED_URLS_SESSION_KEY, value.clone()) {
            tracing::warn!(error = %e, "session storage rejected ignore list, using durable fallback");
            let data = json!({ "ignoredUrls": value, "savedAt": now });
            if let Err(e) = storage.durable.set(IGNORED_URLS_DATA_KEY, data) {
                tracing::warn!(error = %e, "failed to save ignore list");
            }
        }
    }

    /// Restores persisted state and applies session-boundary expiry to the ignore-list.
    ///
    /// The ignore-list is taken from session storage when present. Otherwise the
    /// durable fallback copy is used, unless this start belongs to a new browser
    /// session (explicit restart flag, missing session id, or a gap above
    /// [`SESSION_GAP_MS`] since the last start) in which case it starts empty.
    ///
    /// Each key is read on its own: a failing key is logged and treated as
    /// absent, and the rest of the load still runs.
    pub fn load(&mut self, storage: &mut StorageAreas, now: i64) {
        if let Some(value) = read_or_warn(storage.durable.as_ref(), NOTIFICATION_RECORD_KEY) {
            match serde_json::from_value(value) {
                Ok(records) => self.records = records,
                Err(e) => tracing::warn!(error = %e, "discarding malformed notification records"),
            }
        }

        let restart_flag = read_or_warn(storage.durable.as_ref(), NEW_BROWSER_SESSION_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let is_new_session = if restart_flag {
            tracing::info!("browser restart flag found, ignore list expires");
            if let Err(e) = storage.durable.remove(NEW_BROWSER_SESSION_KEY) {
                tracing::warn!(key = NEW_BROWSER_SESSION_KEY, error = %e, "failed to consume restart flag");
            }
            true
        } else {
            let last = read_or_warn(storage.durable.as_ref(), LAST_SESSION_ID_KEY)
                .and_then(|v| parse_session_id(&v));
            match last {
                Some(last) => now - last > SESSION_GAP_MS,
                None => true,
            }
        };
        if let Err(e) = storage
            .durable
            .set(LAST_SESSION_ID_KEY, Value::String(now.to_string()))
        {
            tracing::warn!(key = LAST_SESSION_ID_KEY, error = %e, "failed to record session id");
        }

        let from_session = match storage.session.get(IGNORED_URLS_SESSION_KEY) {
            Ok(Some(value)) if !restart_flag => serde_json::from_value(value).ok(),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "session storage unavailable while loading ignore list");
                None
            }
        };

        self.ignored_urls = match from_session {
            Some(urls) => urls,
            None if is_new_session => HashMap::new(),
            None => read_or_warn(storage.durable.as_ref(), IGNORED_URLS_DATA_KEY)
                .and_then(|v| serde_json::from_value::<IgnoredUrlsData>(v).ok())
                .map(|data| data.ignored_urls)
                .unwrap_or_default(),
        };
        self.cleanup_ignored_urls(now);
    }

    pub fn record(&self, key: &str) -> Option<&NotificationRecord> {
        self.records.get(key)
    }

    pub fn is_ignored(&self, normalized_url: &str) -> bool {
        self.ignored_urls.contains_key(normalized_url)
    }

    pub fn ignored_count(&self) -> usize {
        self.ignored_urls.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn tab_last_notified(&self, tab_id: TabId) -> Option<i64> {
        self.tab_notifications.get(&tab_id).copied()
    }
}

fn read_or_warn(area: &dyn StorageArea, key: &str) -> Option<Value> {
    match area.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage read failed");
            None
        }
    }
}

/// Session ids are stored as stringified epoch milliseconds; numbers are accepted too.
fn parse_session_id(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}
