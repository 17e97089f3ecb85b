//! Background service core for tabwarden.
//!
//! Central struct holding the trackers, the host adapter and the storage
//! scopes, and wiring tab events through the duplicate-detection pipeline:
//! event → check gate → scan → notification gate → notify or auto-close.
//!
//! The service is single-threaded and `&mut self`-driven. Timers are
//! deadlines polled through [`Background::poll_timers`].

use serde_json::{json, Value};
use url::Url;

use crate::host::{Clock, StorageAreas, TabHost};
use crate::managers::duplicate_check_tracker::DuplicateCheckTracker;
use crate::managers::notification_tracker::{
    NotificationTracker, LAST_SESSION_ID_KEY, NEW_BROWSER_SESSION_KEY,
};
use crate::managers::tab_orchestrator::{self, SmartCreateOutcome};
use crate::managers::timers::{Debouncer, Periodic};
use crate::services::duplicate_scanner::find_duplicates;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::url_normalizer::{CacheStats, NormalizationCache};
use crate::types::errors::{HostError, NotificationError, SettingsError};
use crate::types::notification::{
    notification_id, DuplicateNotification, DuplicateTabInfo, ResponseAction, StoredNotification,
    NOTIFICATION_KEY_PREFIX,
};
use crate::types::settings::{ExtensionSettings, TimingConfig};
use crate::types::tab::{Tab, TabChangeInfo, TabId};

/// Badge background colour.
pub const BADGE_COLOR: &str = "#ff6b6b";
/// Durable key recording the last install or update.
pub const INSTALL_TIME_KEY: &str = "installOrUpdateTime";
/// Frequency stats kept by memory maintenance.
const FREQUENCY_ENTRIES_KEPT: usize = 50;
/// Titles included in outbound payloads.
const MAX_TITLES: usize = 3;

/// A duplicate check waiting in the debounce slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCheck {
    pub tab_id: TabId,
    /// Important checks bypass the duplicate-check tracker.
    pub important: bool,
}

/// Last tab scanned, used to skip redundant follow-up checks.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LastChecked {
    tab_id: TabId,
    url: String,
    time: i64,
}

/// Result of one duplicate check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Disabled,
    TabGone,
    /// The URL is on the ignore-list.
    Ignored,
    /// The duplicate-check tracker is still cooling down for this URL.
    Throttled,
    NoDuplicates,
    /// A notification was stored and sent under this ID.
    Notified(String),
    /// Duplicates exist but the notification gate refused.
    Suppressed,
    AutoClosed(Vec<TabId>),
}

/// Picks the memory-maintenance delay from the normalization cache usage.
pub fn maintenance_interval_ms(usage_ratio: f64) -> i64 {
    const MINUTE: i64 = 60 * 1000;
    if usage_ratio > 0.8 {
        10 * MINUTE
    } else if usage_ratio > 0.6 {
        20 * MINUTE
    } else {
        45 * MINUTE
    }
}

/// "Found N duplicate tabs" in the configured language.
pub fn duplicate_summary(count: usize, chinese: bool) -> String {
    match (chinese, count) {
        (false, 1) => "Found 1 duplicate tab".to_string(),
        (false, n) => format!("Found {} duplicate tabs", n),
        (true, n) => format!("有{}个重复标签页", n),
    }
}

pub fn untitled_tab_label(chinese: bool) -> &'static str {
    if chinese {
        "未命名标签页"
    } else {
        "Untitled tab"
    }
}

fn domain_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// The background service.
pub struct Background<H: TabHost> {
    host: H,
    storage: StorageAreas,
    clock: Box<dyn Clock + Send>,
    timing: TimingConfig,
    settings_engine: SettingsEngine,
    cache: NormalizationCache,
    check_tracker: DuplicateCheckTracker,
    notifications: NotificationTracker,
    check_debounce: Debouncer<PendingCheck>,
    badge_debounce: Debouncer<()>,
    follow_ups: Vec<(i64, TabId)>,
    last_checked: Option<LastChecked>,
    tracker_cleanup: Periodic,
    notification_cleanup: Periodic,
    maintenance: Periodic,
}

impl<H: TabHost> Background<H> {
    pub fn new(host: H, storage: StorageAreas, clock: Box<dyn Clock + Send>) -> Self {
        Self::with_timing(host, storage, clock, TimingConfig::default())
    }

    pub fn with_timing(
        host: H,
        storage: StorageAreas,
        clock: Box<dyn Clock + Send>,
        timing: TimingConfig,
    ) -> Self {
        let now = clock.now_ms();
        Self {
            host,
            storage,
            clock,
            timing,
            settings_engine: SettingsEngine::new(),
            cache: NormalizationCache::new(),
            check_tracker: DuplicateCheckTracker::new(),
            notifications: NotificationTracker::new(),
            check_debounce: Debouncer::new(timing.check_debounce_ms),
            badge_debounce: Debouncer::new(timing.badge_debounce_ms),
            follow_ups: Vec::new(),
            last_checked: None,
            tracker_cleanup: Periodic::starting_at(now, timing.tracker_cleanup_interval_ms),
            notification_cleanup: Periodic::starting_at(
                now,
                timing.notification_cleanup_interval_ms,
            ),
            maintenance: Periodic::starting_at(now, maintenance_interval_ms(0.0)),
        }
    }

    /// Startup sequence: load settings, restore trackers, schedule maintenance, draw the badge.
    pub fn startup(&mut self) {
        let now = self.now();
        if let Err(e) = self.settings_engine.load(self.storage.durable.as_ref()) {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
        }
        self.notifications.load(&mut self.storage, now);
        self.tracker_cleanup
            .reschedule(now, self.timing.tracker_cleanup_interval_ms);
        self.notification_cleanup
            .reschedule(now, self.timing.notification_cleanup_interval_ms);
        self.maintenance
            .reschedule(now, maintenance_interval_ms(self.cache.usage_ratio()));
        self.update_tab_count_badge();
        tracing::info!(
            ignored = self.notifications.ignored_count(),
            records = self.notifications.record_count(),
            "background service started"
        );
    }

    /// Shutdown sequence: persist notification records and the ignore-list.
    pub fn shutdown(&mut self) {
        let now = self.now();
        if let Err(e) = self.notifications.save(self.storage.durable.as_mut()) {
            tracing::warn!(error = %e, "failed to save notification records");
        }
        self.notifications.save_ignored_urls(&mut self.storage, now);
        self.check_debounce.cancel();
        self.badge_debounce.cancel();
        self.follow_ups.clear();
    }

    /// Install or update: start a session id and stamp the install time.
    pub fn on_installed(&mut self) {
        let now = self.now();
        let durable = self.storage.durable.as_mut();
        if let Err(e) = durable
            .set(LAST_SESSION_ID_KEY, Value::String(now.to_string()))
            .and_then(|_| durable.set(INSTALL_TIME_KEY, json!(now)))
        {
            tracing::warn!(error = %e, "failed to record install time");
        }
        self.update_tab_count_badge();
    }

    /// Browser start: the next load treats the ignore-list as expired.
    pub fn on_browser_startup(&mut self) {
        let now = self.now();
        let durable = self.storage.durable.as_mut();
        if let Err(e) = durable
            .set(LAST_SESSION_ID_KEY, Value::String(now.to_string()))
            .and_then(|_| durable.set(NEW_BROWSER_SESSION_KEY, json!(true)))
        {
            tracing::warn!(error = %e, "failed to mark new browser session");
        }
    }

    pub fn on_tab_activated(&mut self, tab_id: TabId) {
        self.schedule_check(tab_id, true);
        self.schedule_badge_update();
    }

    /// A finished load re-checks the active tab; a URL change re-checks it as important.
    pub fn on_tab_updated(&mut self, tab_id: TabId, change: &TabChangeInfo, tab: &Tab) {
        if change.is_complete() && tab.active {
            self.schedule_check(tab_id, false);
        } else if change.url.is_some() && tab.active {
            self.schedule_check(tab_id, true);
        }
        if change.is_complete() {
            self.schedule_badge_update();
        }
    }

    pub fn on_tab_created(&mut self, _tab: &Tab) {
        self.schedule_badge_update();
    }

    pub fn on_tab_removed(&mut self, tab_id: TabId) {
        self.notifications.cleanup_tab(tab_id);
        self.follow_ups.retain(|(_, id)| *id != tab_id);
        self.schedule_badge_update();
    }

    /// Puts a check in the single debounce slot, replacing whatever was pending.
    pub fn schedule_check(&mut self, tab_id: TabId, important: bool) {
        let now = self.now();
        if self.check_debounce.schedule(PendingCheck { tab_id, important }, now) {
            tracing::debug!(tab_id, "superseded pending duplicate check");
        }
    }

    pub fn schedule_badge_update(&mut self) {
        let now = self.now();
        self.badge_debounce.schedule((), now);
    }

    /// Runs every timer whose deadline has passed.
    pub fn poll_timers(&mut self) {
        let now = self.now();

        if let Some(check) = self.check_debounce.take_due(now) {
            self.check_tab_duplicates(check.tab_id, check.important);
        }
        if self.badge_debounce.take_due(now).is_some() {
            self.update_tab_count_badge();
        }

        let (due, waiting): (Vec<_>, Vec<_>) =
            self.follow_ups.drain(..).partition(|(at, _)| *at <= now);
        self.follow_ups = waiting;
        for (_, tab_id) in due {
            self.run_follow_up_check(tab_id);
        }

        if self.tracker_cleanup.fire(now) {
            self.check_tracker.cleanup(now);
        }
        if self.notification_cleanup.fire(now) {
            self.notifications.cleanup(now);
            if let Err(e) = self.notifications.save(self.storage.durable.as_mut()) {
                tracing::warn!(error = %e, "failed to save notification records");
            }
            self.notifications.save_ignored_urls(&mut self.storage, now);
        }
        if self.maintenance.is_due(now) {
            self.run_maintenance();
            let next = maintenance_interval_ms(self.cache.usage_ratio());
            self.maintenance.reschedule(now, next);
            tracing::debug!(next_ms = next, "scheduled next memory maintenance");
        }
    }

    /// Earliest pending deadline, for hosts that sleep between polls.
    pub fn next_deadline(&self) -> Option<i64> {
        [
            self.check_debounce.due_at(),
            self.badge_debounce.due_at(),
            self.follow_ups.iter().map(|(at, _)| *at).min(),
            Some(self.tracker_cleanup.next_due()),
            Some(self.notification_cleanup.next_due()),
            Some(self.maintenance.next_due()),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Scans for duplicates of `tab_id`'s URL and notifies or auto-closes.
    ///
    /// Unimportant checks go through the duplicate-check tracker first.
    pub fn check_tab_duplicates(&mut self, tab_id: TabId, important: bool) -> CheckOutcome {
        let settings = self.settings_engine.get_settings().clone();
        if !settings.enable_duplicate_check {
            tracing::debug!("duplicate check disabled");
            return CheckOutcome::Disabled;
        }

        let tab = match self.host.get_tab(tab_id) {
            Ok(tab) if !tab.url.is_empty() => tab,
            Ok(_) => return CheckOutcome::TabGone,
            Err(e) => {
                tracing::debug!(tab_id, error = %e, "tab gone before duplicate check");
                return CheckOutcome::TabGone;
            }
        };

        let now = self.now();
        if !self.notifications.should_check_url(&mut self.cache, &tab.url, now) {
            return CheckOutcome::Ignored;
        }
        if !important && !self.check_tracker.should_check(tab_id, &tab.url, now) {
            tracing::debug!(tab_id, "duplicate check cooling down");
            return CheckOutcome::Throttled;
        }

        self.last_checked = Some(LastChecked {
            tab_id,
            url: tab.url.clone(),
            time: now,
        });
        let duplicates = find_duplicates(
            &self.host,
            &mut self.cache,
            &mut self.notifications,
            tab_id,
            &tab.url,
            now,
        );
        self.check_tracker
            .update_stats(&tab.url, !duplicates.is_empty(), now);

        if duplicates.is_empty() {
            return CheckOutcome::NoDuplicates;
        }

        if settings.auto_close_detected_tabs {
            match self.auto_close(&tab, &duplicates, now) {
                Ok(closed) => return CheckOutcome::AutoClosed(closed),
                Err(e) => {
                    tracing::warn!(tab_id, error = %e, "auto-close failed, falling back to notification");
                }
            }
        }

        match self.notify_duplicate_tabs(tab_id, &duplicates) {
            Some(id) => CheckOutcome::Notified(id),
            None => CheckOutcome::Suppressed,
        }
    }

    fn auto_close(&mut self, tab: &Tab, duplicates: &[Tab], now: i64) -> Result<Vec<TabId>, HostError> {
        let ids: Vec<TabId> = duplicates.iter().map(|t| t.id).collect();
        self.host.remove_tabs(&ids)?;
        tracing::info!(tab_id = tab.id, count = ids.len(), url = %tab.url, "auto-closed duplicate tabs");

        self.notifications.record_response(
            &mut self.cache,
            &mut self.storage,
            &tab.url,
            ResponseAction::AutoClose,
            Some(&tab.url),
            now,
        );

        let chinese = self.settings_engine.get_settings().prefers_chinese();
        let message = json!({
            "action": "showAutoCloseSuccessNotification",
            "data": {
                "count": duplicates.len(),
                "titles": self.titles(duplicates, chinese),
            }
        });
        if let Err(e) = self.host.send_message(tab.id, &message) {
            tracing::debug!(tab_id = tab.id, error = %e, "auto-close message not delivered");
        }
        Ok(ids)
    }

    fn titles(&self, tabs: &[Tab], chinese: bool) -> Vec<String> {
        tabs.iter()
            .take(MAX_TITLES)
            .map(|t| {
                if t.title.is_empty() {
                    untitled_tab_label(chinese).to_string()
                } else {
                    t.title.clone()
                }
            })
            .collect()
    }

    /// Stores and sends a "duplicate tabs found" notification if the gate allows it.
    ///
    /// Returns the notification ID when one was stored.
    pub fn notify_duplicate_tabs(&mut self, tab_id: TabId, duplicates: &[Tab]) -> Option<String> {
        if duplicates.is_empty() {
            return None;
        }
        let tab = match self.host.get_tab(tab_id) {
            Ok(tab) if !tab.url.is_empty() => tab,
            Ok(_) => return None,
            Err(e) => {
                tracing::debug!(tab_id, error = %e, "reference tab gone before notifying");
                return None;
            }
        };

        let now = self.now();
        let count = duplicates.len();
        if !self
            .notifications
            .can_notify(&mut self.cache, tab_id, &tab.url, count, now)
        {
            tracing::debug!(tab_id, url = %tab.url, "notification suppressed");
            return None;
        }

        let chinese = self.settings_engine.get_settings().prefers_chinese();
        let id = notification_id(tab_id, now);
        let domain = domain_of(&tab.url);
        let stored = StoredNotification {
            tab_id,
            duplicate_ids: duplicates.iter().map(|t| t.id).collect(),
            domain: domain.clone(),
            tab_url: tab.url.clone(),
            timestamp: now,
            duplicates: duplicates
                .iter()
                .map(|t| DuplicateTabInfo {
                    id: t.id,
                    url: t.url.clone(),
                    title: if t.title.is_empty() {
                        untitled_tab_label(chinese).to_string()
                    } else {
                        t.title.clone()
                    },
                    favicon: t.fav_icon_url.clone().unwrap_or_default(),
                })
                .collect(),
        };
        let stored_value = match serde_json::to_value(&stored) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode notification data");
                return None;
            }
        };
        if let Err(e) = self.storage.durable.set(&id, stored_value) {
            tracing::warn!(error = %e, "failed to store notification data");
            return None;
        }

        let payload = DuplicateNotification {
            count,
            notification_id: id.clone(),
            domain,
            tab_url: tab.url.clone(),
            duplicate_urls: duplicates.iter().map(|t| t.url.clone()).collect(),
            title: stored.duplicates[0].title.clone(),
            summary: duplicate_summary(count, chinese),
            titles: self.titles(duplicates, chinese),
        };
        let message = json!({ "action": "showDuplicateTabsNotification", "data": payload });
        if let Err(e) = self.host.send_message(tab_id, &message) {
            tracing::debug!(tab_id, error = %e, "duplicate notification not delivered");
        }
        tracing::info!(tab_id, count, notification_id = %id, "duplicate tabs notification shown");
        Some(id)
    }

    fn stored_notification(&self, notification_id: &str) -> Result<StoredNotification, NotificationError> {
        let value = self
            .storage
            .durable
            .get(notification_id)?
            .ok_or_else(|| NotificationError::NotFound(notification_id.to_string()))?;
        serde_json::from_value(value).map_err(|e| {
            tracing::warn!(notification_id, error = %e, "malformed notification data");
            NotificationError::NotFound(notification_id.to_string())
        })
    }

    /// User chose "close": removes the still-open duplicates and refocuses the reference tab.
    ///
    /// Returns how many tabs were closed.
    pub fn close_duplicate_tabs(&mut self, notification_id: &str) -> Result<usize, NotificationError> {
        let stored = self.stored_notification(notification_id)?;
        let now = self.now();

        self.notifications.record_response(
            &mut self.cache,
            &mut self.storage,
            &stored.tab_url,
            ResponseAction::Close,
            None,
            now,
        );

        let existing: Vec<TabId> = stored
            .duplicate_ids
            .iter()
            .copied()
            .filter(|id| self.host.get_tab(*id).is_ok())
            .collect();
        if !existing.is_empty() {
            self.host.remove_tabs(&existing)?;
        }

        match self.host.get_tab(stored.tab_id) {
            Ok(tab) => {
                if let Err(e) = tab_orchestrator::activate_and_focus(&mut self.host, &tab) {
                    tracing::debug!(tab_id = tab.id, error = %e, "could not re-activate reference tab");
                }
            }
            Err(_) => tracing::debug!(tab_id = stored.tab_id, "reference tab already closed"),
        }

        if let Err(e) = self.storage.durable.remove(notification_id) {
            tracing::warn!(notification_id, error = %e, "failed to delete notification data");
        }
        tracing::info!(notification_id, closed = existing.len(), "closed duplicate tabs");
        Ok(existing.len())
    }

    /// User chose "ignore": the reference URL stops producing notifications for a while.
    pub fn ignore_duplicate_tabs(&mut self, notification_id: &str) {
        let stored = match self.stored_notification(notification_id) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::debug!(notification_id, error = %e, "nothing to ignore");
                return;
            }
        };
        let url = if stored.tab_url.is_empty() {
            stored.duplicates.first().map(|d| d.url.clone()).unwrap_or_default()
        } else {
            stored.tab_url.clone()
        };
        let now = self.now();
        self.notifications.record_response(
            &mut self.cache,
            &mut self.storage,
            &url,
            ResponseAction::Ignore,
            Some(&url),
            now,
        );
        if let Err(e) = self.storage.durable.remove(notification_id) {
            tracing::warn!(notification_id, error = %e, "failed to delete notification data");
        }
    }

    /// Opens `url` reusing existing tabs, and schedules a follow-up check for a new tab.
    pub fn smart_create_tab(&mut self, url: Option<&str>, active: bool) -> SmartCreateOutcome {
        let now = self.now();
        let settings = self.settings_engine.get_settings().clone();
        let outcome = tab_orchestrator::smart_create_tab(
            &mut self.host,
            &mut self.cache,
            &settings,
            url,
            active,
            now,
        );
        if let SmartCreateOutcome::Created(tab) = &outcome {
            self.follow_ups
                .push((now + self.timing.follow_up_delay_ms, tab.id));
        }
        outcome
    }

    /// Opens `url` right of the most recently used tab, without reuse.
    pub fn open_in_new_tab(&mut self, url: &str) -> Result<Tab, HostError> {
        tab_orchestrator::create_tab_with_recent_index(&mut self.host, Some(url), true)
    }

    /// Delayed check for a tab opened by [`Self::smart_create_tab`].
    fn run_follow_up_check(&mut self, tab_id: TabId) -> Option<String> {
        let tab = self.host.get_tab(tab_id).ok().filter(|t| !t.url.is_empty())?;
        let now = self.now();
        if let Some(last) = &self.last_checked {
            if last.tab_id == tab_id
                && last.url == tab.url
                && now - last.time < self.timing.follow_up_cooldown_ms
            {
                tracing::debug!(tab_id, "new tab already checked, skipping follow-up");
                return None;
            }
        }
        if !self.settings_engine.get_settings().enable_duplicate_check {
            return None;
        }
        self.last_checked = Some(LastChecked {
            tab_id,
            url: tab.url.clone(),
            time: now,
        });
        let duplicates = find_duplicates(
            &self.host,
            &mut self.cache,
            &mut self.notifications,
            tab_id,
            &tab.url,
            now,
        );
        self.notify_duplicate_tabs(tab_id, &duplicates)
    }

    /// Sets the badge to the open tab count, or clears it.
    pub fn update_tab_count_badge(&mut self) {
        let result = if !self.settings_engine.get_settings().show_tab_count_badge {
            self.host.set_badge("", None)
        } else {
            match self.host.query_tabs() {
                Ok(tabs) if tabs.is_empty() => self.host.set_badge("", None),
                Ok(tabs) => self
                    .host
                    .set_badge(&tabs.len().to_string(), Some(BADGE_COLOR)),
                Err(e) => Err(e),
            }
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to update tab count badge");
        }
    }

    /// Memory maintenance: expire records, shrink the cache and stats, purge old notifications.
    pub fn run_maintenance(&mut self) {
        let now = self.now();
        self.notifications.cleanup(now);
        if self.cache.check_and_clean(now) {
            tracing::debug!(size = self.cache.len(), "normalization cache trimmed");
        }
        self.check_tracker.trim_frequency(FREQUENCY_ENTRIES_KEPT);
        self.check_tracker.cleanup(now);
        match self.host.query_tabs() {
            Ok(tabs) => {
                let open: Vec<TabId> = tabs.iter().map(|t| t.id).collect();
                self.notifications.retain_tabs(&open);
            }
            Err(e) => tracing::debug!(error = %e, "skipping tab record pruning"),
        }
        let purged = self.purge_stored_notifications(now);
        if purged > 0 {
            tracing::info!(purged, "removed expired notification data");
        }
    }

    /// Deletes stored notifications older than the configured TTL.
    pub fn purge_stored_notifications(&mut self, now: i64) -> usize {
        let keys = match self.storage.durable.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list stored notifications");
                return 0;
            }
        };
        let mut purged = 0;
        for key in keys.iter().filter(|k| k.starts_with(NOTIFICATION_KEY_PREFIX)) {
            let timestamp = match self.storage.durable.get(key) {
                Ok(Some(value)) => value.get("timestamp").and_then(Value::as_i64),
                _ => None,
            };
            let Some(timestamp) = timestamp else { continue };
            if now - timestamp > self.timing.stored_notification_ttl_ms {
                match self.storage.durable.remove(key) {
                    Ok(()) => purged += 1,
                    Err(e) => tracing::warn!(key = %key, error = %e, "failed to purge notification"),
                }
            }
        }
        purged
    }

    pub fn settings(&self) -> &ExtensionSettings {
        self.settings_engine.get_settings()
    }

    /// Re-reads settings after another context changed them, and redraws the badge.
    pub fn reload_settings(&mut self) -> Result<(), SettingsError> {
        self.settings_engine.load(self.storage.durable.as_ref())?;
        self.update_tab_count_badge();
        Ok(())
    }

    pub fn update_setting(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.settings_engine
            .set_value(self.storage.durable.as_mut(), key, value)?;
        tracing::info!(key, "setting updated");
        Ok(())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_url_cache(&mut self) {
        self.cache.clear();
        tracing::info!("normalization cache cleared");
    }

    pub fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn storage(&self) -> &StorageAreas {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut StorageAreas {
        &mut self.storage
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn cache(&self) -> &NormalizationCache {
        &self.cache
    }

    pub fn check_tracker(&self) -> &DuplicateCheckTracker {
        &self.check_tracker
    }

    pub fn notifications(&self) -> &NotificationTracker {
        &self.notifications
    }

    pub fn pending_check(&self) -> Option<PendingCheck> {
        self.check_debounce.pending().copied()
    }

    pub fn pending_follow_ups(&self) -> usize {
        self.follow_ups.len()
    }
}
