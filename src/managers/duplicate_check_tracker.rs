//! Decides, per URL, whether an expensive duplicate scan should run now.
//!
//! Each URL gets its own cooldown, scaled by how often scans of that URL
//! actually found duplicates: rarely-duplicated URLs are checked half as
//! often, frequently-duplicated ones twice as often.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::types::tab::TabId;

/// Base cooldown between scans of the same URL.
pub const BASE_COOLDOWN_MS: i64 = 5_000;

/// Tracked-URL count above which bookkeeping is pruned.
pub const MAX_TRACKED_URLS: usize = 200;

/// Below this duplicate ratio the cooldown doubles.
const LOW_DUPLICATE_RATIO: f64 = 0.1;

/// Above this duplicate ratio the cooldown halves.
const HIGH_DUPLICATE_RATIO: f64 = 0.5;

/// Stats for URLs checked more often than this with no duplicates are pruned.
const UNINTERESTING_CHECK_COUNT: u32 = 10;

/// When the last scan of a URL ran and for which tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckRecord {
    pub last_check_time: i64,
    pub tab_id: TabId,
}

/// Observed scan outcomes for a URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlFrequencyStats {
    pub check_count: u32,
    pub duplicate_count: u32,
    pub duplicate_ratio: f64,
    /// Epoch milliseconds of the latest `update_stats` call.
    pub last_updated: i64,
}

/// Per-URL adaptive cooldown gate for duplicate scans.
#[derive(Debug)]
pub struct DuplicateCheckTracker {
    url_checks: HashMap<String, CheckRecord>,
    url_frequency: IndexMap<String, UrlFrequencyStats>,
    cooldown_ms: i64,
    max_tracked: usize,
}

impl DuplicateCheckTracker {
    pub fn new() -> Self {
        Self::with_limits(BASE_COOLDOWN_MS, MAX_TRACKED_URLS)
    }

    pub fn with_limits(cooldown_ms: i64, max_tracked: usize) -> Self {
        Self {
            url_checks: HashMap::new(),
            url_frequency: IndexMap::new(),
            cooldown_ms,
            max_tracked,
        }
    }

    /// Cooldown for `url`, adapted to its duplicate ratio.
    pub fn cooldown_for(&self, url: &str) -> i64 {
        match self.url_frequency.get(url) {
            Some(stats) if stats.duplicate_ratio < LOW_DUPLICATE_RATIO => self.cooldown_ms * 2,
            Some(stats) if stats.duplicate_ratio > HIGH_DUPLICATE_RATIO => self.cooldown_ms / 2,
            _ => self.cooldown_ms,
        }
    }

    /// Returns true and records the check if `url` is outside its cooldown.
    ///
    /// Callers with an important trigger (tab activation) skip this gate entirely.
    pub fn should_check(&mut self, tab_id: TabId, url: &str, now: i64) -> bool {
        if url.is_empty() {
            return false;
        }

        if let Some(last) = self.url_checks.get(url) {
            if now - last.last_check_time < self.cooldown_for(url) {
                tracing::debug!(url, tab_id, "url in check cooldown, skipping");
                return false;
            }
        }

        self.url_checks.insert(
            url.to_string(),
            CheckRecord {
                last_check_time: now,
                tab_id,
            },
        );

        if self.url_checks.len() > self.max_tracked {
            self.cleanup(now);
        }
        true
    }

    /// Feeds a scan outcome back into the URL's stats.
    pub fn update_stats(&mut self, url: &str, found_duplicates: bool, now: i64) {
        if url.is_empty() {
            return;
        }
        let stats = self.url_frequency.entry(url.to_string()).or_default();
        stats.check_count += 1;
        if found_duplicates {
            stats.duplicate_count += 1;
        }
        stats.duplicate_ratio = stats.duplicate_count as f64 / stats.check_count as f64;
        stats.last_updated = now;

        if self.url_frequency.len() > self.max_tracked {
            self.url_frequency.shift_remove_index(0);
        }
    }

    /// Drops stale check records and stats for URLs that never produce duplicates.
    pub fn cleanup(&mut self, now: i64) {
        let expired_before = now - self.cooldown_ms * 3;
        self.url_checks
            .retain(|_, record| record.last_check_time >= expired_before);
        self.url_frequency.retain(|_, stats| {
            !(stats.check_count > UNINTERESTING_CHECK_COUNT && stats.duplicate_ratio == 0.0)
        });
    }

    /// Keeps only the `keep` most recently updated frequency entries.
    pub fn trim_frequency(&mut self, keep: usize) {
        if self.url_frequency.len() <= keep {
            return;
        }
        let mut recent: Vec<(String, UrlFrequencyStats)> = self.url_frequency.drain(..).collect();
        recent.sort_by(|a, b| b.1.last_updated.cmp(&a.1.last_updated));
        recent.truncate(keep);
        self.url_frequency = recent.into_iter().collect();
    }

    pub fn check_record(&self, url: &str) -> Option<&CheckRecord> {
        self.url_checks.get(url)
    }

    pub fn stats(&self, url: &str) -> Option<&UrlFrequencyStats> {
        self.url_frequency.get(url)
    }

    pub fn tracked_url_count(&self) -> usize {
        self.url_checks.len()
    }

    pub fn frequency_entry_count(&self) -> usize {
        self.url_frequency.len()
    }
}

impl Default for DuplicateCheckTracker {
    fn default() -> Self {
        Self::new()
    }
}
