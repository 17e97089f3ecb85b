//! Finds open tabs that duplicate a reference URL.
//!
//! Two tabs are duplicates when their normalized URLs are string-equal. There
//! is no fuzzy matching.

use crate::host::TabHost;
use crate::managers::notification_tracker::NotificationTracker;
use crate::services::url_normalizer::NormalizationCache;
use crate::types::tab::{Tab, TabId};

/// Browser-internal schemes that are never scanned.
pub const INTERNAL_URL_PREFIXES: &[&str] = &["chrome://", "edge://", "about:"];

/// URLs the host uses for an empty new tab.
pub const NEW_TAB_URLS: &[&str] = &[
    "chrome://newtab/",
    "edge://newtab/",
    "about:newtab",
    "chrome://new-tab-page/",
    "about:blank",
];

pub fn is_internal_url(url: &str) -> bool {
    INTERNAL_URL_PREFIXES.iter().any(|p| url.starts_with(p))
}

pub fn is_new_tab_url(url: &str) -> bool {
    NEW_TAB_URLS.contains(&url)
}

/// A tab worth comparing: it has a URL and is not an internal or new-tab page.
pub fn is_valid_tab(tab: &Tab) -> bool {
    !tab.url.is_empty() && !is_internal_url(&tab.url) && !is_new_tab_url(&tab.url)
}

/// Tabs among `tabs` whose normalized URL equals `normalized`, skipping `exclude`.
pub fn matching_tabs(
    cache: &mut NormalizationCache,
    tabs: Vec<Tab>,
    normalized: &str,
    exclude: Option<TabId>,
    now: i64,
) -> Vec<Tab> {
    tabs.into_iter()
        .filter(|tab| Some(tab.id) != exclude && is_valid_tab(tab))
        .filter(|tab| cache.get_or_compute(&tab.url, now) == normalized)
        .collect()
}

/// Returns the other open tabs that duplicate `url`.
///
/// Empty for blank, internal, new-tab and ignored URLs. A failed tab
/// enumeration yields an empty result rather than an error.
pub fn find_duplicates<H: TabHost + ?Sized>(
    host: &H,
    cache: &mut NormalizationCache,
    notifications: &mut NotificationTracker,
    exclude_tab_id: TabId,
    url: &str,
    now: i64,
) -> Vec<Tab> {
    if url.is_empty() || is_internal_url(url) || is_new_tab_url(url) {
        return Vec::new();
    }
    if !notifications.should_check_url(cache, url, now) {
        tracing::debug!(tab_id = exclude_tab_id, url, "url ignored by user, skipping scan");
        return Vec::new();
    }

    let normalized = cache.get_or_compute(url, now);
    let tabs = match host.query_tabs() {
        Ok(tabs) => tabs,
        Err(e) => {
            tracing::warn!(error = %e, "failed to enumerate tabs for duplicate scan");
            return Vec::new();
        }
    };

    let duplicates = matching_tabs(cache, tabs, &normalized, Some(exclude_tab_id), now);
    tracing::debug!(count = duplicates.len(), normalized = %normalized, "duplicate scan finished");
    duplicates
}
