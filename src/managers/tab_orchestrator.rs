//! Opening tabs without piling up duplicates.
//!
//! Before creating a tab, look for one that already shows the requested page
//! (or an empty new-tab page) and switch to it instead.

use url::Url;

use crate::host::TabHost;
use crate::services::duplicate_scanner::{is_new_tab_url, is_valid_tab, matching_tabs};
use crate::services::url_normalizer::NormalizationCache;
use crate::types::errors::HostError;
use crate::types::settings::ExtensionSettings;
use crate::types::tab::{CreateTabOptions, Tab, TabId, TabUpdate, WindowUpdate};

/// Prefixes that mark a URL as already carrying a scheme.
const KNOWN_SCHEMES: &[&str] = &[
    "chrome-extension://",
    "chrome://",
    "edge://",
    "about:",
    "data:",
    "file://",
    "view-source:",
    "javascript:",
    "ftp://",
    "ws://",
    "wss://",
    "http://",
    "https://",
];

/// A requested URL after cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedUrl {
    /// No URL, or a new-tab page: open an empty tab.
    Empty,
    Url(String),
    Invalid(String),
}

/// What [`smart_create_tab`] ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum SmartCreateOutcome {
    ActivatedEmpty(TabId),
    CreatedEmpty(Tab),
    ActivatedExisting(TabId),
    /// Normalized-equal tabs existed: the first was kept, the others closed.
    ReusedDuplicate { kept: TabId, closed: Vec<TabId> },
    Created(Tab),
    Rejected(String),
    Failed(String),
}

/// Adds `https://` to scheme-less input, repairs extension URLs and validates.
pub fn prepare_url(raw: Option<&str>) -> PreparedUrl {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return PreparedUrl::Empty;
    };

    let lower = raw.to_lowercase();
    let mut url = if KNOWN_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    if let Some(rest) = url.strip_prefix("chrome-extension://") {
        if let Some((id, path)) = rest.split_once("//") {
            if !id.contains('/') {
                url = format!("chrome-extension://{}/{}", id, path);
            }
        }
    }

    if is_new_tab_url(&url) {
        return PreparedUrl::Empty;
    }

    match Url::parse(&url) {
        Ok(_) => PreparedUrl::Url(url),
        Err(e) => PreparedUrl::Invalid(format!("{}: {}", url, e)),
    }
}

/// Serialized URL with a bare trailing `#` removed, for exact comparison.
fn comparable_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;
    if url.fragment() == Some("") {
        url.set_fragment(None);
    }
    Some(url.to_string())
}

/// Activates `tab` and focuses its window. A vanished window is not an error.
pub fn activate_and_focus<H: TabHost + ?Sized>(host: &mut H, tab: &Tab) -> Result<(), HostError> {
    host.update_tab(tab.id, &TabUpdate::activate())?;
    if let Err(e) = host.update_window(tab.window_id, &WindowUpdate::focus()) {
        tracing::debug!(window_id = tab.window_id, error = %e, "could not focus window");
    }
    Ok(())
}

/// Activates an open new-tab page if there is one.
pub fn check_and_activate_empty_tab<H: TabHost + ?Sized>(host: &mut H) -> Option<TabId> {
    let tabs = match host.query_tabs() {
        Ok(tabs) => tabs,
        Err(e) => {
            tracing::warn!(error = %e, "failed to look for an empty tab");
            return None;
        }
    };
    let tab = tabs.into_iter().find(|t| is_new_tab_url(&t.url))?;
    match activate_and_focus(host, &tab) {
        Ok(()) => Some(tab.id),
        Err(e) => {
            tracing::warn!(tab_id = tab.id, error = %e, "failed to activate empty tab");
            None
        }
    }
}

/// Activates a tab already showing exactly `url` (ignoring a bare trailing `#`).
pub fn check_and_activate_existing_tab<H: TabHost + ?Sized>(host: &mut H, url: &str) -> Option<TabId> {
    if url.is_empty() || is_new_tab_url(url) {
        return check_and_activate_empty_tab(host);
    }
    let wanted = comparable_url(url)?;
    let tabs = match host.query_tabs() {
        Ok(tabs) => tabs,
        Err(e) => {
            tracing::warn!(error = %e, "failed to look for an existing tab");
            return None;
        }
    };
    let tab = tabs
        .into_iter()
        .filter(|t| !t.url.is_empty())
        .find(|t| comparable_url(&t.url).as_deref() == Some(wanted.as_str()))?;
    match activate_and_focus(host, &tab) {
        Ok(()) => Some(tab.id),
        Err(e) => {
            tracing::warn!(tab_id = tab.id, error = %e, "failed to activate existing tab");
            None
        }
    }
}

/// Position right of the most recently accessed tab.
pub fn recent_tab_right_index<H: TabHost + ?Sized>(host: &H) -> Option<usize> {
    let tabs = host.query_tabs().ok()?;
    tabs.iter()
        .max_by_key(|t| t.last_accessed)
        .map(|t| t.index + 1)
}

/// Creates a tab to the right of the most recently accessed one.
pub fn create_tab_with_recent_index<H: TabHost + ?Sized>(
    host: &mut H,
    url: Option<&str>,
    active: bool,
) -> Result<Tab, HostError> {
    let options = CreateTabOptions {
        url: url.map(str::to_string),
        active,
        index: recent_tab_right_index(host),
    };
    let tab = host.create_tab(&options)?;
    tracing::debug!(tab_id = tab.id, "created tab");
    Ok(tab)
}

/// Opens `url`, reusing an existing tab where possible.
pub fn smart_create_tab<H: TabHost + ?Sized>(
    host: &mut H,
    cache: &mut NormalizationCache,
    settings: &ExtensionSettings,
    url: Option<&str>,
    active: bool,
    now: i64,
) -> SmartCreateOutcome {
    let url = match prepare_url(url) {
        PreparedUrl::Empty => {
            if let Some(id) = check_and_activate_empty_tab(host) {
                return SmartCreateOutcome::ActivatedEmpty(id);
            }
            return match create_tab_with_recent_index(host, None, true) {
                Ok(tab) => SmartCreateOutcome::CreatedEmpty(tab),
                Err(e) => SmartCreateOutcome::Failed(e.to_string()),
            };
        }
        PreparedUrl::Invalid(reason) => {
            tracing::warn!(reason = %reason, "refusing to open invalid url");
            return SmartCreateOutcome::Rejected(reason);
        }
        PreparedUrl::Url(url) => url,
    };

    if let Some(id) = check_and_activate_existing_tab(host, &url) {
        return SmartCreateOutcome::ActivatedExisting(id);
    }

    if settings.enable_duplicate_check && settings.auto_close_detected_tabs {
        match reuse_normalized_duplicate(host, cache, &url, now) {
            Ok(Some(outcome)) => return outcome,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "auto-close lookup failed, creating tab"),
        }
    }

    match create_tab_with_recent_index(host, Some(&url), active) {
        Ok(tab) => SmartCreateOutcome::Created(tab),
        Err(e) => SmartCreateOutcome::Failed(e.to_string()),
    }
}

/// Keeps the first open tab normalized-equal to `url`, closes the rest, activates it.
fn reuse_normalized_duplicate<H: TabHost + ?Sized>(
    host: &mut H,
    cache: &mut NormalizationCache,
    url: &str,
    now: i64,
) -> Result<Option<SmartCreateOutcome>, HostError> {
    let normalized = cache.get_or_compute(url, now);
    let tabs: Vec<Tab> = host.query_tabs()?.into_iter().filter(is_valid_tab).collect();
    let mut matches = matching_tabs(cache, tabs, &normalized, None, now).into_iter();
    let Some(keep) = matches.next() else {
        return Ok(None);
    };
    let closed: Vec<TabId> = matches.map(|t| t.id).collect();
    if !closed.is_empty() {
        host.remove_tabs(&closed)?;
        tracing::info!(count = closed.len(), "auto-closed duplicate tabs");
    }
    activate_and_focus(host, &keep)?;
    Ok(Some(SmartCreateOutcome::ReusedDuplicate {
        kept: keep.id,
        closed,
    }))
}
