use serde::{Deserialize, Serialize};

/// User-configurable extension settings.
///
/// Stored in durable storage under [`SETTINGS_KEY`]. Missing fields take their
/// defaults, so settings written by older versions still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionSettings {
    pub enable_duplicate_check: bool,
    pub auto_close_detected_tabs: bool,
    pub show_tab_count_badge: bool,
    pub smart_tab_handling: bool,
    pub language: String,
    /// Search URL for dragged text; `{q}` is replaced by the encoded text.
    pub drag_search_engine: String,
}

/// Storage key holding the serialized [`ExtensionSettings`].
pub const SETTINGS_KEY: &str = "settings";

/// Search engine used for dragged text until the user picks another.
pub const DEFAULT_DRAG_SEARCH_ENGINE: &str = "https://www.google.com/search?q={q}";

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            enable_duplicate_check: true,
            auto_close_detected_tabs: false,
            show_tab_count_badge: true,
            smart_tab_handling: true,
            language: "en".to_string(),
            drag_search_engine: DEFAULT_DRAG_SEARCH_ENGINE.to_string(),
        }
    }
}

impl ExtensionSettings {
    /// True when notification text should be rendered in Chinese.
    pub fn prefers_chinese(&self) -> bool {
        self.language.to_lowercase().starts_with("zh")
    }

    /// Search URL for `text` built from [`Self::drag_search_engine`].
    ///
    /// An empty template falls back to [`DEFAULT_DRAG_SEARCH_ENGINE`].
    pub fn drag_search_url(&self, text: &str) -> String {
        let template = if self.drag_search_engine.trim().is_empty() {
            DEFAULT_DRAG_SEARCH_ENGINE
        } else {
            self.drag_search_engine.as_str()
        };
        let encoded: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();
        template.replacen("{q}", &encoded.replace('+', "%20"), 1)
    }
}

/// Delays and intervals driving the service's timers, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Trailing-edge debounce for duplicate checks.
    pub check_debounce_ms: i64,
    /// Trailing-edge debounce for the tab-count badge.
    pub badge_debounce_ms: i64,
    /// Delay before re-checking a freshly created tab.
    pub follow_up_delay_ms: i64,
    /// Window in which a freshly created tab counts as already checked.
    pub follow_up_cooldown_ms: i64,
    pub tracker_cleanup_interval_ms: i64,
    pub notification_cleanup_interval_ms: i64,
    /// Maximum age of a stored notification payload.
    pub stored_notification_ttl_ms: i64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            check_debounce_ms: 2_000,
            badge_debounce_ms: 100,
            follow_up_delay_ms: 2_000,
            follow_up_cooldown_ms: 5_000,
            tracker_cleanup_interval_ms: 60_000,
            notification_cleanup_interval_ms: 60 * 60 * 1000,
            stored_notification_ttl_ms: 60 * 60 * 1000,
        }
    }
}
