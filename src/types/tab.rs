use serde::{Deserialize, Serialize};

/// Host-assigned tab identifier.
pub type TabId = i64;

/// Host-assigned window identifier.
pub type WindowId = i64;

/// A browser tab as reported by the host. The host owns it; it can vanish at any time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Tab {
    pub id: TabId,
    pub index: usize,
    pub window_id: WindowId,
    /// Empty when the host has not reported a URL yet.
    pub url: String,
    pub title: String,
    pub active: bool,
    pub pinned: bool,
    pub muted: bool,
    pub fav_icon_url: Option<String>,
    /// Epoch milliseconds of the last time the tab was focused.
    pub last_accessed: i64,
}

/// Window presentation state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
}

/// A browser window as reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Window {
    pub id: WindowId,
    pub focused: bool,
    pub state: WindowState,
}

/// Options for creating a tab.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTabOptions {
    pub url: Option<String>,
    pub active: bool,
    pub index: Option<usize>,
}

/// Partial update applied to a tab. `None` fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TabUpdate {
    pub active: Option<bool>,
    pub pinned: Option<bool>,
    pub muted: Option<bool>,
    pub url: Option<String>,
}

impl TabUpdate {
    pub fn activate() -> Self {
        Self {
            active: Some(true),
            ..Self::default()
        }
    }
}

/// Partial update applied to a window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WindowUpdate {
    pub focused: Option<bool>,
    pub state: Option<WindowState>,
}

impl WindowUpdate {
    pub fn focus() -> Self {
        Self {
            focused: Some(true),
            state: None,
        }
    }
}

/// What changed in a `tabs.onUpdated` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TabChangeInfo {
    pub status: Option<String>,
    pub url: Option<String>,
}

impl TabChangeInfo {
    pub fn is_complete(&self) -> bool {
        self.status.as_deref() == Some("complete")
    }
}
