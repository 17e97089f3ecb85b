//! In-memory host for tests and for the stdio bridge.
//!
//! `InMemoryHost` mirrors the browser's tab strip. Every mutation the core
//! requests is applied locally and journaled as a [`HostCommand`] so a bridge
//! can replay it against the real browser.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{StorageArea, TabHost};
use crate::types::errors::{HostError, StorageError};
use crate::types::tab::{
    CreateTabOptions, Tab, TabId, TabUpdate, Window, WindowId, WindowUpdate,
};

/// URL given to tabs created without one.
pub const DEFAULT_NEW_TAB_URL: &str = "chrome://newtab/";

/// A host mutation requested by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum HostCommand {
    #[serde(rename_all = "camelCase")]
    CreateTab { tab: Tab },
    #[serde(rename_all = "camelCase")]
    UpdateTab { tab_id: TabId, update: TabUpdate },
    #[serde(rename_all = "camelCase")]
    RemoveTabs { tab_ids: Vec<TabId> },
    #[serde(rename_all = "camelCase")]
    UpdateWindow { window_id: WindowId, update: WindowUpdate },
    #[serde(rename_all = "camelCase")]
    SendMessage { tab_id: TabId, message: Value },
    #[serde(rename_all = "camelCase")]
    SetBadge { text: String, color: Option<String> },
}

/// In-memory tab strip implementing [`TabHost`].
pub struct InMemoryHost {
    tabs: Vec<Tab>,
    windows: Vec<Window>,
    next_tab_id: TabId,
    access_seq: i64,
    commands: Vec<HostCommand>,
    badge_text: String,
    fail_removals: bool,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            windows: vec![Window {
                id: 1,
                focused: true,
                ..Window::default()
            }],
            next_tab_id: 1,
            access_seq: 0,
            commands: Vec::new(),
            badge_text: String::new(),
            fail_removals: false,
        }
    }

    /// Opens a tab at the end of the first window and returns its ID.
    pub fn open_tab(&mut self, url: &str, active: bool) -> TabId {
        let options = CreateTabOptions {
            url: Some(url.to_string()),
            active,
            index: None,
        };
        let tab = self.insert_new_tab(&options);
        tab.id
    }

    /// Inserts or replaces a tab reported by the real browser.
    pub fn upsert_tab(&mut self, tab: Tab) {
        if !self.windows.iter().any(|w| w.id == tab.window_id) {
            self.windows.push(Window {
                id: tab.window_id,
                ..Window::default()
            });
        }
        if tab.id >= self.next_tab_id {
            self.next_tab_id = tab.id + 1;
        }
        if tab.active {
            self.deactivate_window(tab.window_id);
        }
        match self.find_tab_index(tab.id) {
            Some(idx) => self.tabs[idx] = tab,
            None => self.tabs.push(tab),
        }
        self.reindex();
    }

    /// Drops a tab the real browser reported as closed. No command is journaled.
    pub fn forget_tab(&mut self, tab_id: TabId) {
        self.detach_tab(tab_id);
    }

    /// Drops every mirrored tab not in `keep` and returns the dropped IDs.
    pub fn retain_tabs(&mut self, keep: &[TabId]) -> Vec<TabId> {
        let stale: Vec<TabId> = self
            .tabs
            .iter()
            .map(|t| t.id)
            .filter(|id| !keep.contains(id))
            .collect();
        for id in &stale {
            self.detach_tab(*id);
        }
        stale
    }

    /// Marks a tab active without journaling a command.
    pub fn mark_active(&mut self, tab_id: TabId) -> Result<(), HostError> {
        let idx = self
            .find_tab_index(tab_id)
            .ok_or(HostError::TabNotFound(tab_id))?;
        let window_id = self.tabs[idx].window_id;
        self.deactivate_window(window_id);
        self.access_seq += 1;
        self.tabs[idx].active = true;
        self.tabs[idx].last_accessed = self.access_seq;
        Ok(())
    }

    /// Makes every subsequent `remove_tabs` call fail.
    pub fn set_fail_removals(&mut self, fail: bool) {
        self.fail_removals = fail;
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn has_tab(&self, tab_id: TabId) -> bool {
        self.find_tab_index(tab_id).is_some()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.active)
    }

    pub fn badge_text(&self) -> &str {
        &self.badge_text
    }

    /// Commands journaled since the last drain.
    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Messages sent to `tab_id`, oldest first.
    pub fn messages_for(&self, tab_id: TabId) -> Vec<&Value> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                HostCommand::SendMessage { tab_id: id, message } if *id == tab_id => {
                    Some(message)
                }
                _ => None,
            })
            .collect()
    }

    fn find_tab_index(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    fn focused_window_id(&self) -> WindowId {
        self.windows
            .iter()
            .find(|w| w.focused)
            .or_else(|| self.windows.first())
            .map(|w| w.id)
            .unwrap_or(1)
    }

    fn deactivate_window(&mut self, window_id: WindowId) {
        for tab in self.tabs.iter_mut().filter(|t| t.window_id == window_id) {
            tab.active = false;
        }
    }

    /// Recomputes each tab's position within its window.
    fn reindex(&mut self) {
        let mut counters: BTreeMap<WindowId, usize> = BTreeMap::new();
        for tab in self.tabs.iter_mut() {
            let counter = counters.entry(tab.window_id).or_insert(0);
            tab.index = *counter;
            *counter += 1;
        }
    }

    fn insert_new_tab(&mut self, options: &CreateTabOptions) -> Tab {
        let window_id = self.focused_window_id();
        let id = self.next_tab_id;
        self.next_tab_id += 1;
        self.access_seq += 1;

        let url = options
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_NEW_TAB_URL.to_string());
        let window_has_active = self
            .tabs
            .iter()
            .any(|t| t.window_id == window_id && t.active);
        let active = options.active || !window_has_active;
        if active {
            self.deactivate_window(window_id);
        }

        let tab = Tab {
            id,
            index: 0,
            window_id,
            title: url.clone(),
            url,
            active,
            pinned: false,
            muted: false,
            fav_icon_url: None,
            last_accessed: self.access_seq,
        };

        // Translate the per-window index into a position in the flat list.
        let position = match options.index {
            Some(window_index) => self
                .tabs
                .iter()
                .enumerate()
                .filter(|(_, t)| t.window_id == window_id)
                .nth(window_index)
                .map(|(pos, _)| pos)
                .unwrap_or(self.tabs.len()),
            None => self.tabs.len(),
        };
        self.tabs.insert(position, tab);
        self.reindex();
        self.tabs[position].clone()
    }

    /// Removes a tab and hands activation to its nearest neighbour in the same window.
    fn detach_tab(&mut self, tab_id: TabId) {
        let Some(idx) = self.find_tab_index(tab_id) else {
            return;
        };
        let removed = self.tabs.remove(idx);
        if removed.active {
            let neighbour = self
                .tabs
                .iter()
                .enumerate()
                .filter(|(_, t)| t.window_id == removed.window_id)
                .min_by_key(|(pos, _)| (*pos as i64 - idx as i64).abs())
                .map(|(pos, _)| pos);
            if let Some(pos) = neighbour {
                self.tabs[pos].active = true;
            }
        }
        self.reindex();
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TabHost for InMemoryHost {
    fn query_tabs(&self) -> Result<Vec<Tab>, HostError> {
        Ok(self.tabs.clone())
    }

    fn get_tab(&self, tab_id: TabId) -> Result<Tab, HostError> {
        self.tabs
            .iter()
            .find(|t| t.id == tab_id)
            .cloned()
            .ok_or(HostError::TabNotFound(tab_id))
    }

    fn update_tab(&mut self, tab_id: TabId, update: &TabUpdate) -> Result<Tab, HostError> {
        let idx = self
            .find_tab_index(tab_id)
            .ok_or(HostError::TabNotFound(tab_id))?;
        if update.active == Some(true) {
            self.mark_active(tab_id)?;
        }
        let tab = &mut self.tabs[idx];
        if let Some(pinned) = update.pinned {
            tab.pinned = pinned;
        }
        if let Some(muted) = update.muted {
            tab.muted = muted;
        }
        if let Some(url) = &update.url {
            tab.url = url.clone();
        }
        let snapshot = tab.clone();
        self.commands.push(HostCommand::UpdateTab {
            tab_id,
            update: update.clone(),
        });
        Ok(snapshot)
    }

    fn remove_tabs(&mut self, tab_ids: &[TabId]) -> Result<(), HostError> {
        if self.fail_removals {
            return Err(HostError::CallFailed("tab removal rejected".to_string()));
        }
        if let Some(missing) = tab_ids.iter().find(|id| !self.has_tab(**id)) {
            return Err(HostError::TabNotFound(*missing));
        }
        for id in tab_ids {
            self.detach_tab(*id);
        }
        self.commands.push(HostCommand::RemoveTabs {
            tab_ids: tab_ids.to_vec(),
        });
        Ok(())
    }

    fn create_tab(&mut self, options: &CreateTabOptions) -> Result<Tab, HostError> {
        let tab = self.insert_new_tab(options);
        self.commands.push(HostCommand::CreateTab { tab: tab.clone() });
        Ok(tab)
    }

    fn get_window(&self, window_id: WindowId) -> Result<Window, HostError> {
        self.windows
            .iter()
            .find(|w| w.id == window_id)
            .cloned()
            .ok_or(HostError::WindowNotFound(window_id))
    }

    fn update_window(
        &mut self,
        window_id: WindowId,
        update: &WindowUpdate,
    ) -> Result<Window, HostError> {
        if !self.windows.iter().any(|w| w.id == window_id) {
            return Err(HostError::WindowNotFound(window_id));
        }
        if update.focused == Some(true) {
            for window in self.windows.iter_mut() {
                window.focused = window.id == window_id;
            }
        }
        let window = self
            .windows
            .iter_mut()
            .find(|w| w.id == window_id)
            .ok_or(HostError::WindowNotFound(window_id))?;
        if let Some(state) = update.state {
            window.state = state;
        }
        let snapshot = window.clone();
        self.commands.push(HostCommand::UpdateWindow {
            window_id,
            update: update.clone(),
        });
        Ok(snapshot)
    }

    fn send_message(&mut self, tab_id: TabId, message: &Value) -> Result<(), HostError> {
        let tab = self.get_tab(tab_id)?;
        if crate::services::duplicate_scanner::is_internal_url(&tab.url) {
            return Err(HostError::MessageUndeliverable {
                tab_id,
                reason: format!("cannot script internal page {}", tab.url),
            });
        }
        self.commands.push(HostCommand::SendMessage {
            tab_id,
            message: message.clone(),
        });
        Ok(())
    }

    fn set_badge(&mut self, text: &str, color: Option<&str>) -> Result<(), HostError> {
        self.badge_text = text.to_string();
        self.commands.push(HostCommand::SetBadge {
            text: text.to_string(),
            color: color.map(str::to_string),
        });
        Ok(())
    }
}

/// A storage area held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, Value>,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage area whose every call fails, for exercising fallback paths.
    pub fn unavailable() -> Self {
        Self {
            entries: BTreeMap::new(),
            unavailable: true,
        }
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("memory storage disabled".to_string()));
        }
        Ok(())
    }
}

impl StorageArea for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        self.check()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.check()?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.check()?;
        Ok(self.entries.keys().cloned().collect())
    }
}
