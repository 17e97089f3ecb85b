//! Message and event dispatch for the tabwarden stdio protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_message` answers action-tagged messages from UI scripts with a
//! `{success, error?}` object. `handle_event` mirrors browser tab events into
//! the in-memory host and forwards them to the background service.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::Background;
use crate::host::memory::InMemoryHost;
use crate::host::TabHost;
use crate::managers::tab_orchestrator::SmartCreateOutcome;
use crate::types::errors::NotificationError;
use crate::types::tab::{Tab, TabChangeInfo, TabId};

/// Actions answered with network access, outside the background lock.
pub const NETWORK_ACTIONS: &[&str] = &["resolveRedirectUrl", "fetchUrlContent"];

pub fn is_network_action(action: &str) -> bool {
    NETWORK_ACTIONS.contains(&action)
}

fn failure(error: impl std::fmt::Display) -> Value {
    json!({"success": false, "error": error.to_string()})
}

fn str_param<'a>(message: &'a Value, key: &str) -> Option<&'a str> {
    message.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Dispatch one inbound message to the background service.
///
/// Always returns a response object; failures are reported in it rather than as errors.
pub fn handle_message<H: TabHost>(app: &Mutex<Background<H>>, message: &Value) -> Value {
    let action = message.get("action").and_then(Value::as_str).unwrap_or("");
    let mut bg = match app.lock() {
        Ok(bg) => bg,
        Err(e) => return failure(e),
    };

    match action {
        "ping" => json!({"success": true, "message": "pong"}),

        // ─── Duplicate notifications ───
        "closeDuplicateTabs" => {
            let Some(id) = str_param(message, "notificationId") else {
                return failure("missing notificationId");
            };
            match bg.close_duplicate_tabs(id) {
                Ok(closed) => json!({"success": true, "closed": closed}),
                Err(NotificationError::NotFound(_)) => failure("notification data not found"),
                Err(e) => {
                    tracing::warn!(notification_id = id, error = %e, "closing duplicates failed");
                    failure(e)
                }
            }
        }
        "ignoreDuplicateTabs" => {
            if let Some(id) = str_param(message, "notificationId") {
                bg.ignore_duplicate_tabs(id);
            }
            json!({"success": true})
        }

        // ─── Tab opening ───
        "openInNewTab" => {
            let Some(url) = str_param(message, "url") else {
                return failure("missing url");
            };
            match bg.open_in_new_tab(url) {
                Ok(tab) => json!({"success": true, "tabId": tab.id}),
                Err(e) => failure(e),
            }
        }
        "openTabInBackground" => {
            if let Some(url) = str_param(message, "url") {
                let outcome = bg.smart_create_tab(Some(url), false);
                tracing::debug!(?outcome, "background tab request handled");
            }
            json!({"success": true})
        }
        "openNewTab" => match bg.smart_create_tab(None, true) {
            SmartCreateOutcome::Failed(e) => failure(e),
            _ => json!({"success": true}),
        },
        "superDrag" => {
            // Drags open in the background unless the page asks otherwise.
            let foreground = message.get("actionType").and_then(Value::as_str) == Some("foreground");
            let kind = message.get("type").and_then(Value::as_str).unwrap_or("");
            let target = match kind {
                "text" => match str_param(message, "text") {
                    Some(text) => bg.settings().drag_search_url(text),
                    None => return failure("missing text"),
                },
                "link" | "image" => match str_param(message, "url") {
                    Some(url) => url.to_string(),
                    None => return failure("missing url"),
                },
                other => return failure(format!("unsupported drag type: {}", other)),
            };
            match bg.smart_create_tab(Some(&target), foreground) {
                SmartCreateOutcome::Rejected(e) | SmartCreateOutcome::Failed(e) => {
                    tracing::debug!(kind, url = %target, error = %e, "drag not opened");
                    failure(e)
                }
                outcome => {
                    tracing::debug!(kind, ?outcome, "drag handled");
                    json!({"success": true})
                }
            }
        }

        // ─── Cache ───
        "getCacheStats" => json!({"success": true, "stats": bg.cache_stats()}),
        "clearUrlCache" => {
            bg.clear_url_cache();
            json!({"success": true})
        }

        // ─── Settings ───
        "getSettings" => json!({"success": true, "settings": bg.settings()}),
        "updateSetting" => {
            let Some(key) = str_param(message, "key") else {
                return failure("missing key");
            };
            let value = message.get("value").cloned().unwrap_or(Value::Null);
            match bg.update_setting(key, value) {
                Ok(()) => json!({"success": true}),
                Err(e) => failure(e),
            }
        }
        "settingsUpdated" => match bg.reload_settings() {
            Ok(()) => json!({"success": true}),
            Err(e) => failure(e),
        },

        a if is_network_action(a) => failure(format!("action requires network access: {}", a)),
        other => failure(format!("unknown action: {}", other)),
    }
}

fn tab_param(params: &Value) -> Result<Tab, String> {
    let raw = params.get("tab").cloned().ok_or("missing tab")?;
    serde_json::from_value(raw).map_err(|e| format!("invalid tab: {}", e))
}

fn tab_id_param(params: &Value) -> Result<TabId, String> {
    params
        .get("tabId")
        .and_then(Value::as_i64)
        .ok_or_else(|| "missing tabId".to_string())
}

/// Applies a browser event to the mirrored tab strip and the background service.
pub fn handle_event(
    app: &Mutex<Background<InMemoryHost>>,
    event: &str,
    params: &Value,
) -> Result<Value, String> {
    let mut bg = app.lock().map_err(|e| e.to_string())?;
    match event {
        "tabsSnapshot" => {
            let tabs: Vec<Tab> = serde_json::from_value(params.get("tabs").cloned().unwrap_or(json!([])))
                .map_err(|e| format!("invalid tabs: {}", e))?;
            let ids: Vec<TabId> = tabs.iter().map(|t| t.id).collect();
            for tab in tabs {
                bg.host_mut().upsert_tab(tab);
            }
            // A snapshot lists the whole strip.
            let pruned = bg.host_mut().retain_tabs(&ids);
            for tab_id in &pruned {
                bg.on_tab_removed(*tab_id);
            }
            bg.schedule_badge_update();
            Ok(json!({"ok": true, "tabs": ids.len(), "pruned": pruned.len()}))
        }
        "tabCreated" => {
            let tab = tab_param(params)?;
            bg.host_mut().upsert_tab(tab.clone());
            bg.on_tab_created(&tab);
            Ok(json!({"ok": true}))
        }
        "tabUpdated" => {
            let tab_id = tab_id_param(params)?;
            let tab = tab_param(params)?;
            let change: TabChangeInfo =
                serde_json::from_value(params.get("changeInfo").cloned().unwrap_or(json!({})))
                    .map_err(|e| format!("invalid changeInfo: {}", e))?;
            bg.host_mut().upsert_tab(tab.clone());
            bg.on_tab_updated(tab_id, &change, &tab);
            Ok(json!({"ok": true}))
        }
        "tabActivated" => {
            let tab_id = tab_id_param(params)?;
            if let Err(e) = bg.host_mut().mark_active(tab_id) {
                tracing::debug!(tab_id, error = %e, "activated tab not mirrored yet");
            }
            bg.on_tab_activated(tab_id);
            Ok(json!({"ok": true}))
        }
        "tabRemoved" => {
            let tab_id = tab_id_param(params)?;
            bg.host_mut().forget_tab(tab_id);
            bg.on_tab_removed(tab_id);
            Ok(json!({"ok": true}))
        }
        "browserStartup" => {
            bg.on_browser_startup();
            Ok(json!({"ok": true}))
        }
        "installed" => {
            bg.on_installed();
            Ok(json!({"ok": true}))
        }
        _ => Err(format!("unknown event: {}", event)),
    }
}
