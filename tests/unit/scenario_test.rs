//! End-to-end scenarios over the background service.
//!
//! Each test drives the service only through tab events, timer polls and UI
//! messages, then inspects what reached the in-memory host.

use std::sync::Mutex;

use serde_json::{json, Value};

use tabwarden::app::{Background, CheckOutcome};
use tabwarden::host::memory::{HostCommand, InMemoryHost};
use tabwarden::host::{ManualClock, StorageAreas};
use tabwarden::managers::notification_tracker::EXPIRY_MS;
use tabwarden::managers::tab_orchestrator::SmartCreateOutcome;
use tabwarden::rpc_handler::handle_message;
use tabwarden::types::tab::TabId;

const START: i64 = 1_700_000_000_000;
const PAGE: &str = "https://www.example.com/page?utm_source=ads";

fn background() -> (Background<InMemoryHost>, ManualClock) {
    let clock = ManualClock::new(START);
    let mut bg = Background::new(InMemoryHost::new(), StorageAreas::in_memory(), Box::new(clock.clone()));
    bg.startup();
    (bg, clock)
}

/// Notification payloads of the given kind delivered to `tab_id`.
fn messages(bg: &Background<InMemoryHost>, tab_id: TabId, action: &str) -> Vec<Value> {
    bg.host()
        .messages_for(tab_id)
        .into_iter()
        .filter(|m| m["action"] == json!(action))
        .map(|m| m["data"].clone())
        .collect()
}

fn sent_anywhere(bg: &Background<InMemoryHost>, action: &str) -> bool {
    bg.host().commands().iter().any(|c| {
        matches!(c, HostCommand::SendMessage { message, .. } if message["action"] == json!(action))
    })
}

/// Two tabs on the same page: activating one notifies, and "close" removes the other.
#[test]
fn test_duplicate_notification_then_close() {
    let (mut bg, clock) = background();
    let first = bg.host_mut().open_tab(PAGE, true);
    let second = bg.host_mut().open_tab(PAGE, true);

    bg.on_tab_activated(second);
    clock.advance(1_999);
    bg.poll_timers();
    assert!(messages(&bg, second, "showDuplicateTabsNotification").is_empty());

    clock.advance(1);
    bg.poll_timers();
    let shown = messages(&bg, second, "showDuplicateTabsNotification");
    assert_eq!(shown.len(), 1);
    let data = &shown[0];
    assert_eq!(data["count"], json!(1));
    assert_eq!(data["domain"], json!("www.example.com"));
    assert_eq!(data["summary"], json!("Found 1 duplicate tab"));
    assert_eq!(data["duplicateUrls"], json!([PAGE]));
    let notification_id = data["notificationId"].as_str().unwrap().to_string();
    assert_eq!(notification_id, format!("duplicate-tabs-{}-{}", second, START + 2_000));

    let app = Mutex::new(bg);
    let response = handle_message(
        &app,
        &json!({"action": "closeDuplicateTabs", "notificationId": notification_id}),
    );
    assert_eq!(response, json!({"success": true, "closed": 1}));

    let bg = app.into_inner().unwrap();
    assert!(!bg.host().has_tab(first));
    assert_eq!(bg.host().active_tab().map(|t| t.id), Some(second));
    assert_eq!(bg.notifications().record(PAGE).unwrap().responses.close, 1);
    assert!(bg.storage().durable.get(&notification_id).unwrap().is_none());
}

/// "Ignore" silences the page for 24 hours, including its tracking-free variants.
#[test]
fn test_ignore_silences_url_for_a_day() {
    let (mut bg, clock) = background();
    bg.host_mut().open_tab(PAGE, false);
    let reference = bg.host_mut().open_tab(PAGE, true);

    let CheckOutcome::Notified(id) = bg.check_tab_duplicates(reference, true) else {
        panic!("expected a notification");
    };
    bg.ignore_duplicate_tabs(&id);
    assert!(bg.storage().durable.get(&id).unwrap().is_none());
    assert_eq!(bg.notifications().record(PAGE).unwrap().responses.ignore, 1);

    clock.advance(60 * 60 * 1000);
    assert_eq!(bg.check_tab_duplicates(reference, true), CheckOutcome::Ignored);
    let variant = bg.host_mut().open_tab("https://example.com/page/", true);
    assert_eq!(bg.check_tab_duplicates(variant, true), CheckOutcome::Ignored);

    clock.set(START + EXPIRY_MS + 1);
    assert!(matches!(bg.check_tab_duplicates(reference, true), CheckOutcome::Notified(_)));
}

/// With auto-close on, opening a page that is already open switches to it.
#[test]
fn test_auto_close_reuses_open_tab() {
    let (mut bg, _) = background();
    bg.update_setting("autoCloseDetectedTabs", json!(true)).unwrap();
    let existing = bg.host_mut().open_tab(PAGE, false);
    bg.host_mut().open_tab("https://crates.io/", true);

    let outcome = bg.smart_create_tab(Some("https://example.com/page"), true);

    assert_eq!(
        outcome,
        SmartCreateOutcome::ReusedDuplicate { kept: existing, closed: vec![] }
    );
    assert_eq!(bg.host().tab_count(), 2);
    assert_eq!(bg.host().active_tab().map(|t| t.id), Some(existing));
    assert_eq!(bg.pending_follow_ups(), 0);
    assert!(!sent_anywhere(&bg, "showDuplicateTabsNotification"));
}

/// With auto-close on, a check closes duplicates and reports it to the kept tab.
#[test]
fn test_auto_close_on_check() {
    let (mut bg, _) = background();
    bg.update_setting("autoCloseDetectedTabs", json!(true)).unwrap();
    let older = bg.host_mut().open_tab(PAGE, false);
    let current = bg.host_mut().open_tab("https://example.com/page", true);

    assert_eq!(bg.check_tab_duplicates(current, true), CheckOutcome::AutoClosed(vec![older]));

    assert!(!bg.host().has_tab(older));
    let reports = messages(&bg, current, "showAutoCloseSuccessNotification");
    assert_eq!(reports, vec![json!({"count": 1, "titles": [PAGE]})]);
    assert!(!sent_anywhere(&bg, "showDuplicateTabsNotification"));
}

/// A failed auto-close falls back to asking the user.
#[test]
fn test_auto_close_failure_notifies_instead() {
    let (mut bg, _) = background();
    bg.update_setting("autoCloseDetectedTabs", json!(true)).unwrap();
    bg.host_mut().open_tab(PAGE, false);
    let current = bg.host_mut().open_tab(PAGE, true);
    bg.host_mut().set_fail_removals(true);

    assert!(matches!(bg.check_tab_duplicates(current, true), CheckOutcome::Notified(_)));
}

/// A tab opened through smart creation is re-checked once it has loaded.
#[test]
fn test_new_tab_follow_up_check() {
    let (mut bg, clock) = background();
    let existing = bg.host_mut().open_tab(PAGE, true);

    let SmartCreateOutcome::Created(tab) = bg.smart_create_tab(Some("https://example.com/page"), true) else {
        panic!("expected a new tab");
    };
    assert_eq!(bg.pending_follow_ups(), 1);

    clock.advance(1_999);
    bg.poll_timers();
    assert!(messages(&bg, tab.id, "showDuplicateTabsNotification").is_empty());

    clock.advance(1);
    bg.poll_timers();
    let shown = messages(&bg, tab.id, "showDuplicateTabsNotification");
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0]["duplicateUrls"], json!([PAGE]));
    assert_eq!(bg.pending_follow_ups(), 0);
    assert!(bg.host().has_tab(existing));
}

/// Repeated loads of one page are throttled, activations are not.
#[test]
fn test_unimportant_checks_are_throttled() {
    let (mut bg, clock) = background();
    let tab = bg.host_mut().open_tab("https://example.com/solo", true);

    assert_eq!(bg.check_tab_duplicates(tab, false), CheckOutcome::NoDuplicates);
    clock.advance(1_000);
    assert_eq!(bg.check_tab_duplicates(tab, false), CheckOutcome::Throttled);
    assert_eq!(bg.check_tab_duplicates(tab, true), CheckOutcome::NoDuplicates);
}

/// Disabling duplicate checks stops scans entirely.
#[test]
fn test_disabled_duplicate_check() {
    let (mut bg, _) = background();
    bg.update_setting("enableDuplicateCheck", json!(false)).unwrap();
    bg.host_mut().open_tab(PAGE, false);
    let current = bg.host_mut().open_tab(PAGE, true);

    assert_eq!(bg.check_tab_duplicates(current, true), CheckOutcome::Disabled);
    assert_eq!(bg.check_tab_duplicates(999, true), CheckOutcome::Disabled);
}

/// A closed tab loses its per-tab cooldown.
#[test]
fn test_removed_tab_forgets_cooldown() {
    let (mut bg, _) = background();
    bg.host_mut().open_tab(PAGE, false);
    let current = bg.host_mut().open_tab(PAGE, true);
    assert!(matches!(bg.check_tab_duplicates(current, true), CheckOutcome::Notified(_)));
    assert!(bg.notifications().tab_last_notified(current).is_some());

    bg.host_mut().forget_tab(current);
    bg.on_tab_removed(current);

    assert!(bg.notifications().tab_last_notified(current).is_none());
    assert_eq!(bg.check_tab_duplicates(current, true), CheckOutcome::TabGone);
}
