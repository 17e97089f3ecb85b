//! Property-based tests for duplicate detection.
//!
//! For arbitrary tab strips: the reference tab is never reported, duplicate
//! relations are symmetric, and internal or new-tab pages never match.

use proptest::prelude::*;

use tabwarden::host::memory::InMemoryHost;
use tabwarden::host::TabHost;
use tabwarden::managers::notification_tracker::NotificationTracker;
use tabwarden::services::duplicate_scanner::{find_duplicates, is_valid_tab};
use tabwarden::services::url_normalizer::NormalizationCache;
use tabwarden::types::tab::TabId;

const NOW: i64 = 1_700_000_000_000;

/// A small pool of URLs, several of which normalize to the same value.
fn arb_tab_url() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "https://example.com/a",
        "https://www.example.com/a/",
        "https://example.com/a?utm_source=mail",
        "https://EXAMPLE.com/a#",
        "https://example.com/b",
        "https://example.com/b?id=1",
        "http://example.com/a",
        "https://other.org/",
        "chrome://settings",
        "chrome://newtab/",
        "about:blank",
        "",
    ])
    .prop_map(str::to_string)
}

fn arb_strip() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_tab_url(), 1..10)
}

fn build_host(urls: &[String]) -> (InMemoryHost, Vec<TabId>) {
    let mut host = InMemoryHost::new();
    let ids = urls.iter().map(|u| host.open_tab(u, false)).collect();
    (host, ids)
}

fn duplicates_of(host: &InMemoryHost, tab_id: TabId, url: &str) -> Vec<TabId> {
    let mut cache = NormalizationCache::new();
    let mut notifications = NotificationTracker::new();
    find_duplicates(host, &mut cache, &mut notifications, tab_id, url, NOW)
        .into_iter()
        .map(|t| t.id)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn reference_tab_never_reported(urls in arb_strip()) {
        let (host, ids) = build_host(&urls);
        for (id, url) in ids.iter().zip(&urls) {
            prop_assert!(!duplicates_of(&host, *id, url).contains(id));
        }
    }

    #[test]
    fn duplicate_relation_is_symmetric(urls in arb_strip()) {
        let (host, ids) = build_host(&urls);
        for (a, url_a) in ids.iter().zip(&urls) {
            for b in duplicates_of(&host, *a, url_a) {
                let idx = ids.iter().position(|id| *id == b).unwrap();
                prop_assert!(
                    duplicates_of(&host, b, &urls[idx]).contains(a),
                    "{} lists {} but not the reverse", url_a, urls[idx]
                );
            }
        }
    }

    #[test]
    fn internal_and_blank_tabs_never_match(urls in arb_strip()) {
        let (host, ids) = build_host(&urls);
        for (id, url) in ids.iter().zip(&urls) {
            for dup in duplicates_of(&host, *id, url) {
                let idx = ids.iter().position(|i| *i == dup).unwrap();
                let tab = host.get_tab(dup).unwrap();
                prop_assert!(is_valid_tab(&tab), "matched invalid tab {}", urls[idx]);
            }
        }
    }
}
