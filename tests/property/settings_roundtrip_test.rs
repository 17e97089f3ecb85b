//! Property-based tests for ExtensionSettings serialization round-trip.
//!
//! These tests verify that ExtensionSettings survive being written to and read
//! back from storage for arbitrary valid inputs.

use proptest::prelude::*;

use tabwarden::host::memory::MemoryStorage;
use tabwarden::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use tabwarden::types::settings::ExtensionSettings;

fn arb_language() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("en".to_string()),
        Just("zh_CN".to_string()),
        Just("zh_TW".to_string()),
        "[a-z]{2}(_[A-Z]{2})?",
    ]
}

fn arb_search_engine() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("https://www.google.com/search?q={q}".to_string()),
        Just("https://www.bing.com/search?q={q}".to_string()),
        "https://[a-z]{3,8}\\.com/\\?q=\\{q\\}",
    ]
}

fn arb_extension_settings() -> impl Strategy<Value = ExtensionSettings> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        arb_language(),
        arb_search_engine(),
    )
        .prop_map(
            |(
                enable_duplicate_check,
                auto_close_detected_tabs,
                show_tab_count_badge,
                smart_tab_handling,
                language,
                drag_search_engine,
            )| {
                ExtensionSettings {
                    enable_duplicate_check,
                    auto_close_detected_tabs,
                    show_tab_count_badge,
                    smart_tab_handling,
                    language,
                    drag_search_engine,
                }
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn settings_serialization_roundtrip(settings in arb_extension_settings()) {
        let json = serde_json::to_string(&settings).unwrap();
        let back: ExtensionSettings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(settings, back);
    }

    #[test]
    fn settings_storage_roundtrip(settings in arb_extension_settings()) {
        let mut storage = MemoryStorage::new();
        let engine = SettingsEngine::with_settings(settings.clone());
        engine.save(&mut storage).unwrap();

        let mut reloaded = SettingsEngine::new();
        let loaded = reloaded.load(&storage).unwrap();
        prop_assert_eq!(loaded, settings);
    }
}
