use tabwarden::types::errors::*;

// === HostError Tests ===

#[test]
fn host_error_tab_not_found_display() {
    let err = HostError::TabNotFound(42);
    assert_eq!(err.to_string(), "No tab with id: 42");
}

#[test]
fn host_error_message_undeliverable_display() {
    let err = HostError::MessageUndeliverable {
        tab_id: 7,
        reason: "no receiver".to_string(),
    };
    assert_eq!(err.to_string(), "Could not deliver message to tab 7: no receiver");
}

#[test]
fn host_error_is_gone_only_for_missing_targets() {
    assert!(HostError::TabNotFound(1).is_gone());
    assert!(HostError::WindowNotFound(1).is_gone());
    assert!(!HostError::CallFailed("quota".to_string()).is_gone());
    assert!(!HostError::MessageUndeliverable { tab_id: 1, reason: String::new() }.is_gone());
}

#[test]
fn host_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(HostError::TabNotFound(3));
    assert!(err.source().is_none());
}

// === StorageError Tests ===

#[test]
fn storage_error_from_serde_json() {
    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: StorageError = json_err.into();
    assert!(matches!(err, StorageError::Serialization(_)));
    assert!(err.to_string().starts_with("Storage serialization error:"));
}

#[test]
fn storage_error_from_rusqlite() {
    let err: StorageError = rusqlite::Error::InvalidQuery.into();
    assert!(matches!(err, StorageError::Database(_)));
}

#[test]
fn storage_error_unavailable_display() {
    assert_eq!(
        StorageError::Unavailable("session".to_string()).to_string(),
        "Storage area unavailable: session"
    );
}

// === SettingsError Tests ===

#[test]
fn settings_error_wraps_storage_error() {
    let err: SettingsError = StorageError::Unavailable("disk".to_string()).into();
    assert!(matches!(err, SettingsError::Storage(_)));
    assert_eq!(
        err.to_string(),
        "Settings storage error: Storage area unavailable: disk"
    );
}

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::InvalidKey("foo".to_string()).to_string(),
        "Invalid settings key: foo"
    );
    assert_eq!(
        SettingsError::InvalidValue("bar".to_string()).to_string(),
        "Invalid settings value: bar"
    );
}

// === ResolveError Tests ===

#[test]
fn resolve_error_display_variants() {
    assert_eq!(
        ResolveError::UnsupportedScheme("ftp".to_string()).to_string(),
        "Unsupported URL scheme: ftp"
    );
    assert_eq!(
        ResolveError::Network("timeout".to_string()).to_string(),
        "Network error: timeout"
    );
}

// === NotificationError Tests ===

#[test]
fn notification_error_not_found_display() {
    let err = NotificationError::NotFound("duplicate-tabs-1-2".to_string());
    assert_eq!(err.to_string(), "notification data not found: duplicate-tabs-1-2");
}

#[test]
fn notification_error_is_transparent_over_host_error() {
    let err: NotificationError = HostError::TabNotFound(9).into();
    assert_eq!(err.to_string(), "No tab with id: 9");
}
