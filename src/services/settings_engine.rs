// tabwarden Settings Engine
// Manages extension settings: loading, saving, updating individual values, and resetting to defaults.
// Settings are stored as one JSON value in the durable storage area.

use crate::host::StorageArea;
use crate::types::errors::SettingsError;
use crate::types::settings::{ExtensionSettings, SETTINGS_KEY};

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self, storage: &dyn StorageArea) -> Result<ExtensionSettings, SettingsError>;
    fn save(&self, storage: &mut dyn StorageArea) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ExtensionSettings;
    fn set_value(
        &mut self,
        storage: &mut dyn StorageArea,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), SettingsError>;
    fn reset(&mut self, storage: &mut dyn StorageArea) -> Result<(), SettingsError>;
}

/// Settings engine keeping the typed settings in memory and persisting them on change.
#[derive(Debug, Default)]
pub struct SettingsEngine {
    settings: ExtensionSettings,
}

impl SettingsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ExtensionSettings) -> Self {
        Self { settings }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from storage.
    ///
    /// Missing settings yield the defaults. Malformed settings are a serialization error
    /// and leave the in-memory settings untouched.
    fn load(&mut self, storage: &dyn StorageArea) -> Result<ExtensionSettings, SettingsError> {
        let Some(value) = storage.get(SETTINGS_KEY)? else {
            self.settings = ExtensionSettings::default();
            return Ok(self.settings.clone());
        };

        let settings: ExtensionSettings = serde_json::from_value(value).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse stored settings: {}", e))
        })?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    fn save(&self, storage: &mut dyn StorageArea) -> Result<(), SettingsError> {
        let json = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        storage.set(SETTINGS_KEY, json)?;
        Ok(())
    }

    fn get_settings(&self) -> &ExtensionSettings {
        &self.settings
    }

    /// Updates one setting by its stored (camelCase) key and persists.
    ///
    /// The new value is validated by deserializing the whole settings object, so a
    /// wrongly typed value is rejected and nothing changes.
    ///
    /// # Examples
    /// - `"autoCloseDetectedTabs"` → `true`
    /// - `"language"` → `"zh_CN"`
    fn set_value(
        &mut self,
        storage: &mut dyn StorageArea,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        match json_value.as_object_mut() {
            Some(map) if map.contains_key(key) => {
                map.insert(key.to_string(), value);
            }
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "Key '{}' not found in settings",
                    key
                )));
            }
        }

        let new_settings: ExtensionSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.settings = new_settings;
        self.save(storage)?;
        Ok(())
    }

    fn reset(&mut self, storage: &mut dyn StorageArea) -> Result<(), SettingsError> {
        self.settings = ExtensionSettings::default();
        self.save(storage)?;
        Ok(())
    }
}
