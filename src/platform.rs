// tabwarden platform paths
// Selects where the durable database lives. `TABWARDEN_DATA_DIR` overrides the
// per-OS default.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TABWARDEN_DATA_DIR";
/// File name of the durable storage database.
pub const DATABASE_FILE: &str = "tabwarden.db";

/// Returns the directory holding tabwarden's durable state.
///
/// - **Override**: `$TABWARDEN_DATA_DIR`
/// - **Linux**: `$XDG_DATA_HOME/tabwarden` or `~/.local/share/tabwarden`
/// - **macOS**: `~/Library/Application Support/tabwarden`
/// - **Windows**: `%APPDATA%/tabwarden`
pub fn data_dir() -> PathBuf {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    default_data_dir()
}

/// Full path of the durable storage database.
pub fn database_path() -> PathBuf {
    data_dir().join(DATABASE_FILE)
}

#[cfg(target_os = "linux")]
fn default_data_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("tabwarden");
    }
    home_dir().join(".local").join("share").join("tabwarden")
}

#[cfg(target_os = "macos")]
fn default_data_dir() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join("tabwarden")
}

#[cfg(target_os = "windows")]
fn default_data_dir() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("tabwarden")
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn default_data_dir() -> PathBuf {
    PathBuf::from(".").join("tabwarden")
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}
