//! Durable storage for tabwarden.
//!
//! Provides SQLite connection management, schema migrations and the
//! [`SqliteStorage`] key/value area used as the durable storage scope.
//!
//! # Usage
//!
//! ```no_run
//! use tabwarden::database::{Database, SqliteStorage};
//! use tabwarden::host::StorageArea;
//!
//! let db = Database::open("tabwarden.db").expect("failed to open database");
//! let mut storage = SqliteStorage::new(db);
//! storage.set("lastSessionId", serde_json::json!("1700000000000")).unwrap();
//! ```

pub mod connection;
pub mod kv_store;
pub mod migrations;

pub use connection::Database;
pub use kv_store::SqliteStorage;
