//! tabwarden: background-service core of a tab-lifecycle browser extension.
//!
//! Detects duplicate tabs through cached URL normalization, throttles
//! "duplicate tabs found" notifications, and reuses existing tabs instead of
//! opening new ones. The browser is reached only through the traits in
//! [`host`].
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod host;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
