// tabwarden shared type definitions
// Each submodule defines types used across the service.

pub mod errors;
pub mod notification;
pub mod settings;
pub mod tab;
