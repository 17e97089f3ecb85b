// tabwarden services
// Services hold stateless or cache-like logic: URL normalization, duplicate scanning, settings, link resolution.

pub mod duplicate_scanner;
pub mod link_resolver;
pub mod settings_engine;
pub mod url_normalizer;
