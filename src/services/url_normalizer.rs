//! URL normalization for duplicate detection.
//!
//! [`normalize_url`] maps a URL to a canonical string used only for equality
//! comparison, never for navigation. [`NormalizationCache`] memoizes it per raw
//! input with a bounded, frequency-and-recency aware eviction policy.

use indexmap::IndexMap;
use serde::Serialize;
use url::form_urlencoded;
use url::Url;

/// Query parameters that only carry tracking data.
pub const IGNORED_QUERY_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "msclkid",
    "ref",
    "source",
    "ref_src",
    "_ga",
];

/// Maximum number of cached normalizations.
pub const MAX_CACHE_SIZE: usize = 2000;

/// Usage ratio at which the proactive check evicts.
pub const CACHE_CLEANUP_THRESHOLD: f64 = 0.9;

/// Share of entries dropped by one eviction pass.
const EVICTION_FRACTION: f64 = 0.25;

/// Canonicalizes `raw` for equality comparison.
///
/// Unparseable input (even with an `https://` prefix) degrades to `raw`
/// lower-cased.
pub fn normalize_url(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let parsed = Url::parse(raw).or_else(|_| Url::parse(&format!("https://{}", raw)));
    match parsed {
        Ok(url) => canonicalize(&url),
        Err(_) => raw.to_lowercase(),
    }
}

fn canonicalize(url: &Url) -> String {
    let query = canonical_query(url);
    let fragment = match url.fragment() {
        Some(f) if !f.is_empty() => format!("#{}", f),
        _ => String::new(),
    };

    if !url.has_authority() {
        return format!("{}:{}{}{}", url.scheme(), opaque_path(url), query, fragment);
    }

    // Ports are ignored: the same page served on two ports is one duplicate.
    let mut host = url.host_str().unwrap_or("").to_lowercase();
    while let Some(stripped) = host.strip_prefix("www.") {
        host = stripped.to_string();
    }

    let mut path = url.path();
    while path.len() > 1 && path.ends_with('/') {
        path = &path[..path.len() - 1];
    }
    // The root path adds nothing once a query follows it.
    if path == "/" && !query.is_empty() {
        path = "";
    }

    format!("{}://{}{}{}{}", url.scheme(), host, path, query, fragment)
}

/// Path of a URL without an authority (`mailto:`, `data:`), kept verbatim.
fn opaque_path(url: &Url) -> String {
    if url.cannot_be_a_base() {
        // The parser drops trailing spaces once the query and fragment go.
        return url.path().trim_end_matches(' ').to_string();
    }
    let mut path = url.path();
    while path.len() > 1 && path.ends_with('/') {
        path = &path[..path.len() - 1];
    }
    // A leading `//` would read back as an authority.
    if path.starts_with("//") {
        format!("/.{}", path)
    } else {
        path.to_string()
    }
}

/// Drops tracking parameters, lower-cases keys and sorts by key.
fn canonical_query(url: &Url) -> String {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_lowercase(), v.into_owned()))
        .filter(|(k, _)| !IGNORED_QUERY_PARAMS.contains(&k.as_str()))
        .collect();
    if params.is_empty() {
        return String::new();
    }
    params.sort_by(|a, b| a.0.cmp(&b.0));

    let mut serializer = form_urlencoded::Serializer::new(String::from("?"));
    for (key, value) in &params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// A cached normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub result: String,
    /// Epoch milliseconds at insertion.
    pub timestamp: i64,
    pub access_count: u64,
}

impl CacheEntry {
    /// Retention score: higher means more worth keeping.
    fn score(&self, now: i64) -> f64 {
        self.access_count as f64 / (now - self.timestamp).max(1) as f64
    }
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub usage_ratio: f64,
    pub total_access_count: u64,
    pub avg_access_count: f64,
    pub last_cleanup_time: i64,
}

/// Memoizes [`normalize_url`] keyed by the raw, unnormalized input.
#[derive(Debug)]
pub struct NormalizationCache {
    entries: IndexMap<String, CacheEntry>,
    capacity: usize,
    last_cleanup_time: i64,
}

impl NormalizationCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CACHE_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            capacity: capacity.max(1),
            last_cleanup_time: 0,
        }
    }

    /// Returns the cached normalization of `raw`, computing and caching it on a miss.
    pub fn get_or_compute(&mut self, raw: &str, now: i64) -> String {
        if raw.is_empty() {
            return String::new();
        }
        if let Some(entry) = self.entries.get_mut(raw) {
            entry.access_count += 1;
            return entry.result.clone();
        }

        let result = normalize_url(raw);
        if self.entries.len() >= self.capacity {
            self.evict(now);
        }
        self.entries.insert(
            raw.to_string(),
            CacheEntry {
                result: result.clone(),
                timestamp: now,
                access_count: 1,
            },
        );
        result
    }

    /// Evicts when usage has reached [`CACHE_CLEANUP_THRESHOLD`]. Returns whether it did.
    pub fn check_and_clean(&mut self, now: i64) -> bool {
        if self.usage_ratio() >= CACHE_CLEANUP_THRESHOLD {
            tracing::debug!(
                usage = self.usage_ratio(),
                "normalization cache above threshold, evicting"
            );
            self.evict(now);
            true
        } else {
            false
        }
    }

    /// Drops the lowest-scoring quarter of the entries (at least one).
    pub fn evict(&mut self, now: i64) -> usize {
        if self.entries.is_empty() {
            return 0;
        }
        let mut scored: Vec<(f64, usize)> = self
            .entries
            .values()
            .enumerate()
            .map(|(pos, entry)| (entry.score(now), pos))
            .collect();
        // Stable: equal scores lose in insertion order.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        let delete_count = ((scored.len() as f64 * EVICTION_FRACTION).floor() as usize).max(1);
        let mut doomed: Vec<usize> = scored.iter().take(delete_count).map(|(_, pos)| *pos).collect();
        doomed.sort_unstable();
        let mut position = 0usize;
        let mut next = doomed.iter().peekable();
        self.entries.retain(|_, _| {
            let keep = next.peek().map_or(true, |&&d| d != position);
            if !keep {
                next.next();
            }
            position += 1;
            keep
        });

        self.last_cleanup_time = now;
        tracing::debug!(evicted = delete_count, remaining = self.entries.len(), "evicted cache entries");
        delete_count
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.entries.contains_key(raw)
    }

    pub fn entry(&self, raw: &str) -> Option<&CacheEntry> {
        self.entries.get(raw)
    }

    pub fn usage_ratio(&self) -> f64 {
        self.entries.len() as f64 / self.capacity as f64
    }

    pub fn stats(&self) -> CacheStats {
        let total_access_count: u64 = self.entries.values().map(|e| e.access_count).sum();
        let avg_access_count = if self.entries.is_empty() {
            0.0
        } else {
            total_access_count as f64 / self.entries.len() as f64
        };
        CacheStats {
            size: self.entries.len(),
            max_size: self.capacity,
            usage_ratio: self.usage_ratio(),
            total_access_count,
            avg_access_count,
            last_cleanup_time: self.last_cleanup_time,
        }
    }
}

impl Default for NormalizationCache {
    fn default() -> Self {
        Self::new()
    }
}
