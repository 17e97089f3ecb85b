//! Property-based tests for URL normalization and the normalization cache.
//!
//! Idempotence (including host-less `mailto:` and `data:` URLs), host/case
//! insensitivity, tracking-parameter removal and the cache capacity bound must
//! hold for arbitrary generated URLs.

use proptest::prelude::*;

use tabwarden::services::url_normalizer::{normalize_url, NormalizationCache, IGNORED_QUERY_PARAMS};

fn arb_host() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9]{0,10}", prop_oneof![Just("com"), Just("org"), Just("io")])
        .prop_map(|(name, tld)| format!("{}.{}", name, tld))
}

fn arb_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 0..4).prop_flat_map(|segments| {
        let joined = segments.join("/");
        prop_oneof![
            Just(format!("/{}", joined)),
            Just(format!("/{}/", joined)),
        ]
    })
}

fn arb_query() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        (
            prop_oneof![
                "[a-zA-Z]{1,6}",
                prop::sample::select(IGNORED_QUERY_PARAMS).prop_map(str::to_string),
            ],
            "[a-z0-9]{0,6}",
        ),
        0..5,
    )
}

fn arb_web_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("http"), Just("https")],
        any::<bool>(),
        arb_host(),
        arb_path(),
        arb_query(),
        prop::option::of("[a-z]{0,5}"),
    )
        .prop_map(|(scheme, www, host, path, query, fragment)| {
            let mut url = format!("{}://{}{}{}", scheme, if www { "www." } else { "" }, host, path);
            if !query.is_empty() {
                let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                url.push('?');
                url.push_str(&pairs.join("&"));
            }
            if let Some(f) = fragment {
                url.push('#');
                url.push_str(&f);
            }
            url
        })
}

fn arb_mailto_url() -> impl Strategy<Value = String> {
    ("[a-zA-Z0-9._]{1,8}", arb_host(), prop::option::of("[a-zA-Z ]{1,8}")).prop_map(
        |(user, host, subject)| match subject {
            Some(s) => format!("mailto:{}@{}?subject={}", user, host, s.replace(' ', "%20")),
            None => format!("mailto:{}@{}", user, host),
        },
    )
}

fn arb_data_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("text/html"), Just("text/plain"), Just("image/png;base64")],
        "[a-zA-Z0-9<>/=,]{0,16}",
        prop::option::of("[a-z]{0,5}"),
    )
        .prop_map(|(mime, body, fragment)| match fragment {
            Some(f) => format!("data:{},{}#{}", mime, body, f),
            None => format!("data:{},{}", mime, body),
        })
}

fn arb_url() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => arb_web_url(),
        1 => arb_mailto_url(),
        1 => arb_data_url(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn normalization_is_idempotent(url in arb_url()) {
        let once = normalize_url(&url);
        prop_assert_eq!(normalize_url(&once), once);
    }

    #[test]
    fn normalization_ignores_www_and_case(url in arb_web_url()) {
        let shouted = url.replacen("://", "://WWW.", 1).to_uppercase();
        // Only the scheme and host are case-insensitive; compare on a path-free URL.
        let base = normalize_url(&url);
        let host_part = |s: &str| s.split('/').take(3).collect::<Vec<_>>().join("/").to_lowercase();
        prop_assert_eq!(host_part(&normalize_url(&shouted)), host_part(&base));
    }

    #[test]
    fn tracking_params_never_survive(url in arb_url()) {
        let normalized = normalize_url(&url);
        if let Some((_, rest)) = normalized.split_once('?') {
            let query = rest.split('#').next().unwrap_or("");
            for pair in query.split('&') {
                let key = pair.split('=').next().unwrap_or("");
                prop_assert!(!IGNORED_QUERY_PARAMS.contains(&key), "{} kept in {}", key, normalized);
            }
        }
    }

    #[test]
    fn cache_never_exceeds_capacity(
        capacity in 1usize..64,
        urls in prop::collection::vec(arb_url(), 1..200),
    ) {
        let mut cache = NormalizationCache::with_capacity(capacity);
        for (i, url) in urls.iter().enumerate() {
            cache.get_or_compute(url, i as i64);
            prop_assert!(cache.len() <= capacity);
        }
    }

    #[test]
    fn cache_agrees_with_direct_normalization(url in arb_url()) {
        let mut cache = NormalizationCache::new();
        let first = cache.get_or_compute(&url, 0);
        let second = cache.get_or_compute(&url, 1);
        prop_assert_eq!(&first, &normalize_url(&url));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn hot_entry_survives_cold_pressure(cold in 10usize..100) {
        let mut cache = NormalizationCache::with_capacity(16);
        for _ in 0..100 {
            cache.get_or_compute("https://hot.example/", 0);
        }
        for i in 0..cold {
            cache.get_or_compute(&format!("https://cold{}.example/", i), 0);
            prop_assert!(cache.contains("https://hot.example/"));
        }
    }
}
