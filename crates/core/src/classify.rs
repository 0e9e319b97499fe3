//! Offline-guarantee classification of cache keys.

/// Must this resource stay available offline once fetched?
///
/// Ad hoc allowlist carried over from the deployed site layout: vendor
/// bundles, static assets, and the jQuery bundle. Substring matching on
/// `vendor/` and `assets/` is fragile against other path conventions
/// (a trailing-slash-less `.../vendor` directory would slip through),
/// but the behavior is load-bearing for existing caches, so it stays
/// exactly as is.
pub fn needs_offline_guarantee(cache_key: &str) -> bool {
    cache_key.contains("vendor/") || cache_key.contains("assets/") || cache_key.ends_with("jquery.min.js")
}
