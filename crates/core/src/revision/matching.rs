//! URL matching against base API URL patterns.
//!
//! Matching is plain, case-sensitive substring containment. `/items/1`
//! therefore also matches `/items/10`; patterns must be chosen accordingly.

use crate::config::BaseUrlPattern;

/// The first pattern in `patterns` that matches `url`.
///
/// With `strict` set, strict patterns require exact equality; non-strict
/// patterns always use containment.
pub fn match_base_url<'a>(patterns: &'a [BaseUrlPattern], url: &str, strict: bool) -> Option<&'a str> {
    patterns
        .iter()
        .find(|pattern| {
            if strict && pattern.strict { url == pattern.url } else { url.contains(pattern.url.as_str()) }
        })
        .map(|pattern| pattern.url.as_str())
}

/// Whether `key` lies below `prefix` in the URL hierarchy.
pub fn is_descendant(key: &str, prefix: &str) -> bool {
    key != prefix && key.contains(prefix)
}
