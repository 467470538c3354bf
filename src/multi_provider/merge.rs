//! Result merging: URL canonicalization, round-robin interleave, dedup, cap

use crate::types::SearchResult;
use std::collections::HashSet;
use url::Url;

/// Canonical form of a URL, used only as a deduplication key.
///
/// The scheme becomes `https`, the host is lower-cased, a trailing slash on
/// the path is stripped and the fragment is dropped. Path and query keep
/// their case. Unparseable input falls back to a trimmed, lower-cased copy
/// with the same trailing-slash rule.
pub fn canonical_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw.trim()) else {
        return raw.trim().trim_end_matches('/').to_lowercase();
    };

    let Some(host) = parsed.host_str() else {
        return raw.trim().trim_end_matches('/').to_lowercase();
    };

    let mut key = format!("https://{}", host.to_lowercase());
    if let Some(port) = parsed.port() {
        // 80 and 443 are both "default" once the scheme is forced to https
        if port != 80 && port != 443 {
            key.push_str(&format!(":{port}"));
        }
    }
    key.push_str(parsed.path().trim_end_matches('/'));
    if let Some(query) = parsed.query() {
        key.push('?');
        key.push_str(query);
    }
    key
}

/// Interleave `lists` round-robin, keep the first occurrence of each
/// canonical URL and stop at `max_results` entries.
///
/// The order of `lists` is the priority order: at every depth the first list
/// is visited first. The output depends only on the inputs, never on when
/// each list was produced.
pub fn merge(lists: Vec<Vec<SearchResult>>, max_results: usize) -> Vec<SearchResult> {
    let mut merged = Vec::new();
    if max_results == 0 {
        return merged;
    }

    let mut seen = HashSet::new();
    let mut iters: Vec<_> = lists.into_iter().map(Vec::into_iter).collect();

    loop {
        let mut progressed = false;
        for iter in iters.iter_mut() {
            let Some(result) = iter.next() else {
                continue;
            };
            progressed = true;

            if seen.insert(canonical_url(&result.url)) {
                merged.push(result);
                if merged.len() >= max_results {
                    return merged;
                }
            }
        }
        if !progressed {
            return merged;
        }
    }
}
