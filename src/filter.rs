//! Deduplication and blacklist filtering
//!
//! One consolidated filtering stage applied after fetching, before
//! scoring. The stage is idempotent: running it twice yields the same
//! set, so callers never need a second defensive pass.

use std::collections::HashSet;

use crate::models::RawTrend;

/// Check whether a query contains any blacklisted substring
///
/// Matching is case-insensitive and literal (not tokenized): a
/// blacklisted word inside a longer word still matches. Blacklist
/// entries are expected lowercased.
pub fn is_blacklisted(text: &str, blacklist: &[String]) -> bool {
    let lowered = text.to_lowercase();
    blacklist.iter().any(|bad| lowered.contains(bad.as_str()))
}

/// Deduplicate by query text and drop blacklisted entries
///
/// Arrival order is preserved; the first occurrence of each distinct
/// query text wins (first-seen-region policy), later duplicates from
/// other regions are dropped, never merged. Empty queries are dropped.
pub fn consolidate(all_raw: Vec<RawTrend>, blacklist: &[String]) -> Vec<RawTrend> {
    let mut seen: HashSet<String> = HashSet::with_capacity(all_raw.len());
    let mut unique = Vec::with_capacity(all_raw.len());

    for trend in all_raw {
        if trend.query.trim().is_empty() {
            continue;
        }
        if !seen.insert(trend.query.clone()) {
            continue;
        }
        if is_blacklisted(&trend.query, blacklist) {
            continue;
        }
        unique.push(trend);
    }

    unique
}
