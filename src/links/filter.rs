// src/links/filter.rs
// =============================================================================
// This module decides whether a resolved link may be queued for a visit.
//
// A link is rejected when:
// - it is empty (normalization failed)
// - it has already been visited during this crawl
// - it contains any blacklisted substring
// - it is not a syntactically valid absolute URL
//
// The checks are independent; the cheap ones run first.
// =============================================================================

use std::collections::HashSet;
use url::Url;

// A read-only view over the crawler's visited set and the configured blacklist
pub struct LinkFilter<'a> {
    visited: &'a HashSet<String>,
    blacklist: &'a [String],
}

impl<'a> LinkFilter<'a> {
    pub fn new(visited: &'a HashSet<String>, blacklist: &'a [String]) -> Self {
        Self { visited, blacklist }
    }

    // Returns true if `link` is eligible to enqueue
    pub fn accept(&self, link: &str) -> bool {
        if link.is_empty() || self.visited.contains(link) {
            return false;
        }

        // Plain substring containment, not pattern matching
        if self.blacklist.iter().any(|blocked| link.contains(blocked.as_str())) {
            return false;
        }

        Url::parse(link).is_ok()
    }
}
