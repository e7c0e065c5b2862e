// src/crawl/queue.rs
// =============================================================================
// This module implements the pool of links waiting to be visited.
//
// How it works:
// 1. Links extracted from a page are pushed onto the queue
// 2. The walk removes one entry at a time, chosen uniformly at random
// 3. Links found at different depths share the same pool
//
// The order of entries carries no meaning, which lets removal be O(1).
//
// Rust concepts:
// - Vec + HashSet: random access plus fast duplicate checks
// - swap_remove: removes an element by moving the last one into its slot
// =============================================================================

use rand::Rng;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct LinkQueue {
    links: Vec<String>,
    pending: HashSet<String>, // mirrors `links` for duplicate checks
}

impl LinkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds a link unless it is already waiting
    //
    // Returns: true if the link was added
    pub fn push(&mut self, link: String) -> bool {
        if !self.pending.insert(link.clone()) {
            return false;
        }
        self.links.push(link);
        true
    }

    // Adds every link from `links`, returning how many were new
    pub fn extend(&mut self, links: impl IntoIterator<Item = String>) -> usize {
        let mut added = 0;
        for link in links {
            if self.push(link) {
                added += 1;
            }
        }
        added
    }

    // Removes and returns a uniformly random entry, or None when empty
    pub fn take_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        if self.links.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.links.len());
        let link = self.links.swap_remove(idx);
        self.pending.remove(&link);
        Some(link)
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
