// src/crawl/mod.rs
// =============================================================================
// This module handles the traffic-generating crawl.
//
// Features:
// - Random root selection and random depth-first walks
// - Visited-set deduplication and blacklist filtering
// - Random sleep jitter between visits
// - Stops on cancellation or when the time budget runs out
//
// Submodules:
// - fetch: one bounded HTTP GET per call
// - queue: the pool of links waiting to be visited
// - walk: the Crawler that ties everything together
// =============================================================================

mod fetch;
mod queue;
mod walk;

// Re-export the crawler, the only thing main.rs needs
pub use walk::Crawler;
