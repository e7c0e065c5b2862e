// src/crawl/walk.rs
// =============================================================================
// This module drives the crawl: the random, depth-limited walk.
//
// How it works:
// 1. Pick a random root URL and fetch it
// 2. Seed the link queue with the eligible links found on the root page
// 3. Walk: take a random link from the queue, fetch it, add its links to
//    the queue, sleep a random amount, and go one level deeper
// 4. When the walk ends (depth cap, failed fetch, empty queue), go back to 1
//
// Stop conditions, checked before every step:
// - the CancellationToken has been cancelled (signal or deadline)
// - the configured timeout has elapsed since crawl() started
//
// Everything runs sequentially: one request in flight at most.
// =============================================================================

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use super::fetch::Fetcher;
use super::queue::LinkQueue;
use crate::config::Config;
use crate::links::{extract_links, LinkFilter};

// Counters reported when a crawl stops
#[derive(Debug, Default)]
struct CrawlStats {
    roots_fetched: usize,
    walks_started: usize,
    pages_visited: usize,
    fetch_failures: usize,
    links_enqueued: usize,
}

// One crawl session: the configuration plus all mutable crawl state.
//
// The visited set only ever grows, so use a fresh Crawler for each
// independent run.
pub struct Crawler {
    config: Config,
    fetcher: Fetcher,
    rng: StdRng,
    started_at: Instant,
    queue: LinkQueue,
    visited: HashSet<String>,
    stats: CrawlStats,
}

impl Crawler {
    // Creates a crawler whose random choices are seeded from the OS
    pub fn new(config: Config) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    // Creates a crawler with reproducible random choices
    pub fn with_seed(config: Config, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, rng: StdRng) -> Result<Self> {
        let fetcher = Fetcher::new(config.user_agents.clone())?;

        Ok(Self {
            config,
            fetcher,
            rng,
            started_at: Instant::now(),
            queue: LinkQueue::new(),
            visited: HashSet::new(),
            stats: CrawlStats::default(),
        })
    }

    // Crawls until `token` is cancelled or the configured timeout elapses.
    //
    // Fetch failures are logged and never returned.
    pub async fn crawl(&mut self, token: &CancellationToken) {
        self.started_at = Instant::now();

        while !self.should_stop(token) {
            let Some(root) = self.config.root_urls.choose(&mut self.rng).cloned() else {
                tracing::error!("no root URLs configured, nothing to crawl");
                break;
            };

            let body = match self.fetcher.fetch(token, &root, &mut self.rng).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("root fetch {}: {:#}", root, e);
                    self.stats.fetch_failures += 1;
                    continue;
                }
            };
            self.stats.roots_fetched += 1;

            // Each root starts a fresh pool of links
            self.queue.clear();
            self.enqueue_links(&body, &root);
            if self.queue.is_empty() {
                tracing::debug!("no eligible links on {}", root);
                continue;
            }
            tracing::debug!("seeded {} links from {}", self.queue.len(), root);

            self.walk(token).await;
        }

        tracing::info!(
            "crawl stopped after {:.1}s: {} roots, {} walks, {} pages visited, {} failed fetches, {} links queued",
            self.started_at.elapsed().as_secs_f64(),
            self.stats.roots_fetched,
            self.stats.walks_started,
            self.stats.pages_visited,
            self.stats.fetch_failures,
            self.stats.links_enqueued,
        );
    }

    // Follows one random path through the queue, at most max_depth pages long
    async fn walk(&mut self, token: &CancellationToken) {
        self.stats.walks_started += 1;

        for depth in 0..self.config.max_depth {
            if self.should_stop(token) {
                return;
            }
            let Some(target) = self.queue.take_random(&mut self.rng) else {
                return;
            };
            self.visited.insert(target.clone());

            let body = match self.fetcher.fetch(token, &target, &mut self.rng).await {
                Ok(body) => body,
                Err(e) => {
                    // A failed visit ends this path; the outer loop picks a new root
                    tracing::warn!("visit {} (depth {}): {:#}", target, depth, e);
                    self.stats.fetch_failures += 1;
                    return;
                }
            };
            self.stats.pages_visited += 1;

            self.enqueue_links(&body, &target);
            self.jitter_sleep(token).await;
        }
    }

    // Extracts eligible links from a page and adds them to the queue
    fn enqueue_links(&mut self, body: &[u8], page_url: &str) {
        let filter = LinkFilter::new(&self.visited, &self.config.blacklisted_urls);
        let links = extract_links(body, page_url, &filter);
        self.stats.links_enqueued += self.queue.extend(links);
    }

    // Sleeps a random duration in [min_sleep, max_sleep] microseconds,
    // waking up early if the crawl is cancelled or its time budget runs out
    async fn jitter_sleep(&mut self, token: &CancellationToken) {
        let micros = self.rng.gen_range(self.config.min_sleep..=self.config.max_sleep);
        let mut pause = Duration::from_micros(micros);
        if let Some(remaining) = self.remaining_budget() {
            pause = pause.min(remaining);
        }

        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(pause) => {}
        }
    }

    fn should_stop(&self, token: &CancellationToken) -> bool {
        token.is_cancelled() || self.timeout_reached()
    }

    fn timeout_reached(&self) -> bool {
        if self.config.timeout == 0 {
            return false;
        }
        self.started_at.elapsed() > Duration::from_secs(self.config.timeout)
    }

    // Time left before the configured timeout, None when unbounded
    fn remaining_budget(&self) -> Option<Duration> {
        if self.config.timeout == 0 {
            return None;
        }
        let budget = Duration::from_secs(self.config.timeout);
        Some(budget.saturating_sub(self.started_at.elapsed()))
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a loop instead of recursion for the walk?
//    - Each step of the walk is "one level deeper", so a counted for-loop
//      expresses the depth cap directly
//    - Deep walks (large max_depth) cannot overflow the stack
//
// 2. Why does the queue get cleared for every root?
//    - The queue belongs to one walk; links left over from an earlier walk
//      are found again if their pages are reached again
//    - The visited set is NOT cleared, so a page is only ever visited once
//
// 3. Why is a root not added to the visited set?
//    - Roots are re-picked on purpose every time a walk ends
//    - A root can still be visited once as an ordinary link
// -----------------------------------------------------------------------------
