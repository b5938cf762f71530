//! Breadth-first frontier with at-most-once enqueue per canonical URL.

use crate::config::Policy;
use crate::url::{in_scope, normalize_url, CanonicalUrl};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Canonical URL to fetch
    pub url: CanonicalUrl,

    /// Breadth-first distance from the seeds (seeds are 0)
    pub depth: u32,
}

/// What happened to a URL offered to the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Newly visited and queued
    Enqueued(CanonicalUrl),
    /// Already enqueued earlier; nothing changed
    Duplicate(CanonicalUrl),
    /// Outside the policy scope; silently dropped
    OutOfScope(CanonicalUrl),
}

impl PushOutcome {
    /// True when the URL was queued by this call
    pub fn is_enqueued(&self) -> bool {
        matches!(self, Self::Enqueued(_))
    }
}

/// FIFO work queue plus the visited set
///
/// A canonical URL enters the visited set at most once for the lifetime of
/// the frontier, at the moment it is queued. The visited check and insert are
/// a single `HashSet::insert` call, and the frontier is only ever mutated by
/// its owning crawl loop.
#[derive(Debug)]
pub struct Frontier {
    policy: Arc<Policy>,
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    pops: u64,
}

impl Frontier {
    /// Creates an empty frontier bound to a policy
    pub fn new(policy: Arc<Policy>) -> Self {
        Self {
            policy,
            queue: VecDeque::new(),
            visited: HashSet::new(),
            pops: 0,
        }
    }

    /// Normalizes, scope-filters and enqueues seed URLs at depth 0
    ///
    /// Returns the number of seeds actually queued.
    pub fn seed<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut queued = 0;

        for raw in urls {
            match self.offer(raw.as_ref(), 0) {
                PushOutcome::Enqueued(url) => {
                    tracing::debug!("Seeded {}", url);
                    queued += 1;
                }
                PushOutcome::Duplicate(url) => {
                    tracing::debug!("Duplicate seed {}", url);
                }
                PushOutcome::OutOfScope(url) => {
                    tracing::warn!("Seed {} is outside the policy scope", url);
                }
            }
        }

        queued
    }

    /// Offers a discovered URL found on a page at `parent_depth`
    ///
    /// The URL is normalized and scope-filtered; if it has not been seen it
    /// is marked visited and queued at `parent_depth + 1`.
    pub fn push(&mut self, raw: &str, parent_depth: u32) -> PushOutcome {
        self.offer(raw, parent_depth.saturating_add(1))
    }

    fn offer(&mut self, raw: &str, depth: u32) -> PushOutcome {
        let url = normalize_url(raw, &self.policy);

        if !in_scope(&url, &self.policy) {
            return PushOutcome::OutOfScope(url);
        }

        if !self.visited.insert(url.as_str().to_string()) {
            return PushOutcome::Duplicate(url);
        }

        self.queue.push_back(FrontierEntry {
            url: url.clone(),
            depth,
        });
        PushOutcome::Enqueued(url)
    }

    /// Removes and returns the earliest queued entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.pops += 1;
        Some(entry)
    }

    /// Whether a canonical URL has been queued at some point
    pub fn is_visited(&self, url: &CanonicalUrl) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Number of entries waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs ever queued
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of successful `pop` calls
    pub fn pops(&self) -> u64 {
        self.pops
    }
}
