//! Crawl frontier: pending URLs plus everything ever seen in the run

use std::collections::{HashSet, VecDeque};

/// FIFO queue of URLs to fetch; a URL enters it at most once per run
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a URL unless it was seen before; returns whether it was new
    pub fn push(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if !self.seen.insert(url.clone()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Takes up to `size` URLs from the front of the queue
    pub fn next_batch(&mut self, size: usize) -> Vec<String> {
        let take = size.min(self.queue.len());
        self.queue.drain(..take).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// URLs waiting to be fetched
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Distinct URLs ever pushed, including those already taken
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
