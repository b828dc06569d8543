// src/crawl/frontier.rs
// =============================================================================
// The crawl frontier: URLs waiting to be fetched plus every URL already
// handed out.
//
// Invariants (all guarded by one exclusive lock):
// - pending keeps insertion order and never holds a duplicate
// - a URL in visited is never added back to pending
// - dequeue removes from pending and inserts into visited in the same
//   critical section, so a URL is handed out at most once per run
//
// No lock is ever held across network I/O; every critical section is a few
// set operations.
// =============================================================================

use crate::error::CrawlError;
use indexmap::IndexSet;
use parking_lot::Mutex;
use std::collections::HashSet;

#[derive(Debug, Default)]
struct FrontierState {
    pending: IndexSet<String>,
    visited: HashSet<String>,
}

/// Thread-safe queue of URLs still to crawl.
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds URLs that have not been visited yet. URLs already pending are
    // absorbed silently.
    pub fn enqueue<I>(&self, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut state = self.state.lock();
        for url in urls {
            if !state.visited.contains(&url) {
                state.pending.insert(url);
            }
        }
    }

    // Hands out the oldest pending URL and marks it visited.
    //
    // Callers check `len()` first; an empty frontier is an error.
    pub fn dequeue_one(&self) -> Result<String, CrawlError> {
        let mut state = self.state.lock();
        let url = state.pending.shift_remove_index(0).ok_or(CrawlError::EmptyFrontier)?;
        state.visited.insert(url.clone());
        Ok(url)
    }

    /// Number of pending URLs
    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.state.lock().visited.contains(url)
    }

    #[cfg(test)]
    pub fn is_pending(&self, url: &str) -> bool {
        self.state.lock().pending.contains(url)
    }

    #[cfg(test)]
    pub fn visited_count(&self) -> usize {
        self.state.lock().visited.len()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why IndexSet instead of VecDeque?
//    - A VecDeque happily stores the same url twice
//    - IndexSet is a set that remembers insertion order
//    - shift_remove_index(0) pops the oldest entry, like pop_front()
//
// 2. Why one Mutex around both sets?
//    - Dequeue and "mark visited" must happen together
//    - With two locks another task could sneak in between them
//    - parking_lot's Mutex never poisons, so lock() returns the guard directly
//
// 3. Why &self everywhere?
//    - The frontier is shared between tasks through an Arc
//    - Interior mutability (the Mutex) lets shared owners still mutate it
// -----------------------------------------------------------------------------
