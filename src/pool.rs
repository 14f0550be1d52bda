//! Randomized draw pools for lifelines and dares
//!
//! A [`ResourcePool`] hands out catalog items in random order without
//! repeating any item within a cycle. When a cycle is exhausted the pool
//! is refilled from the catalog, skipping the most recently drawn items so
//! that the same item never comes up twice in a row across the reset.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::pool::HISTORY_LENGTH;

/// Items that can be placed in a [`ResourcePool`]
pub trait Identified {
    /// Stable identifier used to recognise the item across resets
    fn id(&self) -> &str;
}

/// Errors raised by pool draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Nothing left to draw; the pool must be reset first
    #[error("pool is exhausted")]
    Exhausted,
}

/// Counts describing a pool, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Items left in the current cycle
    pub available: usize,
    /// Items drawn in the current cycle
    pub drawn: usize,
    /// Entries in the cross-cycle history
    pub history: usize,
    /// Identifiers in the history, oldest first
    pub history_ids: Vec<String>,
}

/// A draw-without-immediate-repeat container over a fixed catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePool<T> {
    /// Items not yet drawn this cycle, in random order
    available: Vec<T>,
    /// Items drawn this cycle
    drawn: Vec<T>,
    /// Identifiers of the most recent draws across cycles, oldest first
    history: VecDeque<String>,
}

impl<T: Identified + Clone> ResourcePool<T> {
    /// Creates a pool holding a random permutation of the catalog
    pub fn new(catalog: &[T]) -> Self {
        let mut available = catalog.to_vec();
        fastrand::shuffle(&mut available);
        Self {
            available,
            drawn: Vec::new(),
            history: VecDeque::with_capacity(HISTORY_LENGTH + 1),
        }
    }

    /// Draws the next item of the current cycle
    ///
    /// The remaining items are reshuffled after every draw.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`] when the cycle has no items left.
    pub fn draw(&mut self) -> Result<T, Error> {
        if self.available.is_empty() {
            return Err(Error::Exhausted);
        }

        let item = self.available.remove(0);
        self.drawn.push(item.clone());
        self.history.push_back(item.id().to_owned());
        while self.history.len() > HISTORY_LENGTH {
            self.history.pop_front();
        }
        fastrand::shuffle(&mut self.available);

        Ok(item)
    }

    /// Starts a new cycle from the catalog
    ///
    /// Items in the history are left out. If that leaves nothing, only the
    /// most recent draw is left out, and if that still leaves nothing (a
    /// single-item catalog) the whole catalog is used. The history is kept.
    pub fn reset(&mut self, catalog: &[T]) {
        let not_recent = catalog
            .iter()
            .filter(|item| !self.history.iter().any(|id| id == item.id()))
            .cloned()
            .collect::<Vec<_>>();

        let mut refill = if not_recent.is_empty() {
            let last = self.history.back();
            let not_last = catalog
                .iter()
                .filter(|item| last.is_none_or(|id| id != item.id()))
                .cloned()
                .collect::<Vec<_>>();
            if not_last.is_empty() {
                catalog.to_vec()
            } else {
                not_last
            }
        } else {
            not_recent
        };

        fastrand::shuffle(&mut refill);
        tracing::debug!(refilled = refill.len(), "resource pool reset");

        self.available = refill;
        self.drawn.clear();
    }

    /// Draws an item, starting a new cycle first if this one is exhausted
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`] only when the catalog itself is empty.
    pub fn draw_with_auto_reset(&mut self, catalog: &[T]) -> Result<T, Error> {
        if self.available.is_empty() {
            self.reset(catalog);
        }
        self.draw()
    }

    /// Items left in the current cycle
    pub fn available(&self) -> &[T] {
        &self.available
    }

    /// Items drawn in the current cycle
    pub fn drawn(&self) -> &[T] {
        &self.drawn
    }

    /// Identifiers of the most recent draws, oldest first
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Summary counts for diagnostics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            available: self.available.len(),
            drawn: self.drawn.len(),
            history: self.history.len(),
            history_ids: self.history.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item(String);

    impl Identified for Item {
        fn id(&self) -> &str {
            &self.0
        }
    }

    fn catalog(size: usize) -> Vec<Item> {
        (0..size).map(|i| Item(format!("item-{i}"))).collect()
    }

    #[test]
    fn test_new_pool_is_permutation() {
        let items = catalog(6);
        let pool = ResourcePool::new(&items);
        let ids: HashSet<_> = pool.available().iter().map(Identified::id).collect();
        assert_eq!(ids.len(), 6);
        assert!(pool.drawn().is_empty());
        assert_eq!(pool.history().count(), 0);
    }

    #[test]
    fn test_draw_until_exhausted() {
        let items = catalog(3);
        let mut pool = ResourcePool::new(&items);
        let mut seen = HashSet::new();
        for _ in 0..3 {
            seen.insert(pool.draw().unwrap().0);
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(pool.draw(), Err(Error::Exhausted));
        assert_eq!(pool.drawn().len(), 3);
    }

    #[test]
    fn test_history_keeps_last_three() {
        let items = catalog(6);
        let mut pool = ResourcePool::new(&items);
        let drawn: Vec<_> = (0..5).map(|_| pool.draw().unwrap().0).collect();
        let history: Vec<_> = pool.history().map(str::to_owned).collect();
        assert_eq!(history, drawn[2..].to_vec());
    }

    #[test]
    fn test_reset_skips_history() {
        let items = catalog(6);
        let mut pool = ResourcePool::new(&items);
        while pool.draw().is_ok() {}
        let recent: HashSet<_> = pool.history().map(str::to_owned).collect();

        pool.reset(&items);
        assert_eq!(pool.available().len(), 3);
        assert!(pool.drawn().is_empty());
        assert!(
            pool.available()
                .iter()
                .all(|item| !recent.contains(item.id()))
        );
        assert_eq!(pool.history().count(), 3);
    }

    #[test]
    fn test_auto_reset_never_fails_and_never_repeats() {
        for size in 1..=8 {
            fastrand::seed(size as u64);
            let items = catalog(size);
            let mut pool = ResourcePool::new(&items);
            let mut previous: Option<Item> = None;
            for _ in 0..100 {
                let item = pool.draw_with_auto_reset(&items).unwrap();
                if size >= 2 {
                    assert_ne!(Some(&item), previous.as_ref(), "repeat with catalog size {size}");
                }
                previous = Some(item);
            }
        }
    }

    #[test]
    fn test_auto_reset_on_empty_catalog_fails() {
        let mut pool: ResourcePool<Item> = ResourcePool::new(&[]);
        assert_eq!(pool.draw_with_auto_reset(&[]), Err(Error::Exhausted));
    }

    #[test]
    fn test_stats() {
        let items = catalog(4);
        let mut pool = ResourcePool::new(&items);
        let first = pool.draw().unwrap();
        let stats = pool.stats();
        assert_eq!(stats.available, 3);
        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.history, 1);
        assert_eq!(stats.history_ids, vec![first.0]);
    }
}
