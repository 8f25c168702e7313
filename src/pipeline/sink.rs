//! Append-only collector at the end of the pipeline

use crate::core::sync::lock_recovering;
use std::sync::{Mutex, MutexGuard};

/// Thread-safe, unbounded, append-only collection of items
#[derive(Debug)]
pub struct Sink<T> {
    items: Mutex<Vec<T>>,
}

impl<T> Default for Sink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sink<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    fn items(&self) -> MutexGuard<'_, Vec<T>> {
        lock_recovering(&self.items, "sink")
    }

    /// Append `item` and return the new number of items
    pub fn add(&self, item: T) -> usize {
        let mut items = self.items();
        items.push(item);
        items.len()
    }

    pub fn size(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn clear(&self) {
        self.items().clear();
    }
}

impl<T: Clone> Sink<T> {
    /// Independent copy of the collected items, in insertion order
    pub fn snapshot(&self) -> Vec<T> {
        self.items().clone()
    }

    /// Copy of the first `count` items (fewer if the sink is shorter)
    pub fn head(&self, count: usize) -> Vec<T> {
        self.items().iter().take(count).cloned().collect()
    }
}
