//! Finite, read-once item supply
//!
//! The items are copied in at construction and never change; only the
//! cursor moves. Each cursor position is handed to exactly one caller, so
//! producers sharing a `Source` partition its items between them.

use crate::core::sync::lock_recovering;
use crate::pipeline::error::{PipelineError, PipelineResult};
use std::sync::Mutex;

/// Thread-safe source of items with an internal cursor
#[derive(Debug)]
pub struct Source<T> {
    items: Vec<T>,
    /// Index of the next item to hand out, in `[0, items.len()]`
    cursor: Mutex<usize>,
}

impl<T: Clone> Source<T> {
    /// Create a source holding a copy of `items`
    ///
    /// Later changes to the caller's collection do not affect the source.
    pub fn new(items: &[T]) -> Self {
        Self::from_vec(items.to_vec())
    }

    /// Whether at least one item has not been handed out yet
    pub fn has_next(&self) -> bool {
        *self.cursor() < self.items.len()
    }

    /// Hand out the next item
    ///
    /// Calling this with nothing left is a contract violation and yields
    /// [`PipelineError::Exhausted`]. Code shared between threads should use
    /// [`Source::next_item`] instead of pairing `has_next` with `get_next`.
    pub fn get_next(&self) -> PipelineResult<T> {
        self.next_item().ok_or(PipelineError::Exhausted {
            size: self.items.len(),
        })
    }

    /// Check and advance in one step: the next item, or `None` when exhausted
    pub fn next_item(&self) -> Option<T> {
        let mut cursor = self.cursor();
        let item = self.items.get(*cursor).cloned()?;
        *cursor += 1;
        Some(item)
    }

    /// Copy of all items in their original order
    pub fn snapshot(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<T> Source<T> {
    /// Create a source that takes ownership of `items`
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items,
            cursor: Mutex::new(0),
        }
    }

    fn cursor(&self) -> std::sync::MutexGuard<'_, usize> {
        lock_recovering(&self.cursor, "source cursor")
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Number of items handed out so far
    pub fn position(&self) -> usize {
        *self.cursor()
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - *self.cursor()
    }

    /// Rewind to the first item. Meant for reusing a source in tests.
    pub fn reset(&self) {
        *self.cursor() = 0;
    }
}

impl<T> FromIterator<T> for Source<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_hands_out_items_in_order() {
        let source = Source::new(&[10, 20, 30]);

        assert_eq!(source.size(), 3);
        assert!(source.has_next());
        assert_eq!(source.get_next().unwrap(), 10);
        assert_eq!(source.get_next().unwrap(), 20);
        assert_eq!(source.position(), 2);
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.next_item(), Some(30));
        assert!(!source.has_next());
    }

    #[test]
    fn test_get_next_on_exhausted_source_fails() {
        let source = Source::new(&[1]);
        source.get_next().unwrap();

        assert_eq!(source.get_next(), Err(PipelineError::Exhausted { size: 1 }));
        assert_eq!(source.next_item(), None);
        assert_eq!(source.position(), 1, "failed calls must not move the cursor");
    }

    #[test]
    fn test_empty_source() {
        let source: Source<i32> = Source::new(&[]);

        assert!(!source.has_next());
        assert_eq!(source.size(), 0);
        assert!(source.snapshot().is_empty());
        assert_eq!(source.get_next(), Err(PipelineError::Exhausted { size: 0 }));
    }

    #[test]
    fn test_caller_mutation_does_not_leak_in() {
        let mut data = vec![1, 2, 3];
        let source = Source::new(&data);

        data[0] = 99;
        data.push(4);

        assert_eq!(source.size(), 3);
        assert_eq!(source.get_next().unwrap(), 1);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let source: Source<i32> = (1..=3).collect();
        let mut snapshot = source.snapshot();

        source.get_next().unwrap();
        snapshot.push(100);
        snapshot[0] = -1;

        assert_eq!(source.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn test_reset_rewinds_cursor() {
        let source = Source::new(&["a", "b"]);
        source.get_next().unwrap();
        source.get_next().unwrap();

        source.reset();

        assert_eq!(source.position(), 0);
        assert_eq!(source.get_next().unwrap(), "a");
    }

    #[test]
    fn test_concurrent_callers_never_share_an_item() {
        let source: Arc<Source<u32>> = Arc::new((0..1000).collect());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let source = Arc::clone(&source);
                thread::spawn(move || {
                    let mut taken = Vec::new();
                    while let Some(item) = source.next_item() {
                        taken.push(item);
                    }
                    taken
                })
            })
            .collect();

        let mut seen = HashSet::new();
        let mut total = 0;
        for handle in handles {
            for item in handle.join().unwrap() {
                assert!(seen.insert(item), "item {} handed out twice", item);
                total += 1;
            }
        }

        assert_eq!(total, 1000);
        assert_eq!(source.position(), 1000);
    }
}
