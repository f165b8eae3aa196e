//! Reorder buffer restoring batch order after unordered parallel completion.
//!
//! Results are pushed under their batch id in whatever order workers finish
//! them and are released strictly in id order, starting at 0. An item is held
//! only while some lower id is still outstanding.

use std::collections::BTreeMap;

use crate::error::{LocateError, Result};

#[derive(Debug)]
pub struct ReorderBuffer<T> {
    pending: BTreeMap<u64, T>,
    next_expected: u64,
    max_pending: usize,
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReorderBuffer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_expected: 0,
            max_pending: 0,
        }
    }

    /// Accept the item for batch `id` and return every item that can now be
    /// released, in id order.
    ///
    /// The expected item is released directly together with any contiguous
    /// successors already waiting; it is never stored. A later item is held
    /// and nothing is returned. Fails with an invariant violation if `id` was
    /// already released or is already waiting in the buffer.
    pub fn push(&mut self, id: u64, item: T) -> Result<Vec<T>> {
        if id < self.next_expected {
            return Err(LocateError::InvariantViolation(format!(
                "batch {} arrived after it was already emitted (next expected {})",
                id, self.next_expected
            )));
        }
        if id > self.next_expected {
            if self.pending.contains_key(&id) {
                return Err(LocateError::InvariantViolation(format!(
                    "batch {} arrived twice",
                    id
                )));
            }
            self.pending.insert(id, item);
            self.max_pending = self.max_pending.max(self.pending.len());
            return Ok(Vec::new());
        }

        let mut ready = vec![item];
        self.next_expected += 1;
        while let Some(next) = self.pending.remove(&self.next_expected) {
            ready.push(next);
            self.next_expected += 1;
        }
        Ok(ready)
    }

    /// Consume the buffer once no more items can arrive. Any remaining items
    /// must be contiguous from `next_expected`; a hole means a batch was lost.
    pub fn finish(self) -> Result<Vec<T>> {
        let mut expected = self.next_expected;
        for &id in self.pending.keys() {
            if id != expected {
                return Err(LocateError::InvariantViolation(format!(
                    "batch {} never arrived; {} later batch(es) still pending starting at {}",
                    expected,
                    self.pending.len(),
                    id
                )));
            }
            expected += 1;
        }
        Ok(self.pending.into_values().collect())
    }

    /// Id of the next item to be released
    pub fn next_expected(&self) -> u64 {
        self.next_expected
    }

    /// Items currently held back
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Largest number of items held back at any time
    pub fn max_pending(&self) -> usize {
        self.max_pending
    }
}
