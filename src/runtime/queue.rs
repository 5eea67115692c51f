use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::core::Result;

/// Blocking, capacity-limited work queue.
///
/// `put` blocks the producer while the queue is full; `take` blocks the
/// consumer while it is empty. No item is ever rejected or dropped. This is
/// the executor's only backpressure point.
pub struct BoundedQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Create a queue with a fixed capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be > 0");
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// Enqueue an item, blocking until capacity is available.
    pub fn put(&self, item: T) -> Result<()> {
        let mut items = self.items.lock()?;
        while items.len() >= self.capacity {
            items = self.not_full.wait(items)?;
        }
        items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue an item, blocking until one is available.
    pub fn take(&self) -> Result<T> {
        let mut items = self.items.lock()?;
        let item = loop {
            match items.pop_front() {
                Some(item) => break item,
                None => items = self.not_empty.wait(items)?,
            }
        };
        self.not_full.notify_one();
        Ok(item)
    }

    /// Number of items currently queued.
    pub fn len(&self) -> Result<usize> {
        Ok(self.items.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.items.lock()?.is_empty())
    }

    /// Remove and return everything still queued, waking blocked producers.
    /// Used only by forced shutdown to cancel not-yet-started work.
    pub fn drain(&self) -> Result<Vec<T>> {
        let mut items = self.items.lock()?;
        let drained = items.drain(..).collect();
        self.not_full.notify_all();
        Ok(drained)
    }
}
