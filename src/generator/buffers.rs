use std::collections::VecDeque;
use std::sync::Mutex;

/// Unbounded FIFO buffer of derivable identifiers.
///
/// The producer side is fed as a side effect of observing parent operation
/// results; the consumer side is polled by short read factories. An empty
/// buffer is the normal "cannot derive" condition, not an error, and each
/// id is polled at most once.
#[derive(Debug, Default)]
pub struct IdBuffer {
    ids: Mutex<VecDeque<u64>>,
}

impl IdBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, id: u64) {
        self.lock().push_back(id);
    }

    pub fn extend(&self, ids: impl IntoIterator<Item = u64>) {
        self.lock().extend(ids);
    }

    /// Remove and return the oldest id, if any.
    pub fn poll(&self) -> Option<u64> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<u64>> {
        match self.ids.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
