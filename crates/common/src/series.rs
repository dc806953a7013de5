use std::collections::VecDeque;

use crate::Sample;

/// Default retained-sample cap for a dashboard series.
pub const DEFAULT_CAPACITY: usize = 100;

/// Ordered, capacity-limited store of samples for one dashboard instance.
///
/// Invariant: `len() <= capacity` after every append; when an append would
/// exceed the cap, the oldest samples are evicted from the head (FIFO).
/// There is no removal-by-key, eviction is strictly by age.
#[derive(Debug, Clone)]
pub struct BoundedSeriesBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl BoundedSeriesBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert one sample at the tail, evicting from the head if over cap.
    ///
    /// Never fails, duplicate timestamps are kept as-is.
    pub fn append(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Batch append. An empty batch is a no-op, never an error.
    pub fn extend<I: IntoIterator<Item = Sample>>(&mut self, batch: I) {
        for sample in batch {
            self.append(sample);
        }
    }

    /// Current contents in insertion order, as an owned copy the renderer
    /// can keep past the next append.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BoundedSeriesBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
