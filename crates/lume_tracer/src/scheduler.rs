//! Bounded fan-out of shading work.
//!
//! Recursive shading branches per light and per bounce direction, so the
//! number of tasks grows geometrically with depth. The scheduler counts the
//! tasks alive at any moment; a fan-out that would push the count past the
//! limit runs serially on the calling thread instead of on the pool.

use std::sync::atomic::{AtomicUsize, Ordering};

use lume_math::Energy;
use rayon::prelude::*;

#[derive(Debug)]
pub struct TaskScheduler {
    live: AtomicUsize,
    peak: AtomicUsize,
    limit: usize,
}

/// Reservation of task slots, released on drop.
struct Permit<'a> {
    live: &'a AtomicUsize,
    count: usize,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.live.fetch_sub(self.count, Ordering::AcqRel);
    }
}

impl TaskScheduler {
    pub fn new(limit: usize) -> Self {
        Self {
            live: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            limit,
        }
    }

    fn reserve(&self, count: usize) -> Option<Permit<'_>> {
        let reserved = self
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                let wanted = live + count;
                (wanted <= self.limit).then_some(wanted)
            })
            .ok()?;

        self.peak.fetch_max(reserved + count, Ordering::AcqRel);
        Some(Permit { live: &self.live, count })
    }

    /// Evaluate `task` for every item and add up the results.
    ///
    /// The order of summation is unspecified.
    pub fn sum<T, F>(&self, items: &[T], task: F) -> Energy
    where
        T: Sync,
        F: Fn(&T) -> Energy + Sync + Send,
    {
        if items.len() > 1 {
            if let Some(_permit) = self.reserve(items.len()) {
                return items.par_iter().map(&task).reduce(|| Energy::ZERO, |a, b| a + b);
            }
        }

        items.iter().map(task).fold(Energy::ZERO, |a, b| a + b)
    }

    /// Tasks currently holding a slot.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Highest number of live tasks seen so far.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
