//! Bounded sample history used to smooth rates over several intervals.

use std::collections::VecDeque;

use crate::types::TimedSample;

/// Fixed-capacity FIFO of timed samples.
///
/// The window is created around a seed sample and can never be empty
/// afterwards, so the comparison endpoints for rate calculation are always
/// available. Pushing at capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: VecDeque<TimedSample>,
    capacity: usize,
}

impl RollingWindow {
    /// Create a window holding at most `capacity` samples, seeded with
    /// `seed`. A capacity of zero is treated as one.
    pub fn new(capacity: usize, seed: TimedSample) -> Self {
        let capacity = capacity.max(1);
        let mut samples = VecDeque::with_capacity(capacity);
        samples.push_back(seed);
        Self { samples, capacity }
    }

    /// Append `sample`, evicting the oldest entry when at capacity.
    pub fn push(&mut self, sample: TimedSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Oldest retained sample, the far endpoint for rate smoothing.
    #[must_use]
    pub fn oldest(&self) -> &TimedSample {
        // Non-empty by construction.
        &self.samples[0]
    }

    /// Most recently pushed sample.
    #[must_use]
    pub fn newest(&self) -> &TimedSample {
        &self.samples[self.samples.len() - 1]
    }

    /// Number of samples currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawSample;
    use std::time::{Duration, Instant};

    fn timed(origin: Instant, offset_ms: u64, recv: u64) -> TimedSample {
        TimedSample::new(
            origin + Duration::from_millis(offset_ms),
            RawSample {
                total_received: recv,
                ..RawSample::default()
            },
        )
    }

    #[test]
    fn seed_is_both_endpoints() {
        let origin = Instant::now();
        let window = RollingWindow::new(4, timed(origin, 0, 10));
        assert_eq!(window.len(), 1);
        assert_eq!(window.oldest().raw.total_received, 10);
        assert_eq!(window.newest().raw.total_received, 10);
    }

    #[test]
    fn never_exceeds_capacity() {
        let origin = Instant::now();
        let mut window = RollingWindow::new(3, timed(origin, 0, 0));
        for i in 1..10 {
            window.push(timed(origin, i * 100, i));
            assert!(window.len() <= 3);
        }
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn eviction_is_fifo() {
        let origin = Instant::now();
        let mut window = RollingWindow::new(3, timed(origin, 0, 1));
        window.push(timed(origin, 100, 2));
        window.push(timed(origin, 200, 3));
        assert_eq!(window.oldest().raw.total_received, 1);

        // Fourth push evicts the seed; the second-ever sample becomes oldest.
        window.push(timed(origin, 300, 4));
        assert_eq!(window.oldest().raw.total_received, 2);
        assert_eq!(window.newest().raw.total_received, 4);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let origin = Instant::now();
        let mut window = RollingWindow::new(0, timed(origin, 0, 1));
        window.push(timed(origin, 100, 2));
        assert_eq!(window.len(), 1);
        assert_eq!(window.oldest().raw.total_received, 2);
    }
}
