//! Reconstruction of monotonically increasing totals from 32-bit device
//! counters.
//!
//! The router reports cumulative byte counts in 32-bit registers, so a busy
//! line wraps them every few gigabytes. The tracker watches consecutive raw
//! samples per direction and widens the counters by `overflows << 32`.

use crate::types::RawSample;

/// Width of the device's counter registers.
const COUNTER_BITS: u32 = 32;

/// Detects counter wraparound between consecutive raw samples and
/// reconstructs cumulative totals relative to a session baseline.
///
/// Each direction has its own overflow count; receive and send counters wrap
/// independently. Detection assumes at most one wrap per sample interval,
/// which holds for any realistic line speed at sub-second cadence.
#[derive(Debug, Clone)]
pub struct OverflowTracker {
    start: RawSample,
    last: RawSample,
    recv_overflows: u64,
    send_overflows: u64,
}

impl OverflowTracker {
    /// Create a tracker with `baseline` as the session start sample.
    pub fn new(baseline: RawSample) -> Self {
        Self {
            start: baseline,
            last: baseline,
            recv_overflows: 0,
            send_overflows: 0,
        }
    }

    /// Fold `current` into the session and return the corrected cumulative
    /// `(received, sent)` totals since the baseline.
    ///
    /// A direction whose raw total went numerically backwards since the
    /// previous sample is taken to have wrapped exactly once.
    pub fn correct(&mut self, current: RawSample) -> (u64, u64) {
        if current.total_received < self.last.total_received {
            self.recv_overflows += 1;
        }
        if current.total_sent < self.last.total_sent {
            self.send_overflows += 1;
        }

        // Wrapping arithmetic keeps the mod-2^64 identity
        // `current - start + (overflows << 32)` intact even while
        // `current < start` right after a wrap.
        let received = current
            .total_received
            .wrapping_sub(self.start.total_received)
            .wrapping_add(self.recv_overflows << COUNTER_BITS);
        let sent = current
            .total_sent
            .wrapping_sub(self.start.total_sent)
            .wrapping_add(self.send_overflows << COUNTER_BITS);

        self.last = current;
        (received, sent)
    }

    /// Number of receive-counter wraps observed this session.
    #[must_use]
    pub const fn recv_overflows(&self) -> u64 {
        self.recv_overflows
    }

    /// Number of send-counter wraps observed this session.
    #[must_use]
    pub const fn send_overflows(&self) -> u64 {
        self.send_overflows
    }
}

/// Difference between two reads of one 32-bit counter, assuming at most one
/// wrap in between. Used for window-endpoint deltas in rate smoothing.
pub(crate) fn wrapped_delta(current: u64, earlier: u64) -> u64 {
    if current >= earlier {
        current - earlier
    } else {
        (1u64 << COUNTER_BITS) - (earlier - current)
    }
}
