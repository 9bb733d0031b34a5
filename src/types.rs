#![allow(clippy::cast_precision_loss)]

use std::time::Instant;

use bytesize::ByteSize;

/// A single point-in-time read of the device's traffic counters.
///
/// The cumulative totals are monotonic on the device side but stored in
/// 32-bit registers, so they wrap back to zero past `u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    /// Cumulative bytes received since the device booted
    pub total_received: u64,
    /// Cumulative bytes sent since the device booted
    pub total_sent: u64,
    /// Device-reported instantaneous receive rate in bytes per second
    pub recv_rate: u64,
    /// Device-reported instantaneous send rate in bytes per second
    pub send_rate: u64,
}

/// A raw sample together with the monotonic time it was taken at.
#[derive(Debug, Clone, Copy)]
pub struct TimedSample {
    pub timestamp: Instant,
    pub raw: RawSample,
}

impl TimedSample {
    pub fn new(timestamp: Instant, raw: RawSample) -> Self {
        Self { timestamp, raw }
    }
}

/// One output record of the monitor.
///
/// Totals are cumulative since the session baseline, reconstructed across
/// 32-bit counter wraps. Rates are smoothed over the rolling window, except
/// for warm-up reports which pass through the device's instantaneous rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficReport {
    /// Bytes received since the session baseline
    pub total_received: u64,
    /// Bytes sent since the session baseline
    pub total_sent: u64,
    /// Smoothed receive rate in bytes per second
    pub recv_rate: f64,
    /// Smoothed send rate in bytes per second
    pub send_rate: f64,
}

impl std::fmt::Display for TrafficReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "recv {}/s sent {}/s (totals: {} / {})",
            ByteSize::b(self.recv_rate as u64),
            ByteSize::b(self.send_rate as u64),
            ByteSize::b(self.total_received),
            ByteSize::b(self.total_sent),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_display_is_human_readable() {
        let report = TrafficReport {
            total_received: 1_048_576,
            total_sent: 2048,
            recv_rate: 1024.0,
            send_rate: 512.0,
        };
        let text = report.to_string();
        assert!(text.contains("recv"), "{text}");
        assert!(text.contains("sent"), "{text}");
    }
}
