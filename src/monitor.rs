//! The sampling engine: periodic fetches, wraparound correction and rolling
//! window rate smoothing, exposed as an infinite report iterator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::overflow::{wrapped_delta, OverflowTracker};
use crate::source::SampleSource;
use crate::types::{RawSample, TimedSample, TrafficReport};
use crate::window::RollingWindow;
use crate::{Error, Result};

/// Default pause between samples.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);
/// Default number of samples rates are smoothed over.
pub const DEFAULT_WINDOW_SIZE: usize = 30;
/// Default number of warm-up reports before smoothing kicks in.
pub const DEFAULT_IGNORE_INITIAL: u32 = 1;

/// Cloneable handle that stops a running monitor from another thread.
///
/// The monitor checks the flag once per sampling cycle; cancellation takes
/// effect before the next fetch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the monitor to stop after the current cycle.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Where the monitor is in its lifecycle.
#[derive(Debug)]
enum Phase {
    /// Emitting device-reported rates while re-seeding the baseline each
    /// cycle; the count is the number of warm-up reports still owed.
    Warmup(u32),
    /// No baseline yet and no warm-up reports requested; the first fetch
    /// seeds silently.
    Unseeded,
    /// Baseline established, window seeded, smoothed reports flowing.
    Steady,
}

/// Per-session sampling state: the seeded window plus the overflow tracker.
#[derive(Debug)]
struct Session {
    window: RollingWindow,
    tracker: OverflowTracker,
}

/// Drives periodic sampling of a [`SampleSource`] and yields
/// [`TrafficReport`]s.
///
/// One monitor is one session: the baseline, overflow counters and rolling
/// window all live exactly as long as the monitor, so independent monitors
/// never share state. Configuration uses builder-style methods:
///
/// ```no_run
/// use std::time::Duration;
/// use fritzmon::{SoapSource, TrafficMonitor};
///
/// let source = SoapSource::new("fritz.box", 49000)?;
/// let monitor = TrafficMonitor::new(source)
///     .sample_interval(Duration::from_millis(100))
///     .window_size(30)
///     .ignore_initial(1);
/// for report in monitor.reports() {
///     println!("{}", report?);
/// }
/// # Ok::<(), fritzmon::Error>(())
/// ```
#[derive(Debug)]
pub struct TrafficMonitor<S> {
    source: S,
    sample_interval: Duration,
    window_size: usize,
    ignore_initial: u32,
    cancel: CancelToken,
}

impl<S: SampleSource> TrafficMonitor<S> {
    /// Create a monitor with the default cadence (100 ms interval, window of
    /// 30 samples, one warm-up report).
    pub fn new(source: S) -> Self {
        Self {
            source,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            window_size: DEFAULT_WINDOW_SIZE,
            ignore_initial: DEFAULT_IGNORE_INITIAL,
            cancel: CancelToken::new(),
        }
    }

    /// Set the pause between samples.
    #[must_use]
    pub fn sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Set how many samples rates are smoothed over. Zero is clamped to one.
    #[must_use]
    pub fn window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Set the number of warm-up reports that pass through the device's own
    /// instantaneous rates before smoothing begins.
    #[must_use]
    pub fn ignore_initial(mut self, count: u32) -> Self {
        self.ignore_initial = count;
        self
    }

    /// Handle for stopping the report stream from another thread.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Consume the monitor and return the infinite report stream.
    ///
    /// The stream never restarts: the first fetch establishes the session
    /// baseline and a fetch error is terminal (one `Err` item, then `None`).
    pub fn reports(self) -> Reports<S> {
        let phase = if self.ignore_initial > 0 {
            Phase::Warmup(self.ignore_initial)
        } else {
            Phase::Unseeded
        };
        Reports {
            monitor: self,
            phase,
            session: None,
            started: false,
            failed: false,
        }
    }
}

/// Infinite, non-restartable stream of traffic reports.
///
/// Produced by [`TrafficMonitor::reports`]. Each `next` call blocks for one
/// sampling cycle (sleep plus fetch). The stream ends only on cancellation
/// or after a terminal fetch error.
#[derive(Debug)]
pub struct Reports<S> {
    monitor: TrafficMonitor<S>,
    phase: Phase,
    session: Option<Session>,
    started: bool,
    failed: bool,
}

impl<S: SampleSource> Reports<S> {
    /// Fetch a sample and make it the session baseline, discarding any
    /// previous baseline. Every warm-up cycle lands here, so only the last
    /// warm-up sample sticks as the true session start.
    fn seed_at(&mut self, now: Instant) -> Result<RawSample> {
        let raw = self.monitor.source.fetch()?;
        self.session = Some(Session {
            window: RollingWindow::new(self.monitor.window_size, TimedSample::new(now, raw)),
            tracker: OverflowTracker::new(raw),
        });
        Ok(raw)
    }

    /// One warm-up cycle: re-seed the baseline and pass the device's own
    /// instantaneous rates through with zero cumulative totals.
    fn warmup_step_at(&mut self, now: Instant) -> Result<TrafficReport> {
        let raw = self.seed_at(now)?;
        log::debug!("warm-up sample, device rates {}/{} B/s", raw.recv_rate, raw.send_rate);
        Ok(TrafficReport {
            total_received: 0,
            total_sent: 0,
            recv_rate: raw.recv_rate as f64,
            send_rate: raw.send_rate as f64,
        })
    }

    /// One steady-state cycle: fetch, correct for wraparound against the
    /// previous sample, smooth rates against the oldest window entry.
    fn steady_step_at(&mut self, now: Instant) -> Result<TrafficReport> {
        let cur = self.monitor.source.fetch()?;
        let session = self.session.as_mut().ok_or(Error::Clock)?;

        let comp = *session.window.oldest();
        session.window.push(TimedSample::new(now, cur));
        let (total_received, total_sent) = session.tracker.correct(cur);

        // Elapsed time spans the whole window, not one interval; that is the
        // smoothing that damps scheduling and network jitter.
        let dt = now
            .checked_duration_since(comp.timestamp)
            .ok_or(Error::Clock)?;
        if dt.is_zero() {
            return Err(Error::Clock);
        }
        let dt = dt.as_secs_f64();

        Ok(TrafficReport {
            total_received,
            total_sent,
            recv_rate: wrapped_delta(cur.total_received, comp.raw.total_received) as f64 / dt,
            send_rate: wrapped_delta(cur.total_sent, comp.raw.total_sent) as f64 / dt,
        })
    }

    /// Advance one cycle using the caller-supplied timestamp. Sleeping and
    /// phase bookkeeping stay in `next`; this is the pure stepping core the
    /// unit tests drive with synthetic clocks.
    fn step_at(&mut self, now: Instant) -> Result<TrafficReport> {
        match self.phase {
            Phase::Warmup(remaining) => {
                let report = self.warmup_step_at(now)?;
                self.phase = if remaining > 1 {
                    Phase::Warmup(remaining - 1)
                } else {
                    Phase::Steady
                };
                Ok(report)
            }
            Phase::Unseeded => {
                // Unreachable from `next`, which seeds before stepping.
                Err(Error::Clock)
            }
            Phase::Steady => self.steady_step_at(now),
        }
    }

    fn fail(&mut self, err: Error) -> Option<Result<TrafficReport>> {
        log::warn!("sampling session ended: {err}");
        self.failed = true;
        Some(Err(err))
    }
}

impl<S: SampleSource> Iterator for Reports<S> {
    type Item = Result<TrafficReport>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.monitor.cancel.is_cancelled() {
            return None;
        }

        // Gap before every fetch except the very first one.
        if self.started {
            thread::sleep(self.monitor.sample_interval);
        }
        self.started = true;

        if matches!(self.phase, Phase::Unseeded) {
            if let Err(err) = self.seed_at(Instant::now()) {
                return self.fail(err);
            }
            self.phase = Phase::Steady;
            thread::sleep(self.monitor.sample_interval);
        }

        match self.step_at(Instant::now()) {
            Ok(report) => Some(Ok(report)),
            Err(err) => self.fail(err),
        }
    }
}
