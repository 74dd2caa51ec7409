use std::time::Instant;

use tracing::debug;

/// A millisecond tick counter.
pub trait TickSource {
    fn ticks(&mut self) -> u64;
}

/// Milliseconds since construction, from the monotonic clock.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicClock {
    fn ticks(&mut self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriftReport {
    pub iterations: u64,
    /// Largest distance from the first sample, in ticks
    pub max_elapsed: u64,
    /// Largest distance between two consecutive samples, in ticks
    pub max_step: u64,
}

/// Busy-loops `iterations` times, sampling `source` once per iteration.
pub fn measure<T: TickSource>(source: &mut T, iterations: u64) -> DriftReport {
    let start = source.ticks();
    let mut previous = start;
    let mut report = DriftReport { iterations, ..DriftReport::default() };

    for _ in 0..iterations {
        let now = source.ticks();
        report.max_elapsed = report.max_elapsed.max(now.saturating_sub(start));
        report.max_step = report.max_step.max(now.saturating_sub(previous));
        previous = now;
    }

    debug!(?report, "drift measurement finished");
    report
}
