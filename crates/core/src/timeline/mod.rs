use std::{cell::Cell, rc::Rc, time::Duration, time::Instant};

/// Monotonic time source. Readings are durations since an arbitrary epoch
/// fixed for the lifetime of the clock.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Hand-driven clock for deterministic hosts and tests. Clones share the
/// same reading, so a host can keep a handle while the controller owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    /// Readings beyond [`Duration::MAX`] saturate.
    pub fn set_secs(&self, seconds: f64) {
        self.set(duration_from_secs(seconds));
    }

    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get().saturating_add(delta));
    }

    pub fn advance_secs(&self, seconds: f64) {
        self.advance(duration_from_secs(seconds));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Pause-aware stopwatch. Time spent paused is accumulated separately so
/// that resuming continues from the frozen point.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlaybackClock {
    origin: Duration,
    paused_total: Duration,
    paused_at: Option<Duration>,
}

impl PlaybackClock {
    /// Starts a running clock at `now`.
    pub fn start(now: Duration) -> Self {
        Self {
            origin: now,
            paused_total: Duration::ZERO,
            paused_at: None,
        }
    }

    /// Restarts at `now`, running, with no paused time.
    pub fn reset(&mut self, now: Duration) {
        *self = Self::start(now);
    }

    pub fn pause(&mut self, now: Duration) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now.max(self.origin));
        }
    }

    pub fn resume(&mut self, now: Duration) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_sub(paused_at);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Time since the origin regardless of pauses.
    pub fn wall_elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.origin)
    }

    /// Time since the origin excluding every pause, including an ongoing one.
    pub fn play_elapsed(&self, now: Duration) -> Duration {
        let effective_now = self.paused_at.unwrap_or(now);
        effective_now
            .saturating_sub(self.origin)
            .saturating_sub(self.paused_total)
    }
}

/// Seconds as a [`Duration`]: negative and non-finite values become zero,
/// values too large to represent become [`Duration::MAX`].
pub fn duration_from_secs(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(sanitize_seconds(seconds)).unwrap_or(Duration::MAX)
}

/// Clamps negative and non-finite seconds to zero.
pub(crate) fn sanitize_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}
