use crate::error::TickError;
use crate::rate::TickRate;
use std::fmt;
use std::time::{Duration, Instant};

/// Result of closing one tick with [`TickScheduler::wait_for_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick body finished early; the scheduler slept for the remainder.
    OnTime { slept: Duration },
    /// The tick body took at least a full period. Nothing was slept and the
    /// late time is not repaid by later ticks.
    Overrun { late_by: Duration },
    /// The scheduler is inactive or no tick was open; returned immediately.
    Unthrottled,
}

impl TickOutcome {
    pub fn is_overrun(&self) -> bool {
        matches!(self, Self::Overrun { .. })
    }
}

/// Timing statistics accumulated over every closed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Ticks closed by `wait_for_end` while active.
    pub ticks: u64,
    /// Ticks whose body ran for a full period or longer.
    pub overruns: u64,
    pub min_busy: Duration,
    pub max_busy: Duration,
    /// Rolling average of the tick body time.
    pub avg_busy: Duration,
    /// Total time ticks ran past their period, oversleep included.
    pub drift: Duration,
}

impl TickStats {
    fn record(&mut self, busy: Duration, total: Duration, period: Duration, overrun: bool) {
        if self.ticks == 0 {
            self.min_busy = busy;
            self.max_busy = busy;
            self.avg_busy = busy;
        } else {
            self.min_busy = self.min_busy.min(busy);
            self.max_busy = self.max_busy.max(busy);
            self.avg_busy = (self.avg_busy * 15 + busy) / 16;
        }
        self.ticks += 1;
        if overrun {
            self.overruns += 1;
        }
        self.drift += total.saturating_sub(period);
    }
}

impl fmt::Display for TickStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks={} overruns={} busy(min/avg/max)={:.2?}/{:.2?}/{:.2?} drift={:.2?}",
            self.ticks, self.overruns, self.min_busy, self.avg_busy, self.max_busy, self.drift
        )
    }
}

/// Fixed-rate tick scheduler.
///
/// One loop iteration is bracketed by [`start`](Self::start) and
/// [`wait_for_end`](Self::wait_for_end):
///
/// ```
/// # use quarry_tick::TickScheduler;
/// let mut ticks = TickScheduler::new(1000.0)?;
/// ticks.activate();
/// for _ in 0..3 {
///     ticks.start();
///     // tick work
///     ticks.wait_for_end();
/// }
/// # Ok::<(), quarry_tick::TickError>(())
/// ```
///
/// `activate` on an already active scheduler is a no-op: the baseline captured
/// by the first call is kept for the next `wait_for_end`.
#[derive(Debug)]
pub struct TickScheduler {
    rate: TickRate,
    active: bool,
    tick_start: Option<Instant>,
    hz: f64,
    period: Duration,
    next_index: u64,
    stats: TickStats,
}

impl TickScheduler {
    pub fn new(hz: f64) -> Result<Self, TickError> {
        Ok(Self::with_rate(TickRate::new(hz)?))
    }

    /// Build a scheduler driven by a shared rate handle.
    pub fn with_rate(rate: TickRate) -> Self {
        let hz = rate.hz();
        let period = rate.period();
        Self {
            rate,
            active: false,
            tick_start: None,
            hz,
            period,
            next_index: 0,
            stats: TickStats::default(),
        }
    }

    pub fn rate(&self) -> &TickRate {
        &self.rate
    }

    /// Change the target frequency. Applies from the next `start()`.
    pub fn set_frequency(&self, hz: f64) -> Result<(), TickError> {
        self.rate.set(hz)
    }

    /// Current target frequency (may differ from the latched one mid-tick).
    pub fn frequency(&self) -> f64 {
        self.rate.hz()
    }

    /// Period latched for the current tick.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Fixed timestep in seconds for the current tick, `1 / frequency`.
    pub fn fixed_delta(&self) -> f32 {
        (1.0 / self.hz) as f32
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Arm the scheduler and capture the baseline for the first tick.
    pub fn activate(&mut self) {
        if self.active {
            tracing::trace!("tick scheduler already active; baseline kept");
            return;
        }
        self.latch();
        self.active = true;
        self.tick_start = Some(Instant::now());
        tracing::debug!(hz = self.hz, "tick scheduler activated");
    }

    /// Disarm the scheduler. `wait_for_end` stops sleeping until re-activated.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.tick_start = None;
    }

    /// Open a tick. Returns its index, counting from zero.
    pub fn start(&mut self) -> u64 {
        self.latch();
        self.tick_start = Some(Instant::now());
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    /// Close the open tick, sleeping out whatever is left of its period.
    pub fn wait_for_end(&mut self) -> TickOutcome {
        let Some(start) = self.tick_start.take() else {
            return TickOutcome::Unthrottled;
        };
        if !self.active {
            return TickOutcome::Unthrottled;
        }

        let busy = start.elapsed();
        let outcome = match self.period.checked_sub(busy) {
            Some(remaining) if !remaining.is_zero() => {
                std::thread::sleep(remaining);
                TickOutcome::OnTime { slept: remaining }
            }
            _ => {
                let late_by = busy - self.period;
                tracing::debug!(
                    ?busy,
                    ?late_by,
                    period = ?self.period,
                    "tick overrun"
                );
                TickOutcome::Overrun { late_by }
            }
        };

        self.stats
            .record(busy, start.elapsed(), self.period, outcome.is_overrun());
        outcome
    }

    fn latch(&mut self) {
        self.hz = self.rate.hz();
        self.period = self.rate.period();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Duration, b: Duration) -> bool {
        (a.as_secs_f64() - b.as_secs_f64()).abs() < 1e-6
    }

    #[test]
    fn zero_frequency_rejected_before_any_tick() {
        assert!(matches!(
            TickScheduler::new(0.0),
            Err(TickError::InvalidFrequency(_))
        ));
        assert!(TickScheduler::new(-45.0).is_err());
        assert!(TickScheduler::new(f64::NAN).is_err());
    }

    #[test]
    fn set_frequency_rejects_invalid_and_keeps_rate() {
        let ticks = TickScheduler::new(45.0).unwrap();
        assert!(ticks.set_frequency(0.0).is_err());
        assert!(ticks.set_frequency(-1.0).is_err());
        assert_eq!(ticks.frequency(), 45.0);
    }

    #[test]
    fn fixed_delta_matches_frequency() {
        let ticks = TickScheduler::new(45.0).unwrap();
        assert!((ticks.fixed_delta() - 1.0 / 45.0).abs() < 1e-7);
    }

    #[test]
    fn start_returns_consecutive_indices() {
        let mut ticks = TickScheduler::new(1000.0).unwrap();
        ticks.activate();
        assert_eq!(ticks.start(), 0);
        ticks.wait_for_end();
        assert_eq!(ticks.start(), 1);
    }

    #[test]
    fn zero_cost_ticks_hold_the_rate() {
        const HZ: f64 = 200.0;
        const N: u32 = 20;
        let mut ticks = TickScheduler::new(HZ).unwrap();
        ticks.activate();

        // `first` is taken before the first tick opens and `last` after the
        // final one opens, so the span bounds the tick starts from outside.
        let first = Instant::now();
        let mut last = first;
        for _ in 0..N {
            ticks.start();
            last = Instant::now();
            ticks.wait_for_end();
        }
        let span = last - first;
        let expected = ticks.period() * (N - 1);

        assert!(span >= expected, "span {span:?} < expected {expected:?}");
        assert!(
            span <= expected + Duration::from_millis(100),
            "span {span:?} too long for {expected:?}"
        );
        assert_eq!(ticks.stats().ticks, u64::from(N));
    }

    #[test]
    fn physics_rate_with_five_ms_body() {
        const HZ: f64 = 45.0;
        const N: u32 = 100;
        let mut ticks = TickScheduler::new(HZ).unwrap();
        ticks.activate();

        let begin = Instant::now();
        for _ in 0..N {
            ticks.start();
            std::thread::sleep(Duration::from_millis(5));
            ticks.wait_for_end();
        }
        let wall = begin.elapsed().as_secs_f64();
        let expected = f64::from(N) / HZ;

        assert!(wall >= expected * 0.95, "wall {wall} vs {expected}");
        assert!(wall <= expected * 1.10, "wall {wall} vs {expected}");
        assert_eq!(ticks.stats().overruns, 0);
    }

    #[test]
    fn overrun_returns_immediately_and_is_not_repaid() {
        let mut ticks = TickScheduler::new(100.0).unwrap();
        ticks.activate();

        ticks.start();
        std::thread::sleep(Duration::from_millis(25));
        let before = Instant::now();
        let outcome = ticks.wait_for_end();
        assert!(outcome.is_overrun());
        assert!(before.elapsed() < Duration::from_millis(5));

        // The next tick still gets its full period.
        let begin = Instant::now();
        ticks.start();
        assert!(matches!(ticks.wait_for_end(), TickOutcome::OnTime { .. }));
        assert!(begin.elapsed() >= Duration::from_millis(10));

        let stats = ticks.stats();
        assert_eq!(stats.ticks, 2);
        assert_eq!(stats.overruns, 1);
        assert!(stats.drift >= Duration::from_millis(15));
    }

    #[test]
    fn double_activate_keeps_first_baseline() {
        // 20 Hz: a kept baseline ends the wait ~50 ms after the first
        // activate; a reset one would end it ~75 ms after.
        let mut ticks = TickScheduler::new(20.0).unwrap();
        let begin = Instant::now();
        ticks.activate();
        std::thread::sleep(Duration::from_millis(25));
        ticks.activate();
        assert!(ticks.is_active());

        ticks.wait_for_end();
        let waited = begin.elapsed();
        assert!(waited >= Duration::from_millis(50), "{waited:?}");
        assert!(waited < Duration::from_millis(70), "{waited:?}");
    }

    #[test]
    fn frequency_change_applies_on_next_start() {
        let mut ticks = TickScheduler::new(100.0).unwrap();
        ticks.activate();

        ticks.start();
        ticks.set_frequency(50.0).unwrap();
        assert!(approx(ticks.period(), Duration::from_millis(10)));
        assert_eq!(ticks.frequency(), 50.0);
        ticks.wait_for_end();

        ticks.start();
        assert!(approx(ticks.period(), Duration::from_millis(20)));
        assert!((ticks.fixed_delta() - 0.02).abs() < 1e-7);
    }

    #[test]
    fn inactive_scheduler_does_not_sleep() {
        let mut ticks = TickScheduler::new(1.0).unwrap();
        let begin = Instant::now();
        ticks.start();
        assert_eq!(ticks.wait_for_end(), TickOutcome::Unthrottled);
        assert!(begin.elapsed() < Duration::from_millis(100));
        assert_eq!(ticks.stats().ticks, 0);
    }

    #[test]
    fn wait_without_open_tick_is_unthrottled() {
        let mut ticks = TickScheduler::new(1000.0).unwrap();
        ticks.activate();
        ticks.start();
        ticks.wait_for_end();
        assert_eq!(ticks.wait_for_end(), TickOutcome::Unthrottled);
    }

    #[test]
    fn deactivate_disarms() {
        let mut ticks = TickScheduler::new(1.0).unwrap();
        ticks.activate();
        ticks.deactivate();
        assert!(!ticks.is_active());
        ticks.start();
        assert_eq!(ticks.wait_for_end(), TickOutcome::Unthrottled);
    }

    #[test]
    fn stats_display() {
        let mut ticks = TickScheduler::new(1000.0).unwrap();
        ticks.activate();
        ticks.start();
        ticks.wait_for_end();
        let s = format!("{}", ticks.stats());
        assert!(s.contains("ticks=1"));
        assert!(s.contains("overruns=0"));
    }
}
