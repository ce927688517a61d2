use quarry_tick::TickStats;
use std::fmt;
use std::time::Duration;

/// Scheduler health as shown in the debug panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub frequency_hz: f64,
    pub stats: TickStats,
}

impl TickReport {
    pub fn new(frequency_hz: f64, stats: TickStats) -> Self {
        Self {
            frequency_hz,
            stats,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frequency_hz)
    }

    /// Average busy time as a fraction of the period.
    pub fn load(&self) -> f64 {
        self.stats.avg_busy.as_secs_f64() * self.frequency_hz
    }

    /// Share of ticks that overran, 0 when nothing ran yet.
    pub fn overrun_ratio(&self) -> f64 {
        if self.stats.ticks == 0 {
            0.0
        } else {
            self.stats.overruns as f64 / self.stats.ticks as f64
        }
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} Hz load={:.0}% overruns={}/{} avg={:.2?} max={:.2?}",
            self.frequency_hz,
            self.load() * 100.0,
            self.stats.overruns,
            self.stats.ticks,
            self.stats.avg_busy,
            self.stats.max_busy
        )
    }
}

/// Render-thread timing for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    /// Seconds since start.
    pub app_time: f64,
    /// Frame-to-frame delta seen by the camera.
    pub frame_dt: Duration,
    /// Time spent in the frame body, before the limiter slept.
    pub cpu_time: Duration,
    pub limiter_hz: f64,
    pub sim_tick: u64,
}

impl FrameReport {
    pub fn fps(&self) -> f64 {
        let dt = self.frame_dt.as_secs_f64();
        if dt > 0.0 { 1.0 / dt } else { 0.0 }
    }
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame={} t={:.2}s fps={:.0} cpu={:.2?} limit={:.0} Hz sim_tick={}",
            self.frame_index,
            self.app_time,
            self.fps(),
            self.cpu_time,
            self.limiter_hz,
            self.sim_tick
        )
    }
}
