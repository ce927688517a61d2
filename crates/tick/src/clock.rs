use std::time::{Duration, Instant};

/// Timing for one rendered frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameTime {
    /// Seconds since the previous frame, clamped.
    pub dt: f32,
    /// Seconds since the clock was created.
    pub elapsed: f64,
    pub frame_index: u64,
}

/// Variable-rate frame clock for the render thread.
///
/// Deltas are clamped so a stall (debugger, window drag) does not fling the
/// camera across the map on the next frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
    last: Instant,
    frame_index: u64,
    max_dt: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_dt(Duration::from_millis(100))
    }

    pub fn with_max_dt(max_dt: Duration) -> Self {
        let now = Instant::now();
        Self {
            origin: now,
            last: now,
            frame_index: 0,
            max_dt,
        }
    }

    /// Forget the time spent since the last frame, e.g. after a long load.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last).min(self.max_dt);
        self.last = now;
        self.frame_index += 1;
        FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.origin).as_secs_f64(),
            frame_index: self.frame_index,
        }
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_increments() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.tick().frame_index, 2);
        assert_eq!(clock.frame_index(), 2);
    }

    #[test]
    fn dt_is_clamped() {
        let mut clock = FrameClock::with_max_dt(Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(20));
        let t = clock.tick();
        assert!(t.dt <= 0.005 + f32::EPSILON);
        assert!(t.elapsed >= 0.020);
    }

    #[test]
    fn reset_drops_pending_time() {
        let mut clock = FrameClock::new();
        std::thread::sleep(Duration::from_millis(20));
        clock.reset();
        assert!(clock.tick().dt < 0.015);
    }
}
