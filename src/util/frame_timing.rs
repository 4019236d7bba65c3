//! Frame-rate monitoring for ticker-driven animations.

use web_time::{Duration, Instant};

/// Frame rate at or above which an animation counts as performant.
pub const PERFORMANT_FPS: f32 = 30.0;

/// Summary of a monitored animation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationMetrics {
    /// Time between monitoring start and the last recorded frame.
    pub duration: Duration,
    /// Number of frames recorded.
    pub frame_count: u32,
    /// Mean frames per second over `duration` (0 when nothing ran).
    pub average_fps: f32,
    /// Whether `average_fps` exceeds [`PERFORMANT_FPS`].
    pub is_performant: bool,
}

/// Frame counter for a single animation run.
#[derive(Debug, Clone)]
pub struct AnimationPerformance {
    /// Monitoring start
    start: Instant,
    /// Last frame timestamp
    last_frame: Instant,
    /// Frames since start
    frame_count: u32,
}

impl AnimationPerformance {
    /// Create a monitor starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            frame_count: 0,
        }
    }

    /// Reset the counters and restart the clock.
    pub fn start_monitoring(&mut self) {
        self.start_monitoring_at(Instant::now());
    }

    /// Reset the counters using an explicit start time.
    pub fn start_monitoring_at(&mut self, now: Instant) {
        self.start = now;
        self.last_frame = now;
        self.frame_count = 0;
    }

    /// Record a frame rendered now.
    pub fn record_frame(&mut self) {
        self.record_frame_at(Instant::now());
    }

    /// Record a frame rendered at `now`.
    pub fn record_frame_at(&mut self, now: Instant) {
        self.frame_count = self.frame_count.saturating_add(1);
        self.last_frame = now;
    }

    /// Metrics for the frames recorded so far.
    #[must_use]
    pub fn metrics(&self) -> AnimationMetrics {
        let duration = self.last_frame.saturating_duration_since(self.start);
        let secs = duration.as_secs_f32();
        let average_fps = if secs > 0.0 {
            self.frame_count as f32 / secs
        } else {
            0.0
        };
        AnimationMetrics {
            duration,
            frame_count: self.frame_count,
            average_fps,
            is_performant: average_fps > PERFORMANT_FPS,
        }
    }
}

impl Default for AnimationPerformance {
    fn default() -> Self {
        Self::new()
    }
}
