//! Frame timing.
//!
//! The backdrops advance a fixed amount per frame, so time only matters for
//! diagnostics: counting frames, estimating the refresh rate, and holding
//! still while the surface is hidden.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // In the frame callback:
//! clock.tick();
//! println!("Frame {} at {:.1} fps", clock.frame(), clock.fps());
//! ```

use std::time::{Duration, Instant};

/// Frame counter and rate estimate for a frame loop.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    /// Time since the previous tick, in seconds.
    delta_secs: f32,
    /// Frames ticked since start (paused frames excluded).
    frame_count: u64,
    /// Estimated frames per second, refreshed every `fps_window`.
    fps: f32,
    fps_frame_count: u64,
    fps_window_start: Instant,
    fps_window: Duration,
    paused: bool,
    /// Total time spent paused.
    paused_for: Duration,
    paused_at: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_window_start: now,
            fps_window: Duration::from_millis(500),
            paused: false,
            paused_for: Duration::ZERO,
            paused_at: None,
        }
    }

    /// Record one frame. Returns the new frame number, or `None` while paused.
    pub fn tick(&mut self) -> Option<u64> {
        if self.paused {
            self.delta_secs = 0.0;
            return None;
        }

        let now = Instant::now();
        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;

        let window = now.duration_since(self.fps_window_start);
        if window >= self.fps_window {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / window.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_window_start = now;
        }

        Some(self.frame_count)
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop counting frames, e.g. while the surface is hidden.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.paused_at = Some(Instant::now());
        }
    }

    /// Resume counting. The hidden interval does not show up as a long frame.
    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            if let Some(at) = self.paused_at.take() {
                self.paused_for += now.duration_since(at);
            }
            self.last_frame = now;
            self.fps_window_start = now;
            self.fps_frame_count = self.frame_count;
            self.paused = false;
        }
    }

    /// Running time excluding pauses.
    pub fn elapsed(&self) -> Duration {
        let paused = self.paused_for
            + self
                .paused_at
                .map(|at| at.elapsed())
                .unwrap_or(Duration::ZERO);
        self.start.elapsed().saturating_sub(paused)
    }

    /// Change how often the fps estimate refreshes.
    pub fn set_fps_window(&mut self, window: Duration) {
        self.fps_window = window.max(Duration::from_millis(1));
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert!(!clock.is_paused());
        assert_eq!(clock.fps(), 0.0);
    }

    #[test]
    fn test_tick_counts_frames() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.tick(), Some(1));
        assert_eq!(clock.tick(), Some(2));
        assert!(clock.delta() >= 0.0);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_paused_ticks_are_ignored() {
        let mut clock = FrameClock::new();
        clock.tick();
        clock.pause();
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.frame(), 1);
        assert_eq!(clock.delta(), 0.0);

        clock.resume();
        assert_eq!(clock.tick(), Some(2));
    }

    #[test]
    fn test_resume_does_not_report_long_frame() {
        let mut clock = FrameClock::new();
        clock.pause();
        thread::sleep(Duration::from_millis(30));
        clock.resume();
        clock.tick();
        assert!(clock.delta() < 0.03);
    }

    #[test]
    fn test_fps_estimate() {
        let mut clock = FrameClock::new();
        clock.set_fps_window(Duration::from_millis(10));
        clock.tick();
        thread::sleep(Duration::from_millis(15));
        clock.tick();
        assert!(clock.fps() > 0.0);
    }

    #[test]
    fn test_elapsed_excludes_pauses() {
        let started = Instant::now();
        let mut clock = FrameClock::new();
        clock.pause();
        thread::sleep(Duration::from_millis(40));
        assert!(clock.elapsed() < Duration::from_millis(20));

        clock.resume();
        thread::sleep(Duration::from_millis(10));
        let elapsed = clock.elapsed();
        assert!(elapsed >= Duration::from_millis(10));
        assert!(elapsed + Duration::from_millis(40) <= started.elapsed());
    }
}
