//! Frame timing for drivers.
//!
//! The simulation itself is frame-stepped and never looks at wall-clock
//! time; [`FrameClock`] exists for loops that want to report throughput.
//!
//! # Example
//!
//! ```ignore
//! use orbfield::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//! loop {
//!     sim.render(&mut sink)?;
//!     clock.tick();
//!     log::debug!("frame {} at {:.1} fps", clock.frame(), clock.fps());
//! }
//! ```

use std::time::{Duration, Instant};

/// Frame counter with delta time and a periodically refreshed FPS figure.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    delta_secs: f32,
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Create a clock starting now, refreshing FPS every 500 ms.
    pub fn new() -> Self {
        Self::with_fps_interval(Duration::from_millis(500))
    }

    /// Create a clock that refreshes its FPS figure every `interval`.
    pub fn with_fps_interval(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: interval,
        }
    }

    /// Mark the end of a frame. Returns the time since the previous one.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    /// Seconds since the clock was created.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Seconds between the last two ticks.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
