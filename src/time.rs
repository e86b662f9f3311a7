//! Frame timing and timer facilities.
//!
//! Provides the per-frame clock plus the two timer primitives the viewer
//! runs on: a periodic [`Interval`] (party-mode pulse) and a trailing-edge
//! [`Debounce`] (window resize). All of them are plain values polled by the
//! frame loop; there are no threads and no callbacks, so "cancelling" a
//! timer is just dropping it.
//!
//! # Example
//!
//! ```ignore
//! use snowglobe::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//!
//! // In your frame loop:
//! let (elapsed, delta) = clock.update();
//! println!("Elapsed: {:.2}s  Delta: {:.4}s  FPS: {:.1}", elapsed, delta, clock.fps());
//! ```

use std::time::{Duration, Instant};

/// Time tracking for the frame loop.
///
/// Provides elapsed time, delta time, frame counting, and a periodically
/// refreshed FPS estimate.
#[derive(Debug)]
pub struct FrameClock {
    /// When the clock was created.
    start: Instant,
    /// When the last frame occurred.
    last_frame: Instant,
    /// Total elapsed time in seconds (cached for fast access).
    elapsed_secs: f32,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)` for convenience.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Total elapsed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds (delta time).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
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

/// A repeating timer polled from the frame loop.
///
/// `poll` reports how many periods have elapsed since the last call, so a
/// stalled frame catches up rather than silently dropping ticks.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next_due: Instant,
}

impl Interval {
    /// Create an interval whose first tick is due one `period` after `now`.
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    /// Number of ticks that became due at or before `now`.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let mut fired = 0;
        while now >= self.next_due {
            self.next_due += self.period;
            fired += 1;
        }
        fired
    }

    /// The configured tick period.
    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Trailing-edge debounce.
///
/// Each `trigger` pushes the deadline out; `ready` fires exactly once per
/// quiescent period, after the last trigger has aged past the delay.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    /// Create a debounce with the given settle delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record an event at `now`, rearming the deadline.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True once the delay has elapsed since the last trigger. Consumes the
    /// pending deadline, so a quiescent period fires a single time.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a trigger is waiting to fire.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
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
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_clock_update() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = clock.update();

        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_interval_not_yet_due() {
        let now = Instant::now();
        let mut interval = Interval::new(Duration::from_millis(100), now);
        assert_eq!(interval.poll(now), 0);
        assert_eq!(interval.poll(now + Duration::from_millis(99)), 0);
    }

    #[test]
    fn test_interval_single_tick() {
        let now = Instant::now();
        let mut interval = Interval::new(Duration::from_millis(100), now);
        assert_eq!(interval.poll(now + Duration::from_millis(100)), 1);
        // Already consumed; nothing more due at the same instant.
        assert_eq!(interval.poll(now + Duration::from_millis(100)), 0);
    }

    #[test]
    fn test_interval_catches_up() {
        let now = Instant::now();
        let mut interval = Interval::new(Duration::from_millis(100), now);
        // A long stall delivers every missed tick.
        assert_eq!(interval.poll(now + Duration::from_millis(350)), 3);
        assert_eq!(interval.poll(now + Duration::from_millis(400)), 1);
    }

    #[test]
    fn test_debounce_waits_for_quiet() {
        let now = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(100));
        debounce.trigger(now);

        assert!(!debounce.ready(now + Duration::from_millis(50)));
        assert!(debounce.is_pending());
        assert!(debounce.ready(now + Duration::from_millis(100)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_debounce_retrigger_extends_deadline() {
        let now = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(100));
        debounce.trigger(now);
        debounce.trigger(now + Duration::from_millis(80));

        // The first deadline was pushed out by the second trigger.
        assert!(!debounce.ready(now + Duration::from_millis(100)));
        assert!(debounce.ready(now + Duration::from_millis(180)));
    }

    #[test]
    fn test_debounce_fires_once_per_burst() {
        let now = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(100));
        debounce.trigger(now);

        assert!(debounce.ready(now + Duration::from_millis(150)));
        assert!(!debounce.ready(now + Duration::from_millis(200)));

        // A new burst rearms it.
        debounce.trigger(now + Duration::from_millis(300));
        assert!(debounce.ready(now + Duration::from_millis(400)));
    }
}
