/// Time sources, fixed-step accounting and frame statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic time source, in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

/// Wall clock measured from its creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock driven by hand, for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    seconds: AtomicU64,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { seconds: AtomicU64::new(start.to_bits()) }
    }

    pub fn set(&self, seconds: f64) {
        self.seconds.store(seconds.to_bits(), Ordering::Release);
    }

    pub fn advance(&self, seconds: f64) {
        let _ = self.seconds.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
            Some((f64::from_bits(bits) + seconds).to_bits())
        });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.seconds.load(Ordering::Acquire))
    }
}

// ============================================================================
// FixedStepAccumulator
// ============================================================================

/// Turns real elapsed time into a whole number of fixed steps.
///
/// At most `max_sub_steps` steps are handed out per call. When a stall
/// produces more, the surplus whole steps are discarded and only the
/// fraction of a step is carried over, so the simulation never tries to
/// catch up on lost time.
#[derive(Debug, Clone)]
pub struct FixedStepAccumulator {
    fixed_delta: f64,
    max_sub_steps: u32,
    accumulated: f64,
    discarded_steps: u64,
}

impl FixedStepAccumulator {
    pub fn new(fixed_delta: f64, max_sub_steps: u32) -> Self {
        Self {
            fixed_delta,
            max_sub_steps,
            accumulated: 0.0,
            discarded_steps: 0,
        }
    }

    pub fn fixed_delta(&self) -> f64 {
        self.fixed_delta
    }

    /// Time carried over to the next call.
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Steps dropped by the sub-step cap so far.
    pub fn discarded_steps(&self) -> u64 {
        self.discarded_steps
    }

    /// Fraction of a step currently accumulated, in [0, 1).
    pub fn alpha(&self) -> f64 {
        self.accumulated / self.fixed_delta
    }

    /// Add `elapsed` seconds and return how many fixed steps to run now.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulated += elapsed;
        }

        let available = (self.accumulated / self.fixed_delta).floor();
        self.accumulated = (self.accumulated - available * self.fixed_delta).max(0.0);

        let available = available as u64;
        let cap = u64::from(self.max_sub_steps);
        if available > cap {
            self.discarded_steps += available - cap;
            return self.max_sub_steps;
        }
        available as u32
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

// ============================================================================
// FrameStats
// ============================================================================

/// Frame counters and timings, refreshed once per interval.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub frame_count: u64,
    /// Frames per second over the last completed interval
    pub fps: f32,
    /// Duration of the latest frame
    pub frame_time_ms: f32,
    /// Shortest frame of the last completed interval
    pub min_frame_time_ms: f32,
    /// Longest frame of the last completed interval
    pub max_frame_time_ms: f32,
    interval: f64,
    window_frames: u32,
    window_time: f64,
    window_min_ms: f32,
    window_max_ms: f32,
}

impl FrameStats {
    pub fn new(interval: f64) -> Self {
        Self {
            frame_count: 0,
            fps: 0.0,
            frame_time_ms: 0.0,
            min_frame_time_ms: 0.0,
            max_frame_time_ms: 0.0,
            interval,
            window_frames: 0,
            window_time: 0.0,
            window_min_ms: f32::MAX,
            window_max_ms: 0.0,
        }
    }

    /// Account one frame of `frame_time` seconds. Returns `true` when an
    /// interval completed and `fps`/min/max were refreshed.
    pub fn record(&mut self, frame_time: f64) -> bool {
        let ms = (frame_time * 1000.0) as f32;
        self.frame_count += 1;
        self.frame_time_ms = ms;
        self.window_frames += 1;
        self.window_time += frame_time;
        self.window_min_ms = self.window_min_ms.min(ms);
        self.window_max_ms = self.window_max_ms.max(ms);

        if self.window_time < self.interval {
            return false;
        }

        self.fps = (f64::from(self.window_frames) / self.window_time) as f32;
        self.min_frame_time_ms = self.window_min_ms;
        self.max_frame_time_ms = self.window_max_ms;
        self.window_frames = 0;
        self.window_time = 0.0;
        self.window_min_ms = f32::MAX;
        self.window_max_ms = 0.0;
        true
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
