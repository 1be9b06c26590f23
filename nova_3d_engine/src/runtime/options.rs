/// Engine configuration.

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::render::{MAX_SLOTS, MIN_SLOTS};

const SOURCE: &str = "nova3d::EngineOptions";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Physics step length in seconds
    pub fixed_delta_time: f32,
    /// Upper bound for the variable frame delta in seconds
    pub max_delta_time: f32,
    /// Frames per second targeted when `limit_frame_rate` is set
    pub target_frame_rate: f32,
    pub limit_frame_rate: bool,
    /// Most physics steps run in one physics iteration
    pub max_sub_steps: u32,
    /// Spawn the fixed-step physics thread
    pub run_physics: bool,
    /// Slots in the render buffer ring (1..=3)
    pub render_buffer_count: usize,
    /// Submit on a dedicated render thread instead of the game thread
    pub run_render_thread: bool,
    /// Log frame statistics every `frame_stats_interval` seconds
    pub show_frame_stats: bool,
    pub frame_stats_interval: f32,
    pub render_width: u32,
    pub render_height: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fixed_delta_time: 1.0 / 60.0,
            max_delta_time: 1.0 / 15.0,
            target_frame_rate: 60.0,
            limit_frame_rate: false,
            max_sub_steps: 5,
            run_physics: true,
            render_buffer_count: 2,
            run_render_thread: true,
            show_frame_stats: false,
            frame_stats_interval: 1.0,
            render_width: 1280,
            render_height: 720,
        }
    }
}

impl EngineOptions {
    pub fn with_fixed_delta_time(mut self, seconds: f32) -> Self {
        self.fixed_delta_time = seconds;
        self
    }

    pub fn with_max_delta_time(mut self, seconds: f32) -> Self {
        self.max_delta_time = seconds;
        self
    }

    pub fn with_max_sub_steps(mut self, steps: u32) -> Self {
        self.max_sub_steps = steps;
        self
    }

    pub fn with_physics(mut self, enabled: bool) -> Self {
        self.run_physics = enabled;
        self
    }

    pub fn with_render_thread(mut self, enabled: bool) -> Self {
        self.run_render_thread = enabled;
        self
    }

    pub fn with_render_buffer_count(mut self, count: usize) -> Self {
        self.render_buffer_count = count;
        self
    }

    /// Cap the frame rate at `frames_per_second`.
    pub fn with_frame_limit(mut self, frames_per_second: f32) -> Self {
        self.limit_frame_rate = true;
        self.target_frame_rate = frames_per_second;
        self
    }

    pub fn with_frame_stats(mut self, enabled: bool) -> Self {
        self.show_frame_stats = enabled;
        self
    }

    pub fn with_render_area(mut self, width: u32, height: u32) -> Self {
        self.render_width = width;
        self.render_height = height;
        self
    }

    /// # Errors
    ///
    /// `InvalidConfig` describing the first offending field.
    pub fn validate(&self) -> Result<()> {
        let positive = |value: f32| value.is_finite() && value > 0.0;

        if !positive(self.fixed_delta_time) {
            return Err(invalid(format!("fixed_delta_time must be positive, got {}", self.fixed_delta_time)));
        }
        if !positive(self.max_delta_time) {
            return Err(invalid(format!("max_delta_time must be positive, got {}", self.max_delta_time)));
        }
        if self.max_delta_time < self.fixed_delta_time {
            return Err(invalid(format!(
                "max_delta_time ({}) is below fixed_delta_time ({})",
                self.max_delta_time, self.fixed_delta_time
            )));
        }
        if self.max_sub_steps == 0 {
            return Err(invalid("max_sub_steps must be at least 1".to_string()));
        }
        if !(MIN_SLOTS..=MAX_SLOTS).contains(&self.render_buffer_count) {
            return Err(invalid(format!(
                "render_buffer_count must be in {}..={}, got {}",
                MIN_SLOTS, MAX_SLOTS, self.render_buffer_count
            )));
        }
        if self.render_width == 0 || self.render_height == 0 {
            return Err(invalid(format!(
                "render area must not be empty, got {}x{}",
                self.render_width, self.render_height
            )));
        }
        if self.limit_frame_rate && !positive(self.target_frame_rate) {
            return Err(invalid(format!("target_frame_rate must be positive, got {}", self.target_frame_rate)));
        }
        if self.show_frame_stats && !positive(self.frame_stats_interval) {
            return Err(invalid(format!(
                "frame_stats_interval must be positive, got {}",
                self.frame_stats_interval
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Engine::log_and_return_error(SOURCE, Error::InvalidConfig(message))
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
