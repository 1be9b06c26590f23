/// Render submission seam.
///
/// The engine hands each published `RenderState` to a `RenderSubmitter`,
/// which stands in for the GPU backend (command recording, draw calls,
/// presentation). The submitter runs on the render thread when one is
/// configured, otherwise on the game thread.

use std::sync::{Arc, Mutex, PoisonError};
use crate::engine::Engine;
use crate::error::{Error, Result};
use super::render_state::RenderState;

pub trait RenderSubmitter: Send {
    /// Submit one frame. An error stops the engine.
    fn submit(&mut self, state: &RenderState) -> Result<()>;

    /// Render area resized. Called on the submitting thread.
    fn on_resize(&mut self, _width: u32, _height: u32) {}
}

/// Summary of one submitted frame, as recorded by `MockSubmitter`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedFrame {
    pub frame_index: u64,
    pub time: f64,
    pub item_count: usize,
    pub camera_count: usize,
    pub light_count: usize,
    /// Shadow maps the frame needs, summed over all lights
    pub shadow_map_count: usize,
}

/// Submitter that records frames instead of drawing them.
///
/// Clones share the same record, so a test can keep one clone and hand
/// the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct MockSubmitter {
    pub frames: Arc<Mutex<Vec<SubmittedFrame>>>,
    pub resizes: Arc<Mutex<Vec<(u32, u32)>>>,
    fail_at: Option<u64>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with a backend error when asked to submit `frame_index`.
    pub fn failing_at(mut self, frame_index: u64) -> Self {
        self.fail_at = Some(frame_index);
        self
    }

    pub fn frames(&self) -> Vec<SubmittedFrame> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl RenderSubmitter for MockSubmitter {
    fn submit(&mut self, state: &RenderState) -> Result<()> {
        if self.fail_at == Some(state.frame_index) {
            return Err(Engine::log_and_return_error(
                "nova3d::MockSubmitter",
                Error::BackendError(format!("simulated failure at frame {}", state.frame_index)),
            ));
        }
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SubmittedFrame {
                frame_index: state.frame_index,
                time: state.time,
                item_count: state.items.len(),
                camera_count: state.cameras.len(),
                light_count: state.lights.len(),
                shadow_map_count: state.light_uniforms().iter().map(|l| l.shadow_count as usize).sum(),
            });
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.resizes.lock().unwrap_or_else(PoisonError::into_inner).push((width, height));
    }
}
