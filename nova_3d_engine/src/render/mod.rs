//! Render module - per-frame snapshots and the hand-off to the renderer.
//!
//! The game thread builds a `RenderState`, publishes it through the
//! `RenderBufferManager`, and the render thread passes the latest
//! publication to a `RenderSubmitter`.

mod render_buffer_manager;
mod render_state;
mod submitter;

pub use render_buffer_manager::{RenderBufferManager, ReadSlot, WriteSlot, MAX_SLOTS, MIN_SLOTS};
pub use render_state::{
    CameraSnapshot, LightSnapshot, LightUniforms, MaterialHandle, MeshHandle, ObjectUniforms,
    RenderItem, RenderState,
};
pub use submitter::{MockSubmitter, RenderSubmitter, SubmittedFrame};
