//! Camera module - projection parameters, frustum math and shadow cascades.
//!
//! `Camera` is the data block carried by camera nodes; `CameraNode` is the
//! capability view that combines it with the node's transform.

mod camera;
mod camera_node;
mod cascade;
mod frustum;
mod rect;

pub use camera::{Camera, CameraDirty, ClearFlags, Projection};
pub use camera_node::CameraNode;
pub use cascade::{compute_cascade_splits, compute_cascades, directional_light_view, ShadowCascade};
pub use frustum::{
    Frustum, FrustumTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use rect::Rect;
