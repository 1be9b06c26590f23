//! Scene module
//!
//! Node arena, hierarchy, transforms, lights and the capability views used
//! to drive nodes from the engine loop. `SceneManager` keeps named scenes
//! and drives the active one.

mod aabb;
mod light;
mod node;
mod scene;
mod scene_manager;
mod transform;
mod views;

pub use aabb::AABB;
pub use light::{Light, LightType, MAX_SHADOW_CASCADES};
pub use node::{Node, NodeBehavior, NodeContext, NodeKey, NodeType, RenderData};
pub use scene::Scene;
pub use scene_manager::SceneManager;
pub use transform::{
    euler_degrees_from_quat, quat_from_euler_degrees, Space, Transform, TransformDirty,
};
pub use views::{PhysicsNode, RenderNode, SpatialNode, UpdateNode};
