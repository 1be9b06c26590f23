/// Node - an element of the scene graph.
///
/// A node advertises what it can do through `NodeType` capability tags and
/// carries one optional data block per capability (a `Transform` for spatial
/// nodes, a `Camera` for camera nodes, a `Light` for light nodes,
/// `RenderData` for render nodes).
/// Custom per-node logic lives in a `NodeBehavior` trait object whose hooks
/// are only invoked for the capabilities the node declares.
///
/// Nodes are stored in the `Scene` arena and refer to each other by
/// `NodeKey`; the parent link is non-owning, children are owned by the
/// scene on behalf of their parent (destroying a node destroys its subtree).

use std::sync::{Arc, Weak};
use bitflags::bitflags;
use slotmap::new_key_type;
use crate::camera::Camera;
use crate::render::{MaterialHandle, MeshHandle};
use crate::runtime::EngineContext;
use super::aabb::AABB;
use super::light::Light;
use super::scene::Scene;
use super::transform::Transform;

new_key_type! {
    /// Stable key for a node in a `Scene`
    pub struct NodeKey;
}

bitflags! {
    /// Capability tags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeType: u32 {
        const BASE = 1 << 0;
        /// Has a Transform
        const SPATIAL = 1 << 1;
        /// Receives update / late_update
        const UPDATE = 1 << 2;
        /// Receives pre_render / post_render and may emit render items
        const RENDER = 1 << 3;
        /// Receives fixed_update on the physics cadence
        const PHYSICS = 1 << 4;
        const CAMERA = 1 << 5;
        /// Has a Light, collected into the frame's light list
        const LIGHT = 1 << 6;
        const MODEL = 1 << 7;
    }
}

impl NodeType {
    /// Add the tags implied by the ones present.
    pub fn with_implied(self) -> NodeType {
        let mut tags = self | NodeType::BASE;
        if tags.contains(NodeType::CAMERA) {
            tags |= NodeType::SPATIAL | NodeType::UPDATE | NodeType::RENDER;
        }
        if tags.contains(NodeType::MODEL) {
            tags |= NodeType::RENDER;
        }
        if tags.intersects(NodeType::PHYSICS | NodeType::LIGHT | NodeType::MODEL) {
            tags |= NodeType::SPATIAL;
        }
        tags
    }
}

/// Renderable payload of a render node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderData {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    /// Local-space bounds used for frustum culling. `None` disables culling.
    pub local_bounds: Option<AABB>,
    pub visible: bool,
}

impl RenderData {
    pub fn new(mesh: MeshHandle, material: MaterialHandle) -> Self {
        Self { mesh, material, local_bounds: None, visible: true }
    }

    pub fn with_bounds(mut self, bounds: AABB) -> Self {
        self.local_bounds = Some(bounds);
        self
    }
}

/// Access handed to behavior hooks: the scene and the node being processed.
pub struct NodeContext<'a> {
    pub scene: &'a mut Scene,
    pub key: NodeKey,
}

impl<'a> NodeContext<'a> {
    /// Engine-wide context, if the node is attached under a scene that has one.
    pub fn engine(&self) -> Option<Arc<EngineContext>> {
        self.scene.node(self.key).and_then(|node| node.context())
    }
}

/// Per-node logic.
///
/// Every hook has an empty default. The scene only calls the per-frame hooks
/// that match the node's capability tags (`update`/`late_update` need UPDATE,
/// `fixed_update` needs PHYSICS, `pre_render`/`post_render` need RENDER).
/// The behavior is detached from its node while a hook runs, so hooks may
/// freely mutate the scene, including the node itself.
pub trait NodeBehavior: Send {
    fn on_start(&mut self, _ctx: &mut NodeContext) {}
    fn on_enable(&mut self, _ctx: &mut NodeContext) {}
    fn on_disable(&mut self, _ctx: &mut NodeContext) {}
    fn on_destroy(&mut self, _ctx: &mut NodeContext) {}
    fn update(&mut self, _ctx: &mut NodeContext, _dt: f32) {}
    fn late_update(&mut self, _ctx: &mut NodeContext, _dt: f32) {}
    fn fixed_update(&mut self, _ctx: &mut NodeContext, _dt: f32) {}
    fn pre_render(&mut self, _ctx: &mut NodeContext) {}
    fn post_render(&mut self, _ctx: &mut NodeContext) {}
}

pub struct Node {
    name: String,
    node_type: NodeType,
    pub(crate) enabled: bool,
    pub(crate) started: bool,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) context: Option<Weak<EngineContext>>,
    pub(crate) transform: Option<Transform>,
    camera: Option<Camera>,
    light: Option<Light>,
    render_data: Option<RenderData>,
    pub(crate) behavior: Option<Box<dyn NodeBehavior>>,
}

impl Node {
    /// Create a detached node. Implied tags are added and the data blocks
    /// for SPATIAL, CAMERA and LIGHT are created with their defaults.
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        let node_type = node_type.with_implied();
        Self {
            name: name.into(),
            node_type,
            enabled: true,
            started: false,
            parent: None,
            children: Vec::new(),
            context: None,
            transform: node_type.contains(NodeType::SPATIAL).then(Transform::new),
            camera: node_type.contains(NodeType::CAMERA).then(Camera::default),
            light: node_type.contains(NodeType::LIGHT).then(Light::default),
            render_data: None,
            behavior: None,
        }
    }

    /// Replace the initial transform. Adds SPATIAL.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.node_type |= NodeType::SPATIAL;
        self.transform = Some(transform);
        self
    }

    /// Replace the default camera. Adds CAMERA and its implied tags.
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.node_type = (self.node_type | NodeType::CAMERA).with_implied();
        if self.transform.is_none() {
            self.transform = Some(Transform::new());
        }
        self.camera = Some(camera);
        self
    }

    /// Replace the default light. Adds LIGHT and SPATIAL.
    pub fn with_light(mut self, light: Light) -> Self {
        self.node_type = (self.node_type | NodeType::LIGHT).with_implied();
        if self.transform.is_none() {
            self.transform = Some(Transform::new());
        }
        self.light = Some(light);
        self
    }

    /// Attach a renderable payload. Adds RENDER.
    pub fn with_render_data(mut self, render_data: RenderData) -> Self {
        self.node_type |= NodeType::RENDER;
        self.render_data = Some(render_data);
        self
    }

    pub fn with_behavior<B: NodeBehavior + 'static>(mut self, behavior: B) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn has(&self, capability: NodeType) -> bool {
        self.node_type.contains(capability)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Read-only transform. Mutation goes through `Scene` so that
    /// descendants are invalidated.
    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    pub fn light(&self) -> Option<&Light> {
        self.light.as_ref()
    }

    pub fn light_mut(&mut self) -> Option<&mut Light> {
        self.light.as_mut()
    }

    pub fn render_data(&self) -> Option<&RenderData> {
        self.render_data.as_ref()
    }

    pub fn render_data_mut(&mut self) -> Option<&mut RenderData> {
        self.render_data.as_mut()
    }

    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    /// Engine context propagated at attach time. `None` when detached or
    /// once the engine dropped it.
    pub fn context(&self) -> Option<Arc<EngineContext>> {
        self.context.as_ref().and_then(Weak::upgrade)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("node_type", &self.node_type)
            .field("enabled", &self.enabled)
            .field("started", &self.started)
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
