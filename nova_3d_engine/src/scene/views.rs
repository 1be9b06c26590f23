/// Capability views.
///
/// A view is a short-lived handle over `&mut Scene` for one node that is
/// known to carry a capability. Views are obtained from `Scene::as_*_node`,
/// which returns `None` when the node lacks the tag, so holding a view is
/// proof the capability exists.

use glam::{Mat4, Quat, Vec3};
use super::aabb::AABB;
use super::node::{NodeKey, RenderData};
use super::scene::Scene;
use super::transform::{Space, Transform};

/// Node with a Transform.
pub struct SpatialNode<'a> {
    scene: &'a mut Scene,
    key: NodeKey,
}

impl<'a> SpatialNode<'a> {
    pub(crate) fn new(scene: &'a mut Scene, key: NodeKey) -> Self {
        Self { scene, key }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.scene.transform(self.key)
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.scene.world_matrix(self.key).unwrap_or(Mat4::IDENTITY)
    }

    pub fn position(&self) -> Vec3 {
        self.world_matrix().w_axis.truncate()
    }

    pub fn rotation(&self) -> Quat {
        self.scene.rotation(self.key).unwrap_or(Quat::IDENTITY)
    }

    pub fn forward(&self) -> Vec3 {
        self.scene.forward(self.key).unwrap_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.scene.right(self.key).unwrap_or(Vec3::X)
    }

    pub fn up(&self) -> Vec3 {
        self.scene.up(self.key).unwrap_or(Vec3::Y)
    }

    pub fn set_local_position(&mut self, position: Vec3) {
        self.scene.set_local_position(self.key, position);
    }

    pub fn set_local_euler_angles(&mut self, degrees: Vec3) {
        self.scene.set_local_euler_angles(self.key, degrees);
    }

    pub fn set_local_rotation(&mut self, rotation: Quat) {
        self.scene.set_local_rotation(self.key, rotation);
    }

    pub fn set_local_scale(&mut self, scale: Vec3) {
        self.scene.set_local_scale(self.key, scale);
    }

    pub fn set_world_position(&mut self, position: Vec3) {
        self.scene.set_world_position(self.key, position);
    }

    pub fn translate(&mut self, delta: Vec3, space: Space) {
        self.scene.translate(self.key, delta, space);
    }

    pub fn rotate(&mut self, euler_delta_degrees: Vec3, space: Space) {
        self.scene.rotate(self.key, euler_delta_degrees, space);
    }

    pub fn look_at(&mut self, target: Vec3, up: Vec3) -> bool {
        self.scene.look_at(self.key, target, up)
    }
}

/// Node driven by the variable-rate game loop.
pub struct UpdateNode<'a> {
    scene: &'a mut Scene,
    key: NodeKey,
}

impl<'a> UpdateNode<'a> {
    pub(crate) fn new(scene: &'a mut Scene, key: NodeKey) -> Self {
        Self { scene, key }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn update(&mut self, dt: f32) {
        self.scene.invoke(self.key, |behavior, ctx| behavior.update(ctx, dt));
    }

    pub fn late_update(&mut self, dt: f32) {
        self.scene.invoke(self.key, |behavior, ctx| behavior.late_update(ctx, dt));
    }
}

/// Node that takes part in rendering.
pub struct RenderNode<'a> {
    scene: &'a mut Scene,
    key: NodeKey,
}

impl<'a> RenderNode<'a> {
    pub(crate) fn new(scene: &'a mut Scene, key: NodeKey) -> Self {
        Self { scene, key }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn pre_render(&mut self) {
        self.scene.invoke(self.key, |behavior, ctx| behavior.pre_render(ctx));
    }

    pub fn post_render(&mut self) {
        self.scene.invoke(self.key, |behavior, ctx| behavior.post_render(ctx));
    }

    pub fn render_data(&self) -> Option<&RenderData> {
        self.scene.node(self.key).and_then(|node| node.render_data())
    }

    pub fn set_visible(&mut self, visible: bool) {
        if let Some(data) = self.scene.node_mut(self.key).and_then(|node| node.render_data_mut()) {
            data.visible = visible;
        }
    }

    /// Local bounds transformed by the world matrix (identity for non-spatial nodes).
    pub fn world_bounds(&self) -> Option<AABB> {
        let bounds = self.render_data()?.local_bounds?;
        let world = self.scene.world_matrix(self.key).unwrap_or(Mat4::IDENTITY);
        Some(bounds.transformed(&world))
    }
}

/// Node stepped on the fixed physics cadence.
pub struct PhysicsNode<'a> {
    scene: &'a mut Scene,
    key: NodeKey,
}

impl<'a> PhysicsNode<'a> {
    pub(crate) fn new(scene: &'a mut Scene, key: NodeKey) -> Self {
        Self { scene, key }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn fixed_update(&mut self, dt: f32) {
        self.scene.invoke(self.key, |behavior, ctx| behavior.fixed_update(ctx, dt));
    }

    /// Physics nodes are always spatial.
    pub fn spatial(&mut self) -> SpatialNode<'_> {
        SpatialNode::new(self.scene, self.key)
    }
}
