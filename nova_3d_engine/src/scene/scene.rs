/// Scene - the node arena and hierarchy.
///
/// Uses a SlotMap for O(1) insert/remove with stable keys. The scene owns an
/// implicit root node; nodes inserted with `insert` start detached and join
/// the tree through `add_child`.
///
/// Transform mutation goes through the scene so that every descendant's
/// world matrix is invalidated when an ancestor moves. World matrices are
/// then resolved lazily, top-down, on read.

use std::sync::{Arc, Weak};
use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use crate::camera::{compute_cascades, directional_light_view, Camera, CameraNode, FrustumTest};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::render::{CameraSnapshot, LightSnapshot, RenderItem, RenderState};
use crate::runtime::EngineContext;
use super::light::{Light, LightType};
use super::node::{Node, NodeBehavior, NodeContext, NodeKey, NodeType};
use super::transform::{Space, Transform};
use super::views::{PhysicsNode, RenderNode, SpatialNode, UpdateNode};

const SOURCE: &str = "nova3d::Scene";

pub struct Scene {
    nodes: SlotMap<NodeKey, Node>,
    root: NodeKey,
    main_camera: Option<NodeKey>,
    cameras: FxHashSet<NodeKey>,
    context: Option<Arc<EngineContext>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene containing only the root node.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("Root", NodeType::BASE));
        Self {
            nodes,
            root,
            main_camera: None,
            cameras: FxHashSet::default(),
            context: None,
        }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    pub fn is_started(&self) -> bool {
        self.nodes.get(self.root).is_some_and(|root| root.started)
    }

    fn invalid_node(&self, key: NodeKey) -> Error {
        Engine::log_and_return_error(SOURCE, Error::InvalidNode(format!("{:?} is not in the scene", key)))
    }

    // ===== NODE CREATION =====

    /// Insert a detached node and return its key.
    pub fn insert(&mut self, node: Node) -> NodeKey {
        let is_camera = node.has(NodeType::CAMERA);
        let name = node.name().to_string();
        let key = self.nodes.insert(node);
        if is_camera {
            self.cameras.insert(key);
        }
        crate::engine_debug!(SOURCE, "Node '{}' created ({:?})", name, key);
        key
    }

    /// Insert a node and attach it under `parent`. Its transform is kept
    /// as a local pose relative to the parent.
    pub fn spawn(&mut self, parent: NodeKey, node: Node) -> Result<NodeKey> {
        if !self.nodes.contains_key(parent) {
            return Err(self.invalid_node(parent));
        }
        let key = self.insert(node);
        self.attach(parent, key, false)?;
        Ok(key)
    }

    /// Insert a node directly under the root.
    pub fn spawn_root_child(&mut self, node: Node) -> NodeKey {
        let key = self.insert(node);
        // Root is always valid and a fresh node cannot form a cycle
        if let Err(error) = self.attach(self.root, key, false) {
            crate::engine_warn!(SOURCE, "Failed to attach {:?} to root: {}", key, error);
        }
        key
    }

    // ===== HIERARCHY =====

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    /// Children of `key` (empty for an unknown key).
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        match self.nodes.get(key) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Direct children whose name matches.
    pub fn children_named(&self, key: NodeKey, name: &str) -> Vec<NodeKey> {
        self.children(key)
            .iter()
            .copied()
            .filter(|child| self.nodes.get(*child).is_some_and(|node| node.name() == name))
            .collect()
    }

    /// First node with this name, depth-first from the root.
    pub fn find_by_name(&self, name: &str) -> Option<NodeKey> {
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            let node = self.nodes.get(key)?;
            if node.name() == name {
                return Some(key);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// True when `ancestor` is `key` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.parent(k);
        }
        false
    }

    /// Pre-order list of `key` and all its descendants.
    fn subtree(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(node) = self.nodes.get(k) {
                out.push(k);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Attach `child` under `parent`, preserving the child's world pose.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        self.attach(parent, child, true)
    }

    /// Attach `child` under `parent`.
    ///
    /// With `keep_world_pose` the local pose is re-solved as
    /// `inverse(parent.world) × child.world` so the child does not move;
    /// otherwise the local pose is kept and the child follows its new parent.
    /// A child that already has a parent is detached first. The parent's
    /// engine context is propagated to the whole subtree, and the subtree is
    /// started if the parent is started and active.
    ///
    /// # Errors
    ///
    /// - `InvalidNode` if either key is unknown
    /// - `HierarchyError` on self-parenting, re-parenting the root, or a cycle
    pub fn attach(&mut self, parent: NodeKey, child: NodeKey, keep_world_pose: bool) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(self.invalid_node(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(self.invalid_node(child));
        }
        if child == self.root {
            return Err(Engine::log_and_return_error(
                SOURCE,
                Error::HierarchyError("the root node cannot be re-parented".to_string()),
            ));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(Engine::log_and_return_error(
                SOURCE,
                Error::HierarchyError(format!("attaching {:?} under {:?} would create a cycle", child, parent)),
            ));
        }

        let world = self.world_matrix(child);
        self.unlink(child);

        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);

        if let Some(world) = world.filter(|_| keep_world_pose) {
            self.restore_world_pose(child, &world);
        }
        self.invalidate_world(child);

        let context = self.nodes[parent].context.clone();
        self.propagate_context(child, context);

        if self.nodes[parent].started && self.is_active_in_hierarchy(parent) && self.nodes[child].enabled {
            self.start_node(child);
        }

        crate::engine_debug!(
            SOURCE,
            "Node '{}' attached to '{}'",
            self.nodes[child].name(),
            self.nodes[parent].name()
        );
        Ok(())
    }

    /// Detach `child` from `parent`, keeping its world pose and clearing its
    /// engine context. Returns `false` if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        let world = self.world_matrix(child);
        self.unlink(child);
        if let Some(world) = world {
            self.restore_world_pose(child, &world);
        }
        self.invalidate_world(child);
        self.propagate_context(child, None);
        crate::engine_debug!(SOURCE, "Node '{}' detached", self.nodes[child].name());
        true
    }

    /// Detach `key` from whatever parent it has.
    pub fn detach(&mut self, key: NodeKey) -> bool {
        match self.parent(key) {
            Some(parent) => self.remove_child(parent, key),
            None => false,
        }
    }

    fn unlink(&mut self, child: NodeKey) {
        if let Some(old_parent) = self.nodes.get_mut(child).and_then(|node| node.parent.take()) {
            if let Some(parent_node) = self.nodes.get_mut(old_parent) {
                parent_node.children.retain(|k| *k != child);
            }
        }
    }

    /// Rewrite the local pose so that the node keeps `world` under its current parent.
    fn restore_world_pose(&mut self, key: NodeKey, world: &Mat4) {
        let parent_world = self.parent_world(key);
        if let Some(transform) = self.nodes.get_mut(key).and_then(|node| node.transform.as_mut()) {
            let local = match parent_world {
                Some(parent) => parent.inverse() * *world,
                None => *world,
            };
            transform.set_local_matrix(&local);
        }
    }

    fn propagate_context(&mut self, key: NodeKey, context: Option<Weak<EngineContext>>) {
        for k in self.subtree(key) {
            self.nodes[k].context = context.clone();
        }
    }

    /// Destroy `key` and its subtree. `on_destroy` runs children first.
    /// The root cannot be destroyed.
    pub fn destroy(&mut self, key: NodeKey) -> bool {
        if key == self.root || !self.nodes.contains_key(key) {
            return false;
        }
        self.unlink(key);

        let subtree = self.subtree(key);
        for k in subtree.iter().rev() {
            self.invoke(*k, |behavior, ctx| behavior.on_destroy(ctx));
        }
        for k in &subtree {
            if let Some(node) = self.nodes.remove(*k) {
                crate::engine_debug!(SOURCE, "Node '{}' destroyed", node.name());
            }
            self.cameras.remove(k);
            if self.main_camera == Some(*k) {
                self.main_camera = None;
            }
        }
        true
    }

    // ===== LIFECYCLE =====

    /// Start the whole tree.
    pub fn start(&mut self) {
        self.start_node(self.root);
    }

    /// Start `key` and its enabled descendants that are not started yet.
    /// Each node gets `on_start` at most once.
    pub fn start_node(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get_mut(key) else { return };
        if !node.enabled {
            return;
        }
        if !node.started {
            node.started = true;
            self.invoke(key, |behavior, ctx| behavior.on_start(ctx));
        }

        let children = self.children(key).to_vec();
        for child in children {
            if self.nodes.get(child).is_some_and(|n| n.enabled) {
                self.start_node(child);
            }
        }
    }

    /// Enable `key`. Nodes of the subtree that joined while it was disabled
    /// are started first (when the parent is started, or `key` has no
    /// parent), then `key` and its enabled descendants are notified
    /// depth-first.
    pub fn enable(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get_mut(key) else { return };
        if node.enabled {
            return;
        }
        node.enabled = true;
        let parent_started = match node.parent {
            Some(parent) => self.nodes.get(parent).is_some_and(|p| p.started),
            None => true,
        };
        if parent_started && self.is_active_in_hierarchy(key) {
            self.start_node(key);
        }
        for k in self.enabled_subtree(key) {
            self.invoke(k, |behavior, ctx| behavior.on_enable(ctx));
        }
    }

    /// Disable `key`; it and its enabled descendants get `on_disable`.
    pub fn disable(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get(key) else { return };
        if !node.enabled {
            return;
        }
        let notified = self.enabled_subtree(key);
        self.nodes[key].enabled = false;
        for k in notified {
            self.invoke(k, |behavior, ctx| behavior.on_disable(ctx));
        }
    }

    pub fn is_enabled(&self, key: NodeKey) -> bool {
        self.nodes.get(key).is_some_and(|node| node.enabled)
    }

    /// Node and all its ancestors are enabled.
    pub fn is_active_in_hierarchy(&self, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            match self.nodes.get(k) {
                Some(node) if node.enabled => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Pre-order walk of `key`'s subtree that skips disabled branches.
    fn enabled_subtree(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(node) = self.nodes.get(k) {
                if !node.enabled {
                    continue;
                }
                out.push(k);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Active nodes (root subtree) in depth-first order.
    pub fn active_nodes(&self) -> Vec<NodeKey> {
        self.enabled_subtree(self.root)
    }

    // ===== CONTEXT =====

    /// Attach the engine context and propagate it to every node under the root.
    pub fn set_context(&mut self, context: Arc<EngineContext>) {
        let weak = Arc::downgrade(&context);
        self.context = Some(context);
        self.propagate_context(self.root, Some(weak));
    }

    pub fn context(&self) -> Option<&Arc<EngineContext>> {
        self.context.as_ref()
    }

    // ===== BEHAVIOR DISPATCH =====

    /// Run a hook with the behavior detached from its node.
    pub(crate) fn invoke<F>(&mut self, key: NodeKey, hook: F)
    where
        F: FnOnce(&mut dyn NodeBehavior, &mut NodeContext),
    {
        let Some(mut behavior) = self.nodes.get_mut(key).and_then(|node| node.behavior.take()) else {
            return;
        };
        {
            let mut ctx = NodeContext { scene: self, key };
            hook(behavior.as_mut(), &mut ctx);
        }
        // The hook may have destroyed its own node; the behavior goes with it
        if let Some(node) = self.nodes.get_mut(key) {
            if node.behavior.is_none() {
                node.behavior = Some(behavior);
            }
        }
    }

    fn dispatch<F>(&mut self, capability: NodeType, mut hook: F)
    where
        F: FnMut(&mut dyn NodeBehavior, &mut NodeContext),
    {
        for key in self.active_nodes() {
            let eligible = self.nodes.get(key).is_some_and(|node| node.has(capability) && node.enabled);
            if eligible && self.is_active_in_hierarchy(key) {
                self.invoke(key, &mut hook);
            }
        }
    }

    // ===== TRAVERSALS =====

    pub fn update(&mut self, dt: f32) {
        self.dispatch(NodeType::UPDATE, |behavior, ctx| behavior.update(ctx, dt));
    }

    pub fn late_update(&mut self, dt: f32) {
        self.dispatch(NodeType::UPDATE, |behavior, ctx| behavior.late_update(ctx, dt));
    }

    pub fn fixed_update(&mut self, dt: f32) {
        self.dispatch(NodeType::PHYSICS, |behavior, ctx| behavior.fixed_update(ctx, dt));
    }

    /// Refresh camera matrices (main camera first) and run `pre_render` hooks.
    pub fn pre_render(&mut self) {
        if let Some(main) = self.main_camera.filter(|k| self.is_active_in_hierarchy(*k)) {
            self.refresh_camera(main);
            self.invoke(main, |behavior, ctx| behavior.pre_render(ctx));
        }
        for key in self.active_nodes() {
            if Some(key) == self.main_camera {
                continue;
            }
            if self.nodes.get(key).is_some_and(|node| node.has(NodeType::CAMERA)) {
                self.refresh_camera(key);
            }
            if self.nodes.get(key).is_some_and(|node| node.has(NodeType::RENDER)) {
                self.invoke(key, |behavior, ctx| behavior.pre_render(ctx));
            }
        }
    }

    pub fn post_render(&mut self) {
        self.dispatch(NodeType::RENDER, |behavior, ctx| behavior.post_render(ctx));
    }

    fn refresh_camera(&self, key: NodeKey) {
        if let (Some(world), Some(camera)) = (self.world_matrix(key), self.camera(key)) {
            camera.update_matrices(&world);
        }
    }

    /// Fill `state` with camera snapshots, active lights and the render
    /// items of active render nodes. Items whose world bounds fall outside
    /// the active camera's frustum are skipped. Shadow-casting directional
    /// lights get cascades fitted to the active camera.
    pub fn collect_render_state(&self, state: &mut RenderState) {
        let cameras = self.active_cameras();
        let mut snapshots: Vec<CameraSnapshot> = cameras
            .iter()
            .filter_map(|key| self.camera_snapshot(*key))
            .collect();
        state.camera = snapshots.first().copied();
        snapshots.sort_by_key(|snapshot| snapshot.depth);
        state.cameras = snapshots;

        let frustum = state.camera.as_ref().map(|camera| camera.frustum);

        for key in self.active_nodes() {
            let Some(node) = self.nodes.get(key) else { continue };
            if let Some(light) = node.light().filter(|_| node.has(NodeType::LIGHT)) {
                state.lights.push(self.light_snapshot(key, light, state.camera.as_ref()));
            }
            if !node.has(NodeType::RENDER) {
                continue;
            }
            let Some(data) = node.render_data() else { continue };
            if !data.visible {
                continue;
            }
            let world = self.world_matrix(key).unwrap_or(Mat4::IDENTITY);
            if let (Some(frustum), Some(bounds)) = (frustum.as_ref(), data.local_bounds.as_ref()) {
                if frustum.classify_aabb(&bounds.transformed(&world)) == FrustumTest::Outside {
                    continue;
                }
            }
            state.items.push(RenderItem::new(world, data.mesh, data.material));
        }
    }

    fn light_snapshot(&self, key: NodeKey, light: &Light, camera: Option<&CameraSnapshot>) -> LightSnapshot {
        let world = self.world_matrix(key).unwrap_or(Mat4::IDENTITY);
        let forward = (-world.z_axis.truncate()).normalize_or_zero();
        let direction = if forward == Vec3::ZERO { Vec3::NEG_Z } else { forward };

        let cascades = match camera {
            Some(camera) if light.light_type() == LightType::Directional && light.casts_shadows() => {
                let light_view = directional_light_view(direction, camera.position, light.range());
                // Errors are logged by compute_cascades; the light just renders unshadowed
                compute_cascades(
                    &camera.frustum,
                    &light_view,
                    camera.near,
                    camera.far,
                    light.cascade_count() as usize,
                    light.split_lambda(),
                )
                .unwrap_or_default()
            }
            _ => Vec::new(),
        };

        LightSnapshot {
            light_id: key,
            light_type: light.light_type(),
            world_matrix: world,
            position: world.w_axis.truncate(),
            direction,
            color: light.color(),
            intensity: light.intensity(),
            range: light.range(),
            spot_angle: light.spot_angle(),
            spot_softness: light.spot_softness(),
            cast_shadows: light.casts_shadows(),
            shadow_bias: light.shadow_bias(),
            cascades,
        }
    }

    // ===== LIGHTS =====

    pub fn light(&self, key: NodeKey) -> Option<&Light> {
        self.nodes.get(key).and_then(Node::light)
    }

    pub fn light_mut(&mut self, key: NodeKey) -> Option<&mut Light> {
        self.nodes.get_mut(key).and_then(Node::light_mut)
    }

    // ===== CAMERAS =====

    /// # Errors
    ///
    /// `InvalidNode` if `key` is unknown or not a camera.
    pub fn set_main_camera(&mut self, key: NodeKey) -> Result<()> {
        if !self.cameras.contains(&key) {
            return Err(Engine::log_and_return_error(
                SOURCE,
                Error::InvalidNode(format!("{:?} is not a camera node", key)),
            ));
        }
        self.main_camera = Some(key);
        Ok(())
    }

    pub fn main_camera(&self) -> Option<NodeKey> {
        self.main_camera
    }

    /// Main camera first (if active), then the other active cameras ordered by depth.
    pub fn active_cameras(&self) -> Vec<NodeKey> {
        let mut result = Vec::new();
        if let Some(main) = self.main_camera.filter(|k| self.is_active_in_hierarchy(*k)) {
            result.push(main);
        }
        let mut others: Vec<NodeKey> = self
            .cameras
            .iter()
            .copied()
            .filter(|k| Some(*k) != self.main_camera && self.is_active_in_hierarchy(*k))
            .collect();
        others.sort_by_key(|k| self.camera(*k).map_or(0, Camera::depth));
        result.extend(others);
        result
    }

    pub fn camera(&self, key: NodeKey) -> Option<&Camera> {
        self.nodes.get(key).and_then(Node::camera)
    }

    pub fn camera_mut(&mut self, key: NodeKey) -> Option<&mut Camera> {
        self.nodes.get_mut(key).and_then(Node::camera_mut)
    }

    fn camera_snapshot(&self, key: NodeKey) -> Option<CameraSnapshot> {
        let world = self.world_matrix(key)?;
        self.camera(key).map(|camera| camera.snapshot(key, &world))
    }

    /// Forward a render-area resize to every camera.
    pub fn on_render_area_changed(&mut self, width: u32, height: u32) {
        let cameras: Vec<NodeKey> = self.cameras.iter().copied().collect();
        for key in cameras {
            if let Some(camera) = self.camera_mut(key) {
                camera.on_render_area_changed(width, height);
            }
        }
    }

    // ===== CAPABILITY VIEWS =====

    fn has_capability(&self, key: NodeKey, capability: NodeType) -> bool {
        self.nodes.get(key).is_some_and(|node| node.has(capability))
    }

    pub fn as_spatial_node(&mut self, key: NodeKey) -> Option<SpatialNode<'_>> {
        if self.has_capability(key, NodeType::SPATIAL) {
            Some(SpatialNode::new(self, key))
        } else {
            None
        }
    }

    pub fn as_update_node(&mut self, key: NodeKey) -> Option<UpdateNode<'_>> {
        if self.has_capability(key, NodeType::UPDATE) {
            Some(UpdateNode::new(self, key))
        } else {
            None
        }
    }

    pub fn as_render_node(&mut self, key: NodeKey) -> Option<RenderNode<'_>> {
        if self.has_capability(key, NodeType::RENDER) {
            Some(RenderNode::new(self, key))
        } else {
            None
        }
    }

    pub fn as_physics_node(&mut self, key: NodeKey) -> Option<PhysicsNode<'_>> {
        if self.has_capability(key, NodeType::PHYSICS) {
            Some(PhysicsNode::new(self, key))
        } else {
            None
        }
    }

    pub fn as_camera_node(&mut self, key: NodeKey) -> Option<CameraNode<'_>> {
        if self.has_capability(key, NodeType::CAMERA) {
            Some(CameraNode::new(self, key))
        } else {
            None
        }
    }

    // ===== TRANSFORMS =====

    pub fn transform(&self, key: NodeKey) -> Option<&Transform> {
        self.nodes.get(key).and_then(|node| node.transform.as_ref())
    }

    /// Mutate a transform in place. Descendants are invalidated when the
    /// transform actually changed.
    pub fn modify_transform<R>(&mut self, key: NodeKey, f: impl FnOnce(&mut Transform) -> R) -> Option<R> {
        let transform = self.nodes.get_mut(key)?.transform.as_mut()?;
        let version = transform.version();
        let result = f(transform);
        if transform.version() != version {
            self.invalidate_world(key);
        }
        Some(result)
    }

    /// Mark `key` and all its descendants world-dirty.
    fn invalidate_world(&self, key: NodeKey) {
        for k in self.subtree(key) {
            if let Some(transform) = self.nodes[k].transform.as_ref() {
                transform.mark_world_dirty();
            }
        }
    }

    /// World matrix of the nearest spatial ancestor.
    pub fn parent_world(&self, key: NodeKey) -> Option<Mat4> {
        let mut current = self.parent(key);
        while let Some(k) = current {
            if self.transform(k).is_some() {
                return self.world_matrix(k);
            }
            current = self.parent(k);
        }
        None
    }

    /// World matrix, resolving stale ancestors first.
    pub fn world_matrix(&self, key: NodeKey) -> Option<Mat4> {
        let transform = self.transform(key)?;
        if !transform.is_world_dirty() {
            return Some(transform.world_matrix_with_parent(None));
        }
        let parent_world = self.parent_world(key);
        Some(transform.world_matrix_with_parent(parent_world.as_ref()))
    }

    pub fn local_matrix(&self, key: NodeKey) -> Option<Mat4> {
        self.transform(key).map(Transform::local_matrix)
    }

    pub fn position(&self, key: NodeKey) -> Option<Vec3> {
        self.world_matrix(key).map(|world| world.w_axis.truncate())
    }

    pub fn rotation(&self, key: NodeKey) -> Option<Quat> {
        self.world_matrix(key).map(|world| world.to_scale_rotation_translation().1)
    }

    pub fn scale(&self, key: NodeKey) -> Option<Vec3> {
        self.world_matrix(key).map(|world| world.to_scale_rotation_translation().0)
    }

    pub fn forward(&self, key: NodeKey) -> Option<Vec3> {
        self.world_matrix(key).map(|world| (-world.z_axis.truncate()).normalize_or_zero())
    }

    pub fn right(&self, key: NodeKey) -> Option<Vec3> {
        self.world_matrix(key).map(|world| world.x_axis.truncate().normalize_or_zero())
    }

    pub fn up(&self, key: NodeKey) -> Option<Vec3> {
        self.world_matrix(key).map(|world| world.y_axis.truncate().normalize_or_zero())
    }

    pub fn set_local_position(&mut self, key: NodeKey, position: Vec3) -> bool {
        self.modify_transform(key, |t| t.set_local_position(position)).is_some()
    }

    pub fn set_local_rotation(&mut self, key: NodeKey, rotation: Quat) -> bool {
        self.modify_transform(key, |t| t.set_local_rotation(rotation)).is_some()
    }

    pub fn set_local_euler_angles(&mut self, key: NodeKey, degrees: Vec3) -> bool {
        self.modify_transform(key, |t| t.set_local_euler_angles(degrees)).is_some()
    }

    pub fn set_local_scale(&mut self, key: NodeKey, scale: Vec3) -> bool {
        self.modify_transform(key, |t| t.set_local_scale(scale)).is_some()
    }

    pub fn set_world_position(&mut self, key: NodeKey, position: Vec3) -> bool {
        let parent = self.parent_world(key);
        self.modify_transform(key, |t| t.set_world_position(position, parent.as_ref())).is_some()
    }

    pub fn set_world_rotation(&mut self, key: NodeKey, rotation: Quat) -> bool {
        let parent = self.parent_world(key);
        self.modify_transform(key, |t| t.set_world_rotation(rotation, parent.as_ref())).is_some()
    }

    pub fn set_world_scale(&mut self, key: NodeKey, scale: Vec3) -> bool {
        let parent = self.parent_world(key);
        self.modify_transform(key, |t| t.set_world_scale(scale, parent.as_ref())).is_some()
    }

    pub fn translate(&mut self, key: NodeKey, delta: Vec3, space: Space) -> bool {
        let parent = self.parent_world(key);
        self.modify_transform(key, |t| t.translate(delta, space, parent.as_ref())).is_some()
    }

    pub fn rotate(&mut self, key: NodeKey, euler_delta_degrees: Vec3, space: Space) -> bool {
        let parent = self.parent_world(key);
        self.modify_transform(key, |t| t.rotate(euler_delta_degrees, space, parent.as_ref())).is_some()
    }

    /// Returns `false` for nodes without a transform and for a degenerate target.
    pub fn look_at(&mut self, key: NodeKey, target: Vec3, up: Vec3) -> bool {
        let parent = self.parent_world(key);
        self.modify_transform(key, |t| t.look_at(target, up, parent.as_ref())).unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
