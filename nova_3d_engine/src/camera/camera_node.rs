/// CameraNode - camera capability view over a scene node.
///
/// Combines the node's `Camera` block with its transform. Manipulation
/// helpers (pan, tilt, dolly, look-at) edit the transform through the
/// scene so that children are invalidated; matrix accessors resolve the
/// world matrix first. Everything is a no-op, or `None`, for a node
/// without a transform.

use glam::{Mat4, Vec3};
use crate::render::CameraSnapshot;
use crate::scene::{NodeKey, Scene, Space};
use super::camera::Camera;
use super::frustum::Frustum;

/// Pitch limit for `tilt`, in degrees.
const MAX_PITCH_DEGREES: f32 = 89.0;

pub struct CameraNode<'a> {
    scene: &'a mut Scene,
    key: NodeKey,
}

impl<'a> CameraNode<'a> {
    pub(crate) fn new(scene: &'a mut Scene, key: NodeKey) -> Self {
        Self { scene, key }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.scene.camera(self.key)
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.scene.camera_mut(self.key)
    }

    // ===== MANIPULATION =====

    pub fn look_at(&mut self, target: Vec3, up: Vec3) -> bool {
        self.scene.look_at(self.key, target, up)
    }

    /// Slide along the camera's world right and up axes.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (Some(right), Some(up)) = (self.scene.right(self.key), self.scene.up(self.key)) else {
            return;
        };
        self.scene.translate(self.key, right * dx + up * dy, Space::World);
    }

    /// Add `dx` degrees of yaw and `dy` degrees of pitch. Pitch is clamped
    /// to ±89° so the camera never flips over the pole.
    pub fn tilt(&mut self, dx: f32, dy: f32) {
        let Some(euler) = self.scene.transform(self.key).map(|t| t.local_euler_angles()) else {
            return;
        };
        let pitch = (euler.x + dy).clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES);
        let yaw = euler.y + dx;
        self.scene.set_local_euler_angles(self.key, Vec3::new(pitch, yaw, euler.z));
    }

    /// Move along the camera's world forward axis.
    pub fn dolly(&mut self, delta: f32) {
        let Some(forward) = self.scene.forward(self.key) else { return };
        self.scene.translate(self.key, forward * delta, Space::World);
    }

    // ===== MATRICES =====

    fn world(&self) -> Option<Mat4> {
        self.scene.world_matrix(self.key)
    }

    /// Camera with its matrices refreshed against the current world pose.
    fn refreshed(&self) -> Option<&Camera> {
        let world = self.world()?;
        let camera = self.camera()?;
        camera.update_matrices(&world);
        Some(camera)
    }

    /// Refresh cached matrices. Returns `false` without a transform.
    pub fn update_matrices(&self) -> bool {
        self.refreshed().is_some()
    }

    pub fn view_matrix(&self) -> Option<Mat4> {
        self.refreshed().map(Camera::view_matrix)
    }

    pub fn projection_matrix(&self) -> Option<Mat4> {
        self.refreshed().map(Camera::projection_matrix)
    }

    pub fn view_projection_matrix(&self) -> Option<Mat4> {
        self.refreshed().map(Camera::view_projection_matrix)
    }

    pub fn frustum(&self) -> Option<Frustum> {
        let world = self.world()?;
        self.camera().map(|camera| camera.frustum(&world))
    }

    /// Authoritative refresh right before rendering: matrices and frustum
    /// are brought up to date, then the node's `pre_render` hook runs.
    pub fn pre_render(&mut self) {
        if self.frustum().is_none() {
            return;
        }
        self.scene.invoke(self.key, |behavior, ctx| behavior.pre_render(ctx));
    }

    pub fn snapshot(&self) -> Option<CameraSnapshot> {
        let world = self.world()?;
        self.camera().map(|camera| camera.snapshot(self.key, &world))
    }
}

#[cfg(test)]
#[path = "camera_node_tests.rs"]
mod tests;
