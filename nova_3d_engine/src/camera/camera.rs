/// Camera - projection parameters and cached matrices of a camera node.
///
/// The camera owns its projection parameters (field of view, aspect,
/// clip planes, projection mode) and the presentation settings consumed by
/// the renderer (viewport, clear mode, depth order). The view side is
/// derived from the owning node's world matrix, passed in by the scene.
///
/// Derived matrices live in `Cell`s and are rebuilt lazily, tracked by
/// three dirty flags:
/// - VIEW: the world matrix changed since the view was built
/// - PROJECTION: a projection parameter changed
/// - FRUSTUM: the view-projection changed since planes were extracted
///
/// Flags are cleared in dependency order: view and projection, then the
/// combined view-projection, then the frustum.

use std::cell::Cell;
use bitflags::bitflags;
use glam::{Mat4, Vec3, Vec4};
use crate::render::CameraSnapshot;
use crate::scene::NodeKey;
use super::frustum::Frustum;
use super::rect::Rect;

const SOURCE: &str = "nova3d::Camera";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CameraDirty: u8 {
        const VIEW = 1 << 0;
        const PROJECTION = 1 << 1;
        const FRUSTUM = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Perspective,
    Orthographic,
}

/// What the renderer clears before drawing this camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearFlags {
    SolidColor,
    Skybox,
    DepthOnly,
    Nothing,
}

#[derive(Debug, Clone)]
pub struct Camera {
    fov_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Projection,
    ortho_half_height: f32,
    viewport: Rect,
    clear_flags: ClearFlags,
    clear_color: Vec4,
    depth: i32,
    msaa: bool,
    hdr: bool,

    view_matrix: Cell<Mat4>,
    projection_matrix: Cell<Mat4>,
    view_projection: Cell<Mat4>,
    frustum: Cell<Frustum>,
    source_world: Cell<Option<Mat4>>,
    dirty: Cell<CameraDirty>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            projection: Projection::Perspective,
            ortho_half_height: 2.5,
            viewport: Rect::FULL,
            clear_flags: ClearFlags::SolidColor,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            depth: 0,
            msaa: true,
            hdr: false,
            view_matrix: Cell::new(Mat4::IDENTITY),
            projection_matrix: Cell::new(Mat4::IDENTITY),
            view_projection: Cell::new(Mat4::IDENTITY),
            frustum: Cell::new(Frustum::default()),
            source_world: Cell::new(None),
            dirty: Cell::new(CameraDirty::all()),
        }
    }
}

impl Camera {
    /// Perspective camera.
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self::default();
        camera.set_fov_degrees(fov_degrees);
        camera.set_aspect(aspect);
        camera.set_clip_planes(near, far);
        camera
    }

    /// Orthographic camera; the half-width follows from `aspect`.
    pub fn orthographic(half_height: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self::default();
        camera.set_projection(Projection::Orthographic);
        camera.set_ortho_half_height(half_height);
        camera.set_aspect(aspect);
        camera.set_clip_planes(near, far);
        camera
    }

    // ===== GETTERS =====

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn ortho_half_height(&self) -> f32 {
        self.ortho_half_height
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn clear_flags(&self) -> ClearFlags {
        self.clear_flags
    }

    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    /// Render order among cameras; lower draws first.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn msaa(&self) -> bool {
        self.msaa
    }

    pub fn hdr(&self) -> bool {
        self.hdr
    }

    pub fn dirty_flags(&self) -> CameraDirty {
        self.dirty.get()
    }

    /// View matrix as of the last `update_matrices`.
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix.get()
    }

    /// Projection matrix, rebuilt if a parameter changed. A rebuild here
    /// also refreshes the view-projection against the cached view and
    /// leaves the frustum dirty.
    pub fn projection_matrix(&self) -> Mat4 {
        if self.dirty.get().contains(CameraDirty::PROJECTION) {
            self.rebuild_projection();
            self.refresh_view_projection();
        }
        self.projection_matrix.get()
    }

    /// `projection × view` as of the last `update_matrices`.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection.get()
    }

    // ===== SETTERS =====

    pub fn set_fov_degrees(&mut self, fov_degrees: f32) {
        if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
            crate::engine_warn!(SOURCE, "Ignoring field of view {} (expected 0..180 degrees)", fov_degrees);
            return;
        }
        self.fov_degrees = fov_degrees;
        self.mark_dirty(CameraDirty::PROJECTION);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if !(aspect > 0.0 && aspect.is_finite()) {
            crate::engine_warn!(SOURCE, "Ignoring aspect ratio {}", aspect);
            return;
        }
        self.aspect = aspect;
        self.mark_dirty(CameraDirty::PROJECTION);
    }

    /// Set near and far clip distances. Requires `0 < near < far`.
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        if !(near > 0.0 && far > near && far.is_finite()) {
            crate::engine_warn!(SOURCE, "Ignoring clip planes near {} far {}", near, far);
            return;
        }
        self.near = near;
        self.far = far;
        self.mark_dirty(CameraDirty::PROJECTION);
    }

    pub fn set_projection(&mut self, projection: Projection) {
        if self.projection != projection {
            self.projection = projection;
            self.mark_dirty(CameraDirty::PROJECTION);
        }
    }

    pub fn set_ortho_half_height(&mut self, half_height: f32) {
        if !(half_height > 0.0 && half_height.is_finite()) {
            crate::engine_warn!(SOURCE, "Ignoring orthographic half-height {}", half_height);
            return;
        }
        self.ortho_half_height = half_height;
        self.mark_dirty(CameraDirty::PROJECTION);
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub fn set_clear_flags(&mut self, clear_flags: ClearFlags) {
        self.clear_flags = clear_flags;
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    pub fn set_depth(&mut self, depth: i32) {
        self.depth = depth;
    }

    pub fn set_msaa(&mut self, msaa: bool) {
        self.msaa = msaa;
    }

    pub fn set_hdr(&mut self, hdr: bool) {
        self.hdr = hdr;
    }

    /// Adapt the aspect ratio to a resized render area. The viewport's
    /// normalized size is taken into account; zero sizes are ignored.
    pub fn on_render_area_changed(&mut self, width: u32, height: u32) {
        let viewport_width = width as f32 * self.viewport.width();
        let viewport_height = height as f32 * self.viewport.height();
        if viewport_width <= 0.0 || viewport_height <= 0.0 {
            return;
        }
        self.set_aspect(viewport_width / viewport_height);
    }

    fn mark_dirty(&self, flags: CameraDirty) {
        self.dirty.set(self.dirty.get() | flags);
    }

    // ===== MATRICES =====

    /// Bring view, projection and view-projection up to date for the given
    /// world matrix of the owning node. Only stale parts are rebuilt; a
    /// changed view-projection marks the frustum dirty.
    pub fn update_matrices(&self, world: &Mat4) {
        if self.source_world.get() != Some(*world) {
            self.mark_dirty(CameraDirty::VIEW);
        }

        let mut changed = false;
        if self.dirty.get().contains(CameraDirty::VIEW) {
            self.view_matrix.set(view_from_world(world));
            self.source_world.set(Some(*world));
            self.dirty.set(self.dirty.get() - CameraDirty::VIEW);
            changed = true;
        }
        if self.dirty.get().contains(CameraDirty::PROJECTION) {
            self.rebuild_projection();
            changed = true;
        }
        if changed {
            self.refresh_view_projection();
        }
    }

    fn refresh_view_projection(&self) {
        self.view_projection.set(self.projection_matrix.get() * self.view_matrix.get());
        self.mark_dirty(CameraDirty::FRUSTUM);
    }

    /// Culling frustum for the given world matrix.
    pub fn frustum(&self, world: &Mat4) -> Frustum {
        self.update_matrices(world);
        if self.dirty.get().contains(CameraDirty::FRUSTUM) {
            self.frustum.set(Frustum::from_view_projection(&self.view_projection.get()));
            self.dirty.set(self.dirty.get() - CameraDirty::FRUSTUM);
        }
        self.frustum.get()
    }

    fn rebuild_projection(&self) {
        let matrix = match self.projection {
            Projection::Perspective => {
                Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
            }
            Projection::Orthographic => {
                let half_height = self.ortho_half_height;
                let half_width = half_height * self.aspect;
                Mat4::orthographic_rh(-half_width, half_width, -half_height, half_height, self.near, self.far)
            }
        };
        self.projection_matrix.set(matrix);
        self.dirty.set(self.dirty.get() - CameraDirty::PROJECTION);
    }

    /// Immutable copy of everything the renderer needs from this camera.
    pub fn snapshot(&self, camera_id: NodeKey, world: &Mat4) -> CameraSnapshot {
        let frustum = self.frustum(world);
        CameraSnapshot {
            camera_id,
            view: self.view_matrix.get(),
            projection: self.projection_matrix.get(),
            view_projection: self.view_projection.get(),
            position: world.w_axis.truncate(),
            near: self.near,
            far: self.far,
            depth: self.depth,
            frustum,
            viewport: self.viewport,
            clear_flags: self.clear_flags,
            clear_color: self.clear_color,
            msaa: self.msaa,
            hdr: self.hdr,
        }
    }
}

/// Look-at view from a node's world matrix: eye at the translation,
/// looking along -Z, with the node's +Y as up. Scale is ignored.
fn view_from_world(world: &Mat4) -> Mat4 {
    let eye = world.w_axis.truncate();
    let forward = direction_or(-world.z_axis.truncate(), Vec3::NEG_Z);
    let up = direction_or(world.y_axis.truncate(), Vec3::Y);
    Mat4::look_at_rh(eye, eye + forward, up)
}

fn direction_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let n = v.normalize_or_zero();
    if n == Vec3::ZERO { fallback } else { n }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
