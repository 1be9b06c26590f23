/// Transform - local pose with lazily cached local and world matrices.
///
/// Rotation is stored canonically as Euler angles in degrees, intrinsic Y-X-Z
/// order (yaw about Y, then pitch about X, then roll about Z), packed as
/// `Vec3(pitch, yaw, roll)`. The quaternion is derived from the angles and
/// cached until the next rotation write. Writing a quaternion converts it to
/// Euler storage immediately.
///
/// Convention: right-handed, Y-up, forward is -Z.
///
/// A Transform does not know its parent. Operations that depend on the parent
/// pose take the parent's world matrix as an explicit argument; `Scene`
/// resolves it by walking the node hierarchy and is responsible for marking
/// descendants world-dirty when a transform changes.
///
/// Caches live in `Cell`s so that matrix getters work through `&self`.
/// A Transform is `Send` but not `Sync`: one thread mutates or reads it at a time.

use std::cell::Cell;
use bitflags::bitflags;
use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

bitflags! {
    /// Stale cache markers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TransformDirty: u8 {
        /// Cached quaternion must be rebuilt from the Euler angles
        const ROTATION = 1 << 0;
        /// Local matrix must be rebuilt (T·R·S)
        const LOCAL = 1 << 1;
        /// World matrix must be recombined with the parent world matrix
        const WORLD = 1 << 2;
    }
}

/// Reference frame for relative transform operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    /// Delta is expressed in the transform's own axes
    Local,
    /// Delta is expressed in world axes
    World,
}

/// Threshold under which a look-at direction or basis vector is degenerate.
const DEGENERATE_EPSILON: f32 = 1e-5;

/// Quaternion from Euler angles in degrees stored as `(pitch, yaw, roll)`.
pub fn quat_from_euler_degrees(euler: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        euler.y.to_radians(),
        euler.x.to_radians(),
        euler.z.to_radians(),
    )
}

/// Euler angles in degrees `(pitch, yaw, roll)` from a quaternion.
pub fn euler_degrees_from_quat(rotation: Quat) -> Vec3 {
    let (yaw, pitch, roll) = rotation.normalize().to_euler(EulerRot::YXZ);
    Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
}

/// Rotation part of a (possibly scaled) world matrix.
fn rotation_of(matrix: &Mat4) -> Quat {
    let (_, rotation, _) = matrix.to_scale_rotation_translation();
    rotation
}

#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    euler_degrees: Vec3,
    scale: Vec3,
    rotation: Cell<Quat>,
    local_matrix: Cell<Mat4>,
    world_matrix: Cell<Mat4>,
    dirty: Cell<TransformDirty>,
    version: u64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Identity pose. All caches start dirty.
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            euler_degrees: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Cell::new(Quat::IDENTITY),
            local_matrix: Cell::new(Mat4::IDENTITY),
            world_matrix: Cell::new(Mat4::IDENTITY),
            dirty: Cell::new(TransformDirty::all()),
            version: 0,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        let mut transform = Self::new();
        transform.position = position;
        transform
    }

    pub fn with_euler_angles(mut self, degrees: Vec3) -> Self {
        self.set_local_euler_angles(degrees);
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_local_scale(scale);
        self
    }

    // ===== LOCAL POSE =====

    pub fn local_position(&self) -> Vec3 {
        self.position
    }

    /// Euler angles in degrees `(pitch, yaw, roll)`.
    pub fn local_euler_angles(&self) -> Vec3 {
        self.euler_degrees
    }

    pub fn local_scale(&self) -> Vec3 {
        self.scale
    }

    /// Cached quaternion, rebuilt from the Euler angles when stale.
    pub fn local_rotation(&self) -> Quat {
        let dirty = self.dirty.get();
        if dirty.contains(TransformDirty::ROTATION) {
            self.rotation.set(quat_from_euler_degrees(self.euler_degrees));
            self.dirty.set(dirty - TransformDirty::ROTATION);
        }
        self.rotation.get()
    }

    pub fn set_local_position(&mut self, position: Vec3) {
        self.position = position;
        self.touch(TransformDirty::empty());
    }

    /// Store a rotation. The quaternion is converted to Euler angles right
    /// away, so reading it back yields the same orientation but not
    /// necessarily the same components.
    pub fn set_local_rotation(&mut self, rotation: Quat) {
        self.euler_degrees = euler_degrees_from_quat(rotation);
        self.touch(TransformDirty::ROTATION);
    }

    pub fn set_local_euler_angles(&mut self, degrees: Vec3) {
        self.euler_degrees = degrees;
        self.touch(TransformDirty::ROTATION);
    }

    pub fn set_local_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.touch(TransformDirty::empty());
    }

    /// Replace the local pose with the decomposition of `local`.
    ///
    /// Assumes a non-skewed matrix; skewed input yields an approximation.
    pub fn set_local_matrix(&mut self, local: &Mat4) {
        let (scale, rotation, translation) = local.to_scale_rotation_translation();
        self.position = translation;
        self.scale = scale;
        self.euler_degrees = euler_degrees_from_quat(rotation);
        self.touch(TransformDirty::ROTATION);
    }

    // ===== DIRECTIONS (local space) =====

    pub fn forward(&self) -> Vec3 {
        self.local_rotation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.local_rotation() * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.local_rotation() * Vec3::Y
    }

    // ===== MATRICES =====

    /// Local matrix `T·R·S`, recomputed only when stale.
    pub fn local_matrix(&self) -> Mat4 {
        let dirty = self.dirty.get();
        if dirty.contains(TransformDirty::LOCAL) {
            let rotation = self.local_rotation();
            self.local_matrix.set(Mat4::from_scale_rotation_translation(
                self.scale, rotation, self.position,
            ));
            self.dirty.set(self.dirty.get() - TransformDirty::LOCAL);
        }
        self.local_matrix.get()
    }

    /// World matrix given the parent's (already resolved) world matrix.
    ///
    /// `parent.world × local` with a parent, `local` without. The cached value
    /// is returned untouched while the transform is not world-dirty, so the
    /// caller must mark it dirty whenever the parent pose changes.
    pub fn world_matrix_with_parent(&self, parent_world: Option<&Mat4>) -> Mat4 {
        if self.dirty.get().contains(TransformDirty::WORLD) {
            let local = self.local_matrix();
            let world = match parent_world {
                Some(parent) => *parent * local,
                None => local,
            };
            self.world_matrix.set(world);
            self.dirty.set(self.dirty.get() - TransformDirty::WORLD);
        }
        self.world_matrix.get()
    }

    // ===== DIRTY STATE =====

    pub fn dirty_flags(&self) -> TransformDirty {
        self.dirty.get()
    }

    pub fn is_local_dirty(&self) -> bool {
        self.dirty.get().contains(TransformDirty::LOCAL)
    }

    pub fn is_world_dirty(&self) -> bool {
        self.dirty.get().contains(TransformDirty::WORLD)
    }

    /// Invalidate the world cache after a parent change. Does not bump the version.
    pub(crate) fn mark_world_dirty(&self) {
        self.dirty.set(self.dirty.get() | TransformDirty::WORLD);
    }

    /// Incremented by every mutator.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self, extra: TransformDirty) {
        self.dirty.set(self.dirty.get() | extra | TransformDirty::LOCAL | TransformDirty::WORLD);
        self.version = self.version.wrapping_add(1);
    }

    // ===== RELATIVE OPERATIONS =====

    /// Move by `delta`.
    ///
    /// `Space::Local` moves along the transform's own axes. `Space::World`
    /// converts the delta into parent space as a direction (w = 0).
    pub fn translate(&mut self, delta: Vec3, space: Space, parent_world: Option<&Mat4>) {
        let local_delta = match space {
            Space::Local => self.local_rotation() * delta,
            Space::World => match parent_world {
                Some(parent) => parent.inverse().transform_vector3(delta),
                None => delta,
            },
        };
        self.set_local_position(self.position + local_delta);
    }

    /// Rotate by Euler angles in degrees `(pitch, yaw, roll)`.
    ///
    /// `Space::Local` post-multiplies the current rotation. `Space::World`
    /// pre-multiplies it, after moving the delta into parent space.
    pub fn rotate(&mut self, euler_delta_degrees: Vec3, space: Space, parent_world: Option<&Mat4>) {
        let delta = quat_from_euler_degrees(euler_delta_degrees);
        let current = self.local_rotation();
        let rotation = match space {
            Space::Local => current * delta,
            Space::World => {
                let parent_rotation = parent_world.map_or(Quat::IDENTITY, rotation_of);
                parent_rotation.inverse() * delta * parent_rotation * current
            }
        };
        self.set_local_rotation(rotation);
    }

    /// Orient the transform so that its forward axis (-Z) points at `target`.
    ///
    /// Returns `false` and leaves the orientation untouched when the target
    /// coincides with the current world position.
    pub fn look_at(&mut self, target: Vec3, up: Vec3, parent_world: Option<&Mat4>) -> bool {
        let world = match parent_world {
            Some(parent) => *parent * self.local_matrix(),
            None => self.local_matrix(),
        };
        let position = world.w_axis.truncate();
        let direction = target - position;
        if direction.length() < DEGENERATE_EPSILON {
            return false;
        }

        let back = -direction.normalize();
        let mut right = up.cross(back);
        if right.length() < DEGENERATE_EPSILON {
            // up is parallel to the view direction
            right = Vec3::Z.cross(back);
            if right.length() < DEGENERATE_EPSILON {
                right = Vec3::X.cross(back);
            }
        }
        let right = right.normalize();
        let true_up = back.cross(right);

        let world_rotation = Quat::from_mat3(&Mat3::from_cols(right, true_up, back));
        let parent_rotation = parent_world.map_or(Quat::IDENTITY, rotation_of);
        self.set_local_rotation(parent_rotation.inverse() * world_rotation);
        true
    }

    // ===== WORLD POSE SETTERS =====

    pub fn set_world_position(&mut self, position: Vec3, parent_world: Option<&Mat4>) {
        let local = match parent_world {
            Some(parent) => parent.inverse().transform_point3(position),
            None => position,
        };
        self.set_local_position(local);
    }

    pub fn set_world_rotation(&mut self, rotation: Quat, parent_world: Option<&Mat4>) {
        let parent_rotation = parent_world.map_or(Quat::IDENTITY, rotation_of);
        self.set_local_rotation(parent_rotation.inverse() * rotation);
    }

    /// Lossy for rotated, non-uniformly scaled parents.
    pub fn set_world_scale(&mut self, scale: Vec3, parent_world: Option<&Mat4>) {
        let local = match parent_world {
            Some(parent) => {
                let (parent_scale, _, _) = parent.to_scale_rotation_translation();
                Vec3::new(
                    if parent_scale.x.abs() > f32::EPSILON { scale.x / parent_scale.x } else { scale.x },
                    if parent_scale.y.abs() > f32::EPSILON { scale.y / parent_scale.y } else { scale.y },
                    if parent_scale.z.abs() > f32::EPSILON { scale.z / parent_scale.z } else { scale.z },
                )
            }
            None => scale,
        };
        self.set_local_scale(local);
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
