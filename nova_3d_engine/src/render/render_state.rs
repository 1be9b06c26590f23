/// RenderState - the immutable per-frame snapshot handed to the renderer.
///
/// The game thread fills a state from the scene (camera snapshots, lights
/// with their shadow cascades and one item per visible render node), sorts
/// it for submission, then publishes
/// it through the `RenderBufferManager`. After publication the state is
/// only read.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use rdst::{RadixKey, RadixSort};
use crate::camera::{ClearFlags, Frustum, Rect, ShadowCascade};
use crate::scene::{LightType, NodeKey};

/// Opaque mesh reference resolved by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MeshHandle(pub u64);

/// Opaque material reference resolved by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MaterialHandle(pub u64);

/// One draw: world matrix plus mesh and material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderItem {
    pub world_matrix: Mat4,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    /// Material in the high 64 bits, mesh in the low 64 bits
    pub sort_key: u128,
}

impl RenderItem {
    pub fn new(world_matrix: Mat4, mesh: MeshHandle, material: MaterialHandle) -> Self {
        Self {
            world_matrix,
            mesh,
            material,
            sort_key: (u128::from(material.0) << 64) | u128::from(mesh.0),
        }
    }
}

impl RadixKey for RenderItem {
    const LEVELS: usize = 16;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        (self.sort_key >> (level * 8)) as u8
    }
}

/// Per-object GPU uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix
    pub normal: [[f32; 4]; 4],
}

impl ObjectUniforms {
    pub fn from_world(world: &Mat4) -> Self {
        let normal = if world.determinant().abs() > f32::EPSILON {
            world.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        Self {
            model: world.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }
}

/// Everything the renderer needs from one camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    pub camera_id: NodeKey,
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub position: Vec3,
    pub near: f32,
    pub far: f32,
    pub depth: i32,
    pub frustum: Frustum,
    pub viewport: Rect,
    pub clear_flags: ClearFlags,
    pub clear_color: Vec4,
    pub msaa: bool,
    pub hdr: bool,
}

/// A light as seen by the renderer for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LightSnapshot {
    pub light_id: NodeKey,
    pub light_type: LightType,
    pub world_matrix: Mat4,
    pub position: Vec3,
    /// Normalized direction the light travels in (the node's forward axis)
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub range: f32,
    pub spot_angle: f32,
    pub spot_softness: f32,
    pub cast_shadows: bool,
    pub shadow_bias: f32,
    /// Directional shadow cascades fitted to the main camera, nearest first
    pub cascades: Vec<ShadowCascade>,
}

/// Per-light GPU uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniforms {
    pub transform: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub intensity: f32,
    pub light_type: u32,
    pub range: f32,
    pub spot_angle: f32,
    pub spot_softness: f32,
    /// First shadow map of this light, valid when `shadow_count > 0`
    pub shadow_index: u32,
    pub shadow_count: u32,
    pub _pad: [u32; 2],
}

#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub frame_index: u64,
    /// Engine time in seconds when the snapshot was taken
    pub time: f64,
    pub items: Vec<RenderItem>,
    /// The active (main) camera
    pub camera: Option<CameraSnapshot>,
    /// All active cameras, ordered by depth
    pub cameras: Vec<CameraSnapshot>,
    /// Active lights in scene order
    pub lights: Vec<LightSnapshot>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for reuse; allocations are kept.
    pub fn clear(&mut self) {
        self.frame_index = 0;
        self.time = 0.0;
        self.items.clear();
        self.camera = None;
        self.cameras.clear();
        self.lights.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Order items by material, then mesh, to minimize state changes.
    pub fn sort_for_submission(&mut self) {
        self.items.radix_sort_unstable();
    }

    pub fn object_uniforms(&self) -> Vec<ObjectUniforms> {
        self.items
            .iter()
            .map(|item| ObjectUniforms::from_world(&item.world_matrix))
            .collect()
    }

    /// Object uniforms packed for upload, one block per item in item order.
    pub fn object_uniform_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.object_uniforms()).to_vec()
    }

    /// One block per light. Shadow-casting lights get consecutive shadow
    /// map indices: one per cascade for directional lights, one otherwise.
    pub fn light_uniforms(&self) -> Vec<LightUniforms> {
        let mut next_shadow = 0u32;
        self.lights
            .iter()
            .map(|light| {
                let shadow_count = match (light.cast_shadows, light.light_type) {
                    (false, _) | (_, LightType::Ambient) => 0,
                    (true, LightType::Directional) => light.cascades.len() as u32,
                    (true, _) => 1,
                };
                let shadow_index = next_shadow;
                next_shadow += shadow_count;
                LightUniforms {
                    transform: light.world_matrix.to_cols_array_2d(),
                    color: light.color.to_array(),
                    intensity: light.intensity,
                    light_type: light.light_type as u32,
                    range: light.range,
                    spot_angle: light.spot_angle,
                    spot_softness: light.spot_softness,
                    shadow_index,
                    shadow_count,
                    _pad: [0; 2],
                }
            })
            .collect()
    }

    pub fn light_uniform_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.light_uniforms()).to_vec()
    }
}

#[cfg(test)]
#[path = "render_state_tests.rs"]
mod tests;
