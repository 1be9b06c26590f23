/// Cascaded shadow map splitting.
///
/// The camera's view depth range is cut into `count` slices. Each slice
/// gets an orthographic light projection fitted to the slice's eight
/// corners in light space.

use glam::{Mat4, Vec3};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::scene::AABB;
use super::frustum::Frustum;

const SOURCE: &str = "nova3d::Cascade";

/// One cascade: a light-space view-projection covering a depth slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCascade {
    /// Light projection × light view, fitted to the slice
    pub view_projection: Mat4,
    /// View-space distance where the slice starts
    pub near: f32,
    /// View-space distance where the slice ends
    pub far: f32,
    /// Same as `far`; the value shaders compare fragment depth against
    pub split_depth: f32,
}

/// Split distances for `count` cascades over `[near, far]`.
///
/// Each boundary blends a logarithmic and a uniform distribution:
/// `λ·near·(far/near)^(i/n) + (1-λ)·(near + (far-near)·i/n)`.
/// Returns `count + 1` values; the first is exactly `near` and the last
/// exactly `far`. `lambda` is clamped to [0, 1].
pub fn compute_cascade_splits(near: f32, far: f32, count: usize, lambda: f32) -> Vec<f32> {
    let lambda = lambda.clamp(0.0, 1.0);
    let mut splits = Vec::with_capacity(count + 1);
    splits.push(near);

    for i in 1..count {
        let t = i as f32 / count as f32;
        let uniform = near + (far - near) * t;
        let log = near * (far / near).powf(t);
        splits.push(lambda * log + (1.0 - lambda) * uniform);
    }

    if count > 0 {
        splits.push(far);
    }
    splits
}

/// Fit one orthographic projection per cascade slice.
///
/// `frustum` is the camera frustum whose near and far planes sit at
/// `near` and `far`. Corners of each slice are interpolated along the
/// four side edges of the frustum, moved into light space with
/// `light_view`, and bounded by an AABB that becomes the orthographic
/// volume.
///
/// # Errors
///
/// `InvalidArgument` when `near <= 0`, `far <= near`, `count == 0`, an
/// input is not finite, or the frustum corners cannot be solved.
pub fn compute_cascades(
    frustum: &Frustum,
    light_view: &Mat4,
    near: f32,
    far: f32,
    count: usize,
    lambda: f32,
) -> Result<Vec<ShadowCascade>> {
    if !near.is_finite() || !far.is_finite() || !lambda.is_finite() {
        return Err(invalid_argument(format!(
            "cascade parameters must be finite (near {}, far {}, lambda {})",
            near, far, lambda
        )));
    }
    if near <= 0.0 || far <= near {
        return Err(invalid_argument(format!(
            "cascade range requires 0 < near < far (near {}, far {})",
            near, far
        )));
    }
    if count == 0 {
        return Err(invalid_argument("cascade count must be at least 1".to_string()));
    }

    let corners = frustum
        .corners()
        .ok_or_else(|| invalid_argument("camera frustum has parallel planes".to_string()))?;

    let splits = compute_cascade_splits(near, far, count, lambda);
    let depth = far - near;

    let cascades = splits
        .windows(2)
        .map(|window| {
            let (slice_near, slice_far) = (window[0], window[1]);
            let t_near = (slice_near - near) / depth;
            let t_far = (slice_far - near) / depth;

            let mut slice = [Vec3::ZERO; 8];
            for edge in 0..4 {
                let (a, b) = (corners[edge], corners[edge + 4]);
                slice[edge] = a.lerp(b, t_near);
                slice[edge + 4] = a.lerp(b, t_far);
            }

            ShadowCascade {
                view_projection: fit_light_projection(&slice, light_view),
                near: slice_near,
                far: slice_far,
                split_depth: slice_far,
            }
        })
        .collect();

    Ok(cascades)
}

/// View matrix of a directional light travelling along `direction`,
/// looking at `center` from `distance` away. The up axis switches to +X
/// when the light is close to vertical.
pub fn directional_light_view(direction: Vec3, center: Vec3, distance: f32) -> Mat4 {
    let direction = direction.normalize_or_zero();
    let direction = if direction == Vec3::ZERO { Vec3::NEG_Z } else { direction };
    let up = if direction.dot(Vec3::Y).abs() > 0.95 { Vec3::X } else { Vec3::Y };
    let eye = center - direction * distance.max(1.0);
    Mat4::look_at_rh(eye, center, up)
}

/// Orthographic projection bounding `points` in light space, times `light_view`.
fn fit_light_projection(points: &[Vec3; 8], light_view: &Mat4) -> Mat4 {
    let bounds = AABB::from_points(points.iter().map(|p| light_view.transform_point3(*p)))
        .unwrap_or_else(|| AABB::new(Vec3::ZERO, Vec3::ZERO));

    // View space looks down -Z: nearest point has the largest z
    let projection = Mat4::orthographic_rh(
        bounds.min.x,
        bounds.max.x,
        bounds.min.y,
        bounds.max.y,
        -bounds.max.z,
        -bounds.min.z,
    );
    projection * *light_view
}

fn invalid_argument(message: String) -> Error {
    Engine::log_and_return_error(SOURCE, Error::InvalidArgument(message))
}

#[cfg(test)]
#[path = "cascade_tests.rs"]
mod tests;
