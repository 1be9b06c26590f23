/// Frustum - six clipping planes for visibility culling.
///
/// Each plane is represented as a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing unit normal
/// - D is the signed distance
/// - A point P is inside the frustum if dot(plane, P_homogeneous) >= 0 for all planes
///
/// Planes are extracted from a view-projection matrix that maps depth to
/// the 0..1 clip range (`Mat4::perspective_rh`, `Mat4::orthographic_rh`).

use glam::{Mat4, Vec3, Vec4};
use crate::scene::AABB;

const SOURCE: &str = "nova3d::Frustum";

/// Result of a 3-way frustum/AABB classification.
///
/// - `Outside` → the box can be skipped
/// - `Inside` → the box is fully visible
/// - `Partial` → the box straddles at least one plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// AABB is entirely outside the frustum
    Outside,
    /// AABB is entirely inside the frustum
    Inside,
    /// AABB partially overlaps the frustum
    Partial,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Six frustum planes for culling.
///
/// Each plane is (A, B, C, D) where Ax + By + Cz + D = 0.
/// Normal (A, B, C) points inward (toward the visible volume).
/// Works with both perspective and orthographic projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Default for Frustum {
    /// Frustum of the identity view-projection (the 0..1 depth clip box).
    fn default() -> Self {
        Self::from_view_projection(&Mat4::IDENTITY)
    }
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method. Works for both perspective
    /// and orthographic projections. A plane whose normal degenerates to
    /// zero length is left unnormalized and reported as a warning; the
    /// matrix that produced it is malformed.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        let mut planes = [
            row3 + row0, // left
            row3 - row0, // right
            row3 + row1, // bottom
            row3 - row1, // top
            row2,        // near (depth 0)
            row3 - row2, // far (depth 1)
        ];

        for (index, plane) in planes.iter_mut().enumerate() {
            let normal_len = plane.truncate().length();
            if normal_len > f32::EPSILON && normal_len.is_finite() {
                *plane /= normal_len;
            } else {
                crate::engine_warn!(SOURCE, "Degenerate frustum plane {} (normal length {})", index, normal_len);
            }
        }

        Self { planes }
    }

    /// Frustum of a perspective camera.
    ///
    /// `fov_y_radians` is the vertical field of view; `view` is the
    /// world-to-view matrix.
    pub fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32, view: &Mat4) -> Self {
        let projection = Mat4::perspective_rh(fov_y_radians, aspect, near, far);
        Self::from_view_projection(&(projection * *view))
    }

    /// Frustum of an orthographic camera with the given view-space box.
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
        view: &Mat4,
    ) -> Self {
        let projection = Mat4::orthographic_rh(left, right, bottom, top, near, far);
        Self::from_view_projection(&(projection * *view))
    }

    /// Signed distance from plane `index` to `point` (positive = inside).
    pub fn distance(&self, index: usize, point: Vec3) -> f32 {
        let plane = self.planes[index];
        plane.truncate().dot(point) + plane.w
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }

    /// Eight corner points, solved by intersecting three planes each.
    ///
    /// Order: near (left-bottom, right-bottom, right-top, left-top), then
    /// far in the same order. Returns `None` if any triple of planes is
    /// parallel (malformed frustum).
    pub fn corners(&self) -> Option<[Vec3; 8]> {
        let p = &self.planes;
        let triples = [
            (PLANE_NEAR, PLANE_LEFT, PLANE_BOTTOM),
            (PLANE_NEAR, PLANE_RIGHT, PLANE_BOTTOM),
            (PLANE_NEAR, PLANE_RIGHT, PLANE_TOP),
            (PLANE_NEAR, PLANE_LEFT, PLANE_TOP),
            (PLANE_FAR, PLANE_LEFT, PLANE_BOTTOM),
            (PLANE_FAR, PLANE_RIGHT, PLANE_BOTTOM),
            (PLANE_FAR, PLANE_RIGHT, PLANE_TOP),
            (PLANE_FAR, PLANE_LEFT, PLANE_TOP),
        ];

        let mut corners = [Vec3::ZERO; 8];
        for (corner, (a, b, c)) in corners.iter_mut().zip(triples) {
            *corner = intersect_planes(p[a], p[b], p[c])?;
        }
        Some(corners)
    }

    /// Test if an AABB intersects this frustum.
    ///
    /// Uses the "positive vertex" test: for each plane, find the AABB corner
    /// most in the direction of the plane normal. If that corner is outside,
    /// the AABB is fully outside.
    ///
    /// Returns `true` if the AABB is (potentially) inside or intersecting.
    /// May return false positives (conservative), never false negatives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            normal.dot(positive_vertex(aabb, normal)) + plane.w >= 0.0
        })
    }

    /// Classify an AABB against the frustum (3-way test).
    ///
    /// - If the p-vertex is outside any plane → `Outside` (early out)
    /// - If the n-vertex is outside any plane → at least `Partial`
    /// - If all n-vertices are inside all planes → `Inside`
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        let mut all_inside = true;

        for plane in &self.planes {
            let normal = plane.truncate();

            if normal.dot(positive_vertex(aabb, normal)) + plane.w < 0.0 {
                return FrustumTest::Outside;
            }

            // Negative vertex: corner least in the direction of the normal
            let n_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.min.x } else { aabb.max.x },
                if normal.y >= 0.0 { aabb.min.y } else { aabb.max.y },
                if normal.z >= 0.0 { aabb.min.z } else { aabb.max.z },
            );
            if normal.dot(n_vertex) + plane.w < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }
}

/// Corner most aligned with `normal`.
fn positive_vertex(aabb: &AABB, normal: Vec3) -> Vec3 {
    Vec3::new(
        if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
        if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
        if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
    )
}

/// Point shared by three planes `n·p + d = 0`.
fn intersect_planes(a: Vec4, b: Vec4, c: Vec4) -> Option<Vec3> {
    let (na, nb, nc) = (a.truncate(), b.truncate(), c.truncate());
    let bc = nb.cross(nc);
    let denom = na.dot(bc);
    if denom.abs() < 1e-8 {
        return None;
    }
    let point = -(a.w * bc + b.w * nc.cross(na) + c.w * na.cross(nb)) / denom;
    Some(point)
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
