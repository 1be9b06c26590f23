use glam::{Mat4, Quat, Vec3, Vec4};
use slotmap::KeyData;
use crate::camera::FrustumTest;
use crate::scene::{NodeKey, AABB};
use super::*;

fn approx_mat(a: &Mat4, b: &Mat4) -> bool {
    a.abs_diff_eq(*b, 1e-4)
}

fn world_at(position: Vec3) -> Mat4 {
    Mat4::from_translation(position)
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_camera_defaults() {
    let camera = Camera::default();
    assert_eq!(camera.fov_degrees(), 45.0);
    assert!((camera.aspect() - 16.0 / 9.0).abs() < 1e-6);
    assert_eq!(camera.near(), 0.1);
    assert_eq!(camera.far(), 100.0);
    assert_eq!(camera.projection(), Projection::Perspective);
    assert_eq!(camera.ortho_half_height(), 2.5);
    assert_eq!(camera.viewport(), Rect::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(camera.clear_flags(), ClearFlags::SolidColor);
    assert_eq!(camera.clear_color(), Vec4::new(0.0, 0.0, 0.0, 1.0));
    assert_eq!(camera.depth(), 0);
    assert!(camera.msaa());
    assert!(!camera.hdr());
    assert_eq!(camera.dirty_flags(), CameraDirty::all());
}

// ============================================================================
// Dirty state machine
// ============================================================================

#[test]
fn test_update_matrices_clears_view_and_projection() {
    let camera = Camera::default();
    camera.update_matrices(&Mat4::IDENTITY);
    assert_eq!(camera.dirty_flags(), CameraDirty::FRUSTUM);

    camera.frustum(&Mat4::IDENTITY);
    assert!(camera.dirty_flags().is_empty());
}

#[test]
fn test_projection_setter_marks_only_projection() {
    let mut camera = Camera::default();
    camera.frustum(&Mat4::IDENTITY);

    camera.set_fov_degrees(60.0);
    assert_eq!(camera.dirty_flags(), CameraDirty::PROJECTION);

    camera.update_matrices(&Mat4::IDENTITY);
    assert_eq!(camera.dirty_flags(), CameraDirty::FRUSTUM);
}

#[test]
fn test_moving_the_node_marks_view_dirty() {
    let camera = Camera::default();
    camera.frustum(&Mat4::IDENTITY);
    let before = camera.view_matrix();

    camera.update_matrices(&world_at(Vec3::new(0.0, 0.0, 5.0)));
    assert_ne!(camera.view_matrix(), before);
    assert_eq!(camera.dirty_flags(), CameraDirty::FRUSTUM);
}

#[test]
fn test_unchanged_world_keeps_frustum_clean() {
    let camera = Camera::default();
    let world = world_at(Vec3::new(1.0, 2.0, 3.0));
    camera.frustum(&world);

    camera.update_matrices(&world);
    assert!(camera.dirty_flags().is_empty());
}

#[test]
fn test_invalid_parameters_are_ignored() {
    let mut camera = Camera::default();
    camera.frustum(&Mat4::IDENTITY);

    camera.set_clip_planes(5.0, 1.0);
    camera.set_aspect(0.0);
    camera.set_fov_degrees(-10.0);
    assert_eq!(camera.near(), 0.1);
    assert_eq!(camera.far(), 100.0);
    assert!(camera.dirty_flags().is_empty());
}

// ============================================================================
// Matrices
// ============================================================================

#[test]
fn test_view_matrix_is_inverse_of_rigid_world() {
    let camera = Camera::default();
    let world = Mat4::from_rotation_translation(Quat::from_rotation_y(0.7), Vec3::new(3.0, 1.0, -2.0));
    camera.update_matrices(&world);

    assert!(approx_mat(&camera.view_matrix(), &world.inverse()));
}

#[test]
fn test_view_ignores_world_scale() {
    let camera = Camera::default();
    let world = Mat4::from_scale_rotation_translation(Vec3::splat(4.0), Quat::IDENTITY, Vec3::X);
    camera.update_matrices(&world);

    assert!(approx_mat(&camera.view_matrix(), &Mat4::from_translation(-Vec3::X)));
}

#[test]
fn test_perspective_projection_matches_glam() {
    let camera = Camera::perspective(60.0, 2.0, 0.5, 200.0);
    let expected = Mat4::perspective_rh(60f32.to_radians(), 2.0, 0.5, 200.0);
    assert!(approx_mat(&camera.projection_matrix(), &expected));
}

#[test]
fn test_orthographic_half_width_follows_aspect() {
    let camera = Camera::orthographic(3.0, 2.0, 0.1, 50.0);
    let expected = Mat4::orthographic_rh(-6.0, 6.0, -3.0, 3.0, 0.1, 50.0);
    assert!(approx_mat(&camera.projection_matrix(), &expected));
}

#[test]
fn test_view_projection_is_projection_times_view() {
    let camera = Camera::default();
    let world = world_at(Vec3::new(0.0, 2.0, 10.0));
    camera.update_matrices(&world);

    let expected = camera.projection_matrix() * camera.view_matrix();
    assert!(approx_mat(&camera.view_projection_matrix(), &expected));
}

#[test]
fn test_projection_read_before_frustum_keeps_view_projection_current() {
    let mut camera = Camera::default();
    let world = world_at(Vec3::new(0.0, 0.0, 5.0));
    camera.update_matrices(&world);

    camera.set_fov_degrees(90.0);
    let projection = camera.projection_matrix();
    let expected = Mat4::perspective_rh(90f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    assert!(approx_mat(&projection, &expected));
    assert!(approx_mat(&camera.view_projection_matrix(), &(expected * camera.view_matrix())));
    assert_eq!(camera.dirty_flags(), CameraDirty::FRUSTUM);

    // A point at 40 degrees off-axis is only inside the wider field of view
    let off_axis = Vec3::new(10.0 * 40f32.to_radians().tan(), 0.0, -5.0);
    let frustum = camera.frustum(&world);
    assert!(frustum.contains_point(off_axis));
    assert_eq!(frustum, Frustum::from_view_projection(&(expected * camera.view_matrix())));
}

#[test]
fn test_frustum_follows_camera_pose() {
    let camera = Camera::default();
    let box_ahead = AABB::from_center_extents(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);

    let frustum = camera.frustum(&Mat4::IDENTITY);
    assert_ne!(frustum.classify_aabb(&box_ahead), FrustumTest::Outside);

    // Turn around: the box is now behind
    let turned = Mat4::from_rotation_y(std::f32::consts::PI);
    let frustum = camera.frustum(&turned);
    assert_eq!(frustum.classify_aabb(&box_ahead), FrustumTest::Outside);
}

// ============================================================================
// Render area
// ============================================================================

#[test]
fn test_render_area_changes_aspect() {
    let mut camera = Camera::default();
    camera.on_render_area_changed(800, 600);
    assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
}

#[test]
fn test_render_area_uses_viewport_fraction() {
    let mut camera = Camera::default();
    camera.set_viewport(Rect::new(0.0, 0.0, 0.5, 1.0));
    camera.on_render_area_changed(1000, 500);
    assert!((camera.aspect() - 1.0).abs() < 1e-6);
}

#[test]
fn test_zero_render_area_is_ignored() {
    let mut camera = Camera::default();
    let before = camera.aspect();
    camera.on_render_area_changed(0, 720);
    camera.on_render_area_changed(1280, 0);
    assert_eq!(camera.aspect(), before);
}

// ============================================================================
// Snapshot
// ============================================================================

#[test]
fn test_snapshot_copies_settings_and_matrices() {
    let mut camera = Camera::default();
    camera.set_depth(3);
    camera.set_hdr(true);
    camera.set_clear_flags(ClearFlags::Skybox);
    let key = NodeKey::from(KeyData::from_ffi(7));
    let world = world_at(Vec3::new(1.0, 2.0, 3.0));

    let snapshot = camera.snapshot(key, &world);
    assert_eq!(snapshot.camera_id, key);
    assert_eq!(snapshot.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(snapshot.depth, 3);
    assert!(snapshot.hdr);
    assert_eq!(snapshot.clear_flags, ClearFlags::Skybox);
    assert_eq!(snapshot.view_projection, camera.view_projection_matrix());
    assert_eq!(snapshot.frustum, camera.frustum(&world));
}
