use glam::{Mat4, Quat, Vec3};
use super::*;

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

fn approx_mat(a: &Mat4, b: &Mat4) -> bool {
    a.abs_diff_eq(*b, 1e-4)
}

// ============================================================================
// Construction & dirty state
// ============================================================================

#[test]
fn test_new_is_identity_and_dirty() {
    let t = Transform::new();
    assert_eq!(t.local_position(), Vec3::ZERO);
    assert_eq!(t.local_scale(), Vec3::ONE);
    assert_eq!(t.dirty_flags(), TransformDirty::all());
    assert_eq!(t.version(), 0);

    assert_eq!(t.local_matrix(), Mat4::IDENTITY);
    assert!(!t.is_local_dirty());
}

#[test]
fn test_setters_mark_dirty_and_bump_version() {
    let mut t = Transform::new();
    t.local_matrix();
    t.world_matrix_with_parent(None);
    assert!(!t.is_local_dirty());
    assert!(!t.is_world_dirty());

    t.set_local_position(Vec3::new(1.0, 2.0, 3.0));
    assert!(t.is_local_dirty());
    assert!(t.is_world_dirty());
    assert_eq!(t.version(), 1);

    t.set_local_scale(Vec3::splat(2.0));
    t.set_local_euler_angles(Vec3::new(0.0, 45.0, 0.0));
    t.set_local_rotation(Quat::IDENTITY);
    assert_eq!(t.version(), 4);
}

#[test]
fn test_world_matrix_is_idempotent() {
    let mut t = Transform::from_position(Vec3::new(3.0, 0.0, 0.0));
    t.set_local_euler_angles(Vec3::new(10.0, 20.0, 30.0));
    let parent = Mat4::from_translation(Vec3::Y);

    let first = t.world_matrix_with_parent(Some(&parent));
    let flags_after_first = t.dirty_flags();
    let second = t.world_matrix_with_parent(Some(&parent));

    assert_eq!(first, second, "second read must be bit-identical");
    assert_eq!(flags_after_first, t.dirty_flags());
    assert!(flags_after_first.is_empty());
}

#[test]
fn test_world_cache_survives_until_marked_dirty() {
    let t = Transform::from_position(Vec3::X);
    let a = Mat4::from_translation(Vec3::Y);
    let b = Mat4::from_translation(Vec3::Z);

    let first = t.world_matrix_with_parent(Some(&a));
    // Parent changed but nobody invalidated the cache
    assert_eq!(t.world_matrix_with_parent(Some(&b)), first);

    t.mark_world_dirty();
    let refreshed = t.world_matrix_with_parent(Some(&b));
    assert!(approx_vec(refreshed.w_axis.truncate(), Vec3::new(1.0, 0.0, 1.0)));
    assert_eq!(t.version(), 0, "parent-induced invalidation is not a mutation");
}

// ============================================================================
// Matrices
// ============================================================================

#[test]
fn test_local_matrix_is_translate_rotate_scale() {
    let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
    t.set_local_euler_angles(Vec3::new(0.0, 90.0, 0.0));
    t.set_local_scale(Vec3::new(2.0, 1.0, 1.0));

    let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
        * Mat4::from_quat(Quat::from_rotation_y(90f32.to_radians()))
        * Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));

    assert!(approx_mat(&t.local_matrix(), &expected));
}

#[test]
fn test_world_is_parent_times_local() {
    let mut t = Transform::from_position(Vec3::new(0.0, 1.0, -2.0));
    t.set_local_euler_angles(Vec3::new(15.0, -30.0, 5.0));
    let parent = Mat4::from_scale_rotation_translation(
        Vec3::splat(2.0),
        Quat::from_rotation_x(0.3),
        Vec3::new(5.0, 0.0, 0.0),
    );

    let world = t.world_matrix_with_parent(Some(&parent));
    assert!(approx_mat(&world, &(parent * t.local_matrix())));
}

// ============================================================================
// Rotation storage
// ============================================================================

#[test]
fn test_quaternion_round_trip_same_orientation() {
    let inputs = [
        Quat::from_rotation_y(1.2),
        Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.8),
        Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 2.0),
        Quat::from_rotation_z(-2.5),
    ];

    for q in inputs {
        let mut t = Transform::new();
        t.set_local_rotation(q);
        let back = t.local_rotation();
        assert!(
            (back.dot(q).abs() - 1.0).abs() < 1e-4,
            "orientation changed: {:?} vs {:?}", q, back
        );
    }
}

#[test]
fn test_euler_angles_are_canonical_storage() {
    let mut t = Transform::new();
    t.set_local_euler_angles(Vec3::new(30.0, 60.0, 0.0));
    assert_eq!(t.local_euler_angles(), Vec3::new(30.0, 60.0, 0.0));

    // Repeated single-axis nudges accumulate exactly in Euler space
    for _ in 0..10 {
        let e = t.local_euler_angles();
        t.set_local_euler_angles(e + Vec3::new(1.0, 0.0, 0.0));
    }
    assert!((t.local_euler_angles().x - 40.0).abs() < 1e-4);
    assert!((t.local_euler_angles().y - 60.0).abs() < 1e-4);
}

#[test]
fn test_yaw_pitch_roll_mapping() {
    let mut t = Transform::new();
    t.set_local_euler_angles(Vec3::new(0.0, 90.0, 0.0));
    // Yaw +90 turns forward (-Z) to -X
    assert!(approx_vec(t.forward(), Vec3::new(-1.0, 0.0, 0.0)));

    t.set_local_euler_angles(Vec3::new(90.0, 0.0, 0.0));
    // Pitch +90 turns forward up
    assert!(approx_vec(t.forward(), Vec3::Y));
}

// ============================================================================
// Relative operations
// ============================================================================

#[test]
fn test_translate_local_follows_rotation() {
    let mut t = Transform::new();
    t.set_local_euler_angles(Vec3::new(0.0, 90.0, 0.0));
    t.translate(Vec3::new(0.0, 0.0, -1.0), Space::Local, None);
    assert!(approx_vec(t.local_position(), Vec3::new(-1.0, 0.0, 0.0)));
}

#[test]
fn test_translate_world_uses_parent_inverse_as_direction() {
    let parent = Mat4::from_scale_rotation_translation(
        Vec3::ONE,
        Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        Vec3::new(100.0, 0.0, 0.0),
    );
    let mut t = Transform::new();
    let before = t.world_matrix_with_parent(Some(&parent)).w_axis.truncate();

    t.translate(Vec3::new(1.0, 0.0, 0.0), Space::World, Some(&parent));
    t.mark_world_dirty();
    let after = t.world_matrix_with_parent(Some(&parent)).w_axis.truncate();

    // Parent translation must not leak into the delta
    assert!(approx_vec(after - before, Vec3::new(1.0, 0.0, 0.0)));
}

#[test]
fn test_rotate_local_vs_world() {
    let mut local = Transform::new();
    local.set_local_euler_angles(Vec3::new(0.0, 90.0, 0.0));
    local.rotate(Vec3::new(45.0, 0.0, 0.0), Space::Local, None);
    // Pitch about own X after yaw: forward tilts up while still facing -X
    let h = std::f32::consts::FRAC_1_SQRT_2;
    assert!(approx_vec(local.forward(), Vec3::new(-h, h, 0.0)));

    let mut world = Transform::new();
    world.set_local_euler_angles(Vec3::new(0.0, 90.0, 0.0));
    world.rotate(Vec3::new(45.0, 0.0, 0.0), Space::World, None);
    // Pitch about world X applied after yaw: forward (-X) is unaffected by X rotation
    assert!(approx_vec(world.forward(), Vec3::new(-1.0, 0.0, 0.0)));
}

#[test]
fn test_look_at_points_forward_at_target() {
    let mut t = Transform::from_position(Vec3::new(0.0, 0.0, 5.0));
    assert!(t.look_at(Vec3::new(5.0, 0.0, 5.0), Vec3::Y, None));
    assert!(approx_vec(t.forward(), Vec3::X));
    assert!(approx_vec(t.up(), Vec3::Y));
}

#[test]
fn test_look_at_straight_up_uses_fallback_axis() {
    let mut t = Transform::new();
    assert!(t.look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::Y, None));
    assert!(!t.local_rotation().is_nan());
    assert!(t.forward().dot(Vec3::Y) > 0.99);
}

#[test]
fn test_look_at_degenerate_is_noop() {
    let mut t = Transform::from_position(Vec3::new(1.0, 1.0, 1.0));
    t.set_local_euler_angles(Vec3::new(10.0, 20.0, 0.0));
    let version = t.version();

    assert!(!t.look_at(Vec3::new(1.0, 1.0, 1.0), Vec3::Y, None));
    assert_eq!(t.local_euler_angles(), Vec3::new(10.0, 20.0, 0.0));
    assert_eq!(t.version(), version);
}

#[test]
fn test_look_at_with_rotated_parent() {
    let parent = Mat4::from_quat(Quat::from_rotation_y(0.9));
    let mut t = Transform::new();
    t.look_at(Vec3::new(0.0, 0.0, -10.0), Vec3::Y, Some(&parent));

    let world = t.world_matrix_with_parent(Some(&parent));
    let world_forward = -world.z_axis.truncate().normalize();
    assert!(approx_vec(world_forward, Vec3::NEG_Z));
}

// ============================================================================
// World pose setters
// ============================================================================

#[test]
fn test_set_world_pose_under_parent() {
    let parent = Mat4::from_scale_rotation_translation(
        Vec3::splat(2.0),
        Quat::from_rotation_z(0.5),
        Vec3::new(1.0, 2.0, 3.0),
    );
    let mut t = Transform::new();
    t.set_world_position(Vec3::new(-4.0, 0.0, 7.0), Some(&parent));
    t.set_world_rotation(Quat::from_rotation_x(0.25), Some(&parent));
    t.set_world_scale(Vec3::splat(3.0), Some(&parent));

    let world = t.world_matrix_with_parent(Some(&parent));
    let (scale, rotation, translation) = world.to_scale_rotation_translation();
    assert!(approx_vec(translation, Vec3::new(-4.0, 0.0, 7.0)));
    assert!(approx_vec(scale, Vec3::splat(3.0)));
    assert!((rotation.dot(Quat::from_rotation_x(0.25)).abs() - 1.0).abs() < 1e-4);
}

#[test]
fn test_set_local_matrix_decomposes() {
    let m = Mat4::from_scale_rotation_translation(
        Vec3::new(1.0, 2.0, 1.0),
        Quat::from_rotation_y(0.4),
        Vec3::new(0.0, -1.0, 2.0),
    );
    let mut t = Transform::new();
    t.set_local_matrix(&m);
    assert!(approx_mat(&t.local_matrix(), &m));
    assert_eq!(t.version(), 1);
}
