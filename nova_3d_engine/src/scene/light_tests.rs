use super::*;

#[test]
fn test_default_is_dim_ambient() {
    let light = Light::default();
    assert_eq!(light.light_type(), LightType::Ambient);
    assert_eq!(light.color(), Vec3::ONE);
    assert_eq!(light.intensity(), 0.1);
    assert!(!light.casts_shadows());
}

#[test]
fn test_typed_constructors() {
    let sun = Light::directional();
    assert_eq!(sun.light_type(), LightType::Directional);
    assert_eq!(sun.intensity(), 1.0);
    assert_eq!(sun.range(), 100.0);

    let bulb = Light::point(12.0);
    assert_eq!(bulb.light_type(), LightType::Point);
    assert_eq!(bulb.range(), 12.0);

    let torch = Light::spot(0.4, 20.0);
    assert_eq!(torch.light_type(), LightType::Spot);
    assert_eq!(torch.spot_angle(), 0.4);
    assert_eq!(torch.spot_softness(), 0.2);
}

#[test]
fn test_ambient_cannot_cast_shadows() {
    let mut light = Light::ambient();
    light.set_cast_shadows(true);
    assert!(!light.casts_shadows());

    let sun = Light::directional().with_shadows(3, 0.75);
    assert!(sun.casts_shadows());
    assert_eq!(sun.cascade_count(), 3);
    assert_eq!(sun.split_lambda(), 0.75);
}

#[test]
fn test_cascade_settings_are_clamped() {
    let mut sun = Light::directional();
    sun.set_cascades(0, -1.0);
    assert_eq!(sun.cascade_count(), 1);
    assert_eq!(sun.split_lambda(), 0.0);

    sun.set_cascades(9, 4.0);
    assert_eq!(sun.cascade_count(), MAX_SHADOW_CASCADES);
    assert_eq!(sun.split_lambda(), 1.0);

    sun.set_cascades(2, f32::NAN);
    assert_eq!(sun.cascade_count(), 2);
    assert_eq!(sun.split_lambda(), 1.0);
}

#[test]
fn test_invalid_intensity_and_range_are_ignored() {
    let mut light = Light::point(5.0).with_intensity(2.0);
    light.set_intensity(-1.0);
    light.set_range(0.0);
    light.set_range(f32::INFINITY);
    assert_eq!(light.intensity(), 2.0);
    assert_eq!(light.range(), 5.0);
}
