use crate::error::Error;
use super::*;

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_defaults() {
    let options = EngineOptions::default();
    assert!((options.fixed_delta_time - 1.0 / 60.0).abs() < 1e-7);
    assert!((options.max_delta_time - 1.0 / 15.0).abs() < 1e-7);
    assert_eq!(options.target_frame_rate, 60.0);
    assert!(!options.limit_frame_rate);
    assert_eq!(options.max_sub_steps, 5);
    assert!(options.run_physics);
    assert_eq!(options.render_buffer_count, 2);
    assert!(options.run_render_thread);
    assert!(!options.show_frame_stats);
    assert_eq!((options.render_width, options.render_height), (1280, 720));
    assert!(options.validate().is_ok());
}

#[test]
fn test_builders() {
    let options = EngineOptions::default()
        .with_physics(false)
        .with_render_thread(false)
        .with_render_buffer_count(3)
        .with_frame_limit(30.0)
        .with_render_area(640, 480);

    assert!(!options.run_physics);
    assert!(!options.run_render_thread);
    assert_eq!(options.render_buffer_count, 3);
    assert!(options.limit_frame_rate);
    assert_eq!(options.target_frame_rate, 30.0);
    assert_eq!(options.render_width, 640);
    assert!(options.validate().is_ok());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_rejects_bad_deltas() {
    let cases = [
        EngineOptions::default().with_fixed_delta_time(0.0),
        EngineOptions::default().with_fixed_delta_time(f32::NAN),
        EngineOptions::default().with_max_delta_time(-1.0),
        EngineOptions::default().with_fixed_delta_time(0.1).with_max_delta_time(0.05),
    ];
    for options in cases {
        assert!(matches!(options.validate(), Err(Error::InvalidConfig(_))), "{:?}", options);
    }
}

#[test]
fn test_rejects_zero_sub_steps() {
    let options = EngineOptions::default().with_max_sub_steps(0);
    assert!(matches!(options.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_rejects_buffer_count_out_of_range() {
    for count in [0, 4] {
        let options = EngineOptions::default().with_render_buffer_count(count);
        assert!(matches!(options.validate(), Err(Error::InvalidConfig(_))));
    }
    assert!(EngineOptions::default().with_render_buffer_count(1).validate().is_ok());
}

#[test]
fn test_rejects_empty_render_area() {
    let options = EngineOptions::default().with_render_area(0, 720);
    assert!(matches!(options.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_frame_rate_checked_only_when_limiting() {
    let mut options = EngineOptions::default();
    options.target_frame_rate = 0.0;
    assert!(options.validate().is_ok());

    options.limit_frame_rate = true;
    assert!(matches!(options.validate(), Err(Error::InvalidConfig(_))));
}
