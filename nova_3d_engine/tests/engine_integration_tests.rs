//! Integration tests for the threaded GameEngine
//!
//! Run a scene through the physics, game and render loops with a
//! recording submitter in place of the GPU backend.
//!
//! Run with: cargo test --test engine_integration_tests

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use nova_3d_engine::glam::Vec3;
use nova_3d_engine::nova3d::render::{MaterialHandle, MeshHandle, MockSubmitter};
use nova_3d_engine::nova3d::runtime::EngineContext;
use nova_3d_engine::nova3d::scene::{Node, NodeBehavior, NodeContext, NodeType, RenderData, Scene, Space};
use nova_3d_engine::nova3d::{EngineOptions, GameComponent, GameEngine};

/// Falls along -Y on every physics step.
struct Falling {
    steps: Arc<AtomicU32>,
}

impl NodeBehavior for Falling {
    fn fixed_update(&mut self, ctx: &mut NodeContext, dt: f32) {
        ctx.scene.translate(ctx.key, Vec3::new(0.0, -dt, 0.0), Space::World);
        self.steps.fetch_add(1, Ordering::SeqCst);
    }
}

/// Stops the engine from inside a node once enough physics steps ran.
struct StopAfterSteps {
    steps: Arc<AtomicU32>,
    limit: u32,
}

impl NodeBehavior for StopAfterSteps {
    fn update(&mut self, ctx: &mut NodeContext, _dt: f32) {
        if self.steps.load(Ordering::SeqCst) >= self.limit {
            if let Some(engine) = ctx.engine() {
                engine.handle().stop();
            }
        }
    }
}

fn falling_scene(steps: &Arc<AtomicU32>, limit: u32) -> Scene {
    let mut scene = Scene::new();
    let camera = scene.spawn_root_child(Node::new("camera", NodeType::CAMERA));
    scene.set_local_position(camera, Vec3::new(0.0, 0.0, 10.0));
    scene.set_main_camera(camera).ok();

    let crate_node = Node::new("crate", NodeType::PHYSICS)
        .with_render_data(RenderData::new(MeshHandle(7), MaterialHandle(3)))
        .with_behavior(Falling { steps: steps.clone() });
    scene.spawn_root_child(crate_node);

    scene.spawn_root_child(
        Node::new("director", NodeType::UPDATE).with_behavior(StopAfterSteps { steps: steps.clone(), limit }),
    );
    scene
}

// ============================================================================
// ENGINE LOOP TESTS
// ============================================================================

#[test]
fn test_integration_full_threaded_run() {
    let steps = Arc::new(AtomicU32::new(0));
    let submitter = MockSubmitter::new();
    let options = EngineOptions::default()
        .with_physics(true)
        .with_render_thread(true)
        .with_render_buffer_count(3);
    let engine = GameEngine::new(options, submitter.clone()).unwrap();
    engine.add_component(falling_scene(&steps, 6));

    engine.run().unwrap();

    assert!(steps.load(Ordering::SeqCst) >= 6);
    let frames = submitter.frames();
    assert!(frames.windows(2).all(|pair| pair[0].frame_index < pair[1].frame_index));
    assert!(frames.iter().all(|frame| frame.item_count == 1 && frame.camera_count == 1));
    assert_eq!(*submitter.resizes.lock().unwrap(), vec![(1280, 720)]);
}

#[test]
fn test_integration_stop_from_another_thread() {
    let options = EngineOptions::default().with_physics(true).with_render_thread(true);
    let engine = GameEngine::new(options, MockSubmitter::new()).unwrap();
    engine.add_component(Scene::new());
    let handle = engine.handle();

    thread::scope(|scope| {
        let runner = scope.spawn(|| engine.run());
        thread::sleep(Duration::from_millis(50));
        handle.stop();
        assert!(runner.join().unwrap().is_ok());
    });

    assert!(!engine.is_running());
    assert!(engine.frame_index() > 0);
}

#[test]
fn test_integration_frame_limit_caps_rate() {
    struct StopAfterFrames {
        frames: u32,
        context: Option<Arc<EngineContext>>,
    }

    impl GameComponent for StopAfterFrames {
        fn capabilities(&self) -> NodeType {
            NodeType::UPDATE
        }

        fn attach(&mut self, context: Arc<EngineContext>) {
            self.context = Some(context);
        }

        fn update(&mut self, _dt: f32) {
            self.frames += 1;
            if self.frames >= 6 {
                if let Some(context) = &self.context {
                    context.handle().stop();
                }
            }
        }
    }

    let options = EngineOptions::default()
        .with_physics(false)
        .with_render_thread(false)
        .with_frame_limit(100.0);
    let engine = GameEngine::new(options, MockSubmitter::new()).unwrap();
    engine.add_component(StopAfterFrames { frames: 0, context: None });

    let started = std::time::Instant::now();
    engine.run().unwrap();

    // Five full 10 ms frames before the sixth stops the loop
    assert!(started.elapsed() >= Duration::from_millis(45));
    assert_eq!(engine.frame_index(), 6);
}
