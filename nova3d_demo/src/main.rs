//! Headless Nova3D demo
//!
//! Builds a small scene (a camera orbiting a ring of spinning cubes under a
//! shadow-casting sun), loads it through a `SceneManager`, runs the threaded
//! engine for a few seconds and prints what the render thread received.

use std::sync::Arc;
use nova_3d_engine::glam::Vec3;
use nova_3d_engine::nova3d::log::LogSeverity;
use nova_3d_engine::nova3d::render::{MaterialHandle, MeshHandle, MockSubmitter};
use nova_3d_engine::nova3d::runtime::EngineContext;
use nova_3d_engine::nova3d::scene::{
    Light, Node, NodeBehavior, NodeContext, NodeType, RenderData, Scene, SceneManager, Space, AABB,
};
use nova_3d_engine::nova3d::{Engine, EngineOptions, GameComponent, GameEngine, Result};

const RUN_SECONDS: f64 = 3.0;
const CUBE_COUNT: usize = 12;

struct Spin {
    degrees_per_second: f32,
}

impl NodeBehavior for Spin {
    fn update(&mut self, ctx: &mut NodeContext, dt: f32) {
        ctx.scene.rotate(ctx.key, Vec3::new(0.0, self.degrees_per_second * dt, 0.0), Space::Local);
    }
}

/// Keeps the camera circling the origin, looking at it.
struct Orbit {
    radius: f32,
    height: f32,
    angle: f32,
}

impl NodeBehavior for Orbit {
    fn late_update(&mut self, ctx: &mut NodeContext, dt: f32) {
        self.angle += dt * 0.5;
        let position = Vec3::new(self.angle.cos() * self.radius, self.height, self.angle.sin() * self.radius);
        ctx.scene.set_world_position(ctx.key, position);
        if let Some(mut camera) = ctx.scene.as_camera_node(ctx.key) {
            camera.look_at(Vec3::ZERO, Vec3::Y);
        }
    }
}

/// Stops the engine after a fixed wall time.
struct Timer {
    context: Option<Arc<EngineContext>>,
}

impl GameComponent for Timer {
    fn name(&self) -> &str {
        "Timer"
    }

    fn capabilities(&self) -> NodeType {
        NodeType::UPDATE
    }

    fn attach(&mut self, context: Arc<EngineContext>) {
        self.context = Some(context);
    }

    fn update(&mut self, _dt: f32) {
        if let Some(context) = &self.context {
            if context.time() >= RUN_SECONDS {
                context.handle().stop();
            }
        }
    }
}

fn build_scene() -> Result<Scene> {
    let mut scene = Scene::new();

    let camera = scene.spawn_root_child(
        Node::new("Camera", NodeType::CAMERA).with_behavior(Orbit { radius: 12.0, height: 4.0, angle: 0.0 }),
    );
    scene.set_main_camera(camera)?;

    let sun = scene.spawn_root_child(
        Node::new("Sun", NodeType::BASE).with_light(Light::directional().with_shadows(3, 0.5)),
    );
    scene.set_local_euler_angles(sun, Vec3::new(-50.0, 30.0, 0.0));
    scene.spawn_root_child(Node::new("Sky", NodeType::LIGHT));

    let ring = scene.spawn_root_child(
        Node::new("Ring", NodeType::SPATIAL | NodeType::UPDATE).with_behavior(Spin { degrees_per_second: 20.0 }),
    );
    let bounds = AABB::from_center_extents(Vec3::ZERO, Vec3::splat(0.5));
    for i in 0..CUBE_COUNT {
        let angle = i as f32 / CUBE_COUNT as f32 * std::f32::consts::TAU;
        let cube = scene.spawn(
            ring,
            Node::new(format!("Cube{}", i), NodeType::MODEL | NodeType::UPDATE)
                .with_render_data(RenderData::new(MeshHandle(1), MaterialHandle(i as u64 % 3)).with_bounds(bounds))
                .with_behavior(Spin { degrees_per_second: 90.0 }),
        )?;
        scene.set_local_position(cube, Vec3::new(angle.cos() * 5.0, 0.0, angle.sin() * 5.0));
    }
    Ok(scene)
}

fn main() -> Result<()> {
    Engine::set_min_severity(LogSeverity::Info);

    let submitter = MockSubmitter::new();
    let options = EngineOptions::default().with_frame_limit(120.0).with_frame_stats(true);
    let engine = GameEngine::new(options, submitter.clone())?;

    let mut scenes = SceneManager::new();
    scenes.register_scene("ring", build_scene()?);
    scenes.load_scene("ring")?;
    engine.add_component(scenes);
    engine.add_component(Timer { context: None });
    engine.run()?;

    let frames = submitter.frames();
    let visible = frames.iter().map(|frame| frame.item_count).max().unwrap_or(0);
    let shadow_maps = frames.last().map_or(0, |frame| frame.shadow_map_count);
    println!(
        "Built {} frames, submitted {}, at most {} of {} cubes visible, {} shadow maps per frame",
        engine.frame_index(),
        frames.len(),
        visible,
        CUBE_COUNT,
        shadow_maps
    );
    Ok(())
}
