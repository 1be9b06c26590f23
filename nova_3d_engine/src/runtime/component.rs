/// Components driven by the engine loops.
///
/// A component declares which loops it takes part in through
/// `capabilities()`: PHYSICS components get `fixed_update` on the physics
/// thread, UPDATE components get `update` then `late_update` on the game
/// thread, RENDER components fill the frame's `RenderState`.

use std::sync::Arc;
use crate::render::RenderState;
use crate::scene::{NodeType, Scene};
use super::context::EngineContext;

pub trait GameComponent: Send {
    fn name(&self) -> &str {
        "component"
    }

    fn capabilities(&self) -> NodeType;

    /// Called once when the component is registered.
    fn attach(&mut self, _context: Arc<EngineContext>) {}

    fn fixed_update(&mut self, _dt: f32) {}
    fn update(&mut self, _dt: f32) {}
    fn late_update(&mut self, _dt: f32) {}

    /// Append this component's contribution to the frame being built.
    fn render(&mut self, _state: &mut RenderState) {}

    fn on_render_area_changed(&mut self, _width: u32, _height: u32) {}
}

/// External physics world stepped on the fixed cadence before the
/// components' `fixed_update`.
pub trait PhysicsSimulation: Send {
    fn step(&mut self, dt: f32);
}

impl GameComponent for Scene {
    fn name(&self) -> &str {
        "Scene"
    }

    fn capabilities(&self) -> NodeType {
        NodeType::UPDATE | NodeType::PHYSICS | NodeType::RENDER
    }

    fn attach(&mut self, context: Arc<EngineContext>) {
        self.set_context(context);
    }

    fn fixed_update(&mut self, dt: f32) {
        if !self.is_started() {
            self.start();
        }
        Scene::fixed_update(self, dt);
    }

    fn update(&mut self, dt: f32) {
        if !self.is_started() {
            self.start();
        }
        Scene::update(self, dt);
    }

    fn late_update(&mut self, dt: f32) {
        Scene::late_update(self, dt);
    }

    fn render(&mut self, state: &mut RenderState) {
        self.pre_render();
        self.collect_render_state(state);
        self.post_render();
    }

    fn on_render_area_changed(&mut self, width: u32, height: u32) {
        Scene::on_render_area_changed(self, width, height);
    }
}
