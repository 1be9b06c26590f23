//! Named scenes and the active one.
//!
//! Scenes are shared as `Arc<Mutex<Scene>>` so game code can keep a handle
//! to a scene while the manager drives it. Registered as a `GameComponent`,
//! the manager forwards every engine hook to the active scene only.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::render::RenderState;
use crate::runtime::{EngineContext, GameComponent};
use super::node::NodeType;
use super::scene::Scene;

const SOURCE: &str = "nova3d::SceneManager";

fn lock(scene: &Mutex<Scene>) -> MutexGuard<'_, Scene> {
    scene.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct SceneManager {
    scenes: FxHashMap<String, Arc<Mutex<Scene>>>,
    active: Option<String>,
    context: Option<Arc<EngineContext>>,
    render_area: Option<(u32, u32)>,
}

impl SceneManager {
    /// Create a new empty scene manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scene under `name`.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if a scene with this name already exists.
    pub fn create_scene(&mut self, name: &str) -> Result<Arc<Mutex<Scene>>> {
        if self.scenes.contains_key(name) {
            crate::engine_bail!(SOURCE, "Scene '{}' already exists", name);
        }
        let scene = self.adopt(Scene::new());
        self.scenes.insert(name.to_string(), scene.clone());
        crate::engine_info!(SOURCE, "Created scene '{}'", name);
        Ok(scene)
    }

    /// Register a prepared scene under `name`, replacing any scene already
    /// registered there (the active one included).
    pub fn register_scene(&mut self, name: &str, scene: Scene) -> Arc<Mutex<Scene>> {
        if self.scenes.contains_key(name) {
            crate::engine_warn!(SOURCE, "Scene '{}' already exists, overwriting", name);
        }
        let scene = self.adopt(scene);
        self.scenes.insert(name.to_string(), scene.clone());
        crate::engine_info!(SOURCE, "Registered scene '{}'", name);
        scene
    }

    /// Make `name` the active scene.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if no scene has this name.
    pub fn load_scene(&mut self, name: &str) -> Result<()> {
        if !self.scenes.contains_key(name) {
            crate::engine_bail!(SOURCE, "Scene '{}' not found, cannot load", name);
        }
        if let Some(previous) = self.active.as_deref() {
            crate::engine_info!(SOURCE, "Unloading scene '{}'", previous);
        }
        self.active = Some(name.to_string());
        crate::engine_info!(SOURCE, "Loaded scene '{}'", name);
        Ok(())
    }

    pub fn active_scene(&self) -> Option<Arc<Mutex<Scene>>> {
        self.active.as_ref().and_then(|name| self.scenes.get(name)).cloned()
    }

    pub fn active_scene_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn scene(&self, name: &str) -> Option<Arc<Mutex<Scene>>> {
        self.scenes.get(name).cloned()
    }

    pub fn has_scene(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    /// Remove a scene. The active scene cannot be removed.
    pub fn remove_scene(&mut self, name: &str) -> Option<Arc<Mutex<Scene>>> {
        if self.active.as_deref() == Some(name) {
            crate::engine_warn!(SOURCE, "Cannot remove active scene '{}'", name);
            return None;
        }
        let removed = self.scenes.remove(name);
        if removed.is_some() {
            crate::engine_info!(SOURCE, "Removed scene '{}'", name);
        }
        removed
    }

    pub fn scene_names(&self) -> Vec<&str> {
        self.scenes.keys().map(String::as_str).collect()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Drop every scene, the active one included.
    pub fn clear(&mut self) {
        self.scenes.clear();
        self.active = None;
        crate::engine_info!(SOURCE, "Cleared all scenes");
    }

    /// Hand the engine context and the last render area to a new scene.
    fn adopt(&self, mut scene: Scene) -> Arc<Mutex<Scene>> {
        if let Some(context) = &self.context {
            scene.set_context(context.clone());
        }
        if let Some((width, height)) = self.render_area {
            scene.on_render_area_changed(width, height);
        }
        Arc::new(Mutex::new(scene))
    }

    fn with_active(&self, f: impl FnOnce(&mut Scene)) {
        if let Some(scene) = self.active_scene() {
            f(&mut lock(&scene));
        }
    }
}

impl GameComponent for SceneManager {
    fn name(&self) -> &str {
        "SceneManager"
    }

    fn capabilities(&self) -> NodeType {
        NodeType::UPDATE | NodeType::PHYSICS | NodeType::RENDER
    }

    fn attach(&mut self, context: Arc<EngineContext>) {
        for scene in self.scenes.values() {
            lock(scene).set_context(context.clone());
        }
        self.context = Some(context);
    }

    fn fixed_update(&mut self, dt: f32) {
        self.with_active(|scene| GameComponent::fixed_update(scene, dt));
    }

    fn update(&mut self, dt: f32) {
        self.with_active(|scene| GameComponent::update(scene, dt));
    }

    fn late_update(&mut self, dt: f32) {
        self.with_active(|scene| GameComponent::late_update(scene, dt));
    }

    fn render(&mut self, state: &mut RenderState) {
        self.with_active(|scene| GameComponent::render(scene, state));
    }

    /// Every scene follows the render area, so a scene loaded later starts
    /// with the right aspect.
    fn on_render_area_changed(&mut self, width: u32, height: u32) {
        self.render_area = Some((width, height));
        for scene in self.scenes.values() {
            lock(scene).on_render_area_changed(width, height);
        }
    }
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("scenes", &self.scenes.len())
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
#[path = "scene_manager_tests.rs"]
mod tests;
