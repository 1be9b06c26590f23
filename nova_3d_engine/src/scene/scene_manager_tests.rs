/// Tests for SceneManager
///
/// These tests validate scene creation, registration, loading, removal
/// and forwarding of the engine hooks to the active scene.

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};
use crate::error::Error;
use crate::runtime::{EngineHandle, EngineOptions, ManualClock};
use crate::scene::{Node, NodeBehavior, NodeContext};

/// Counts the updates of the node it sits on.
struct Counter(Arc<AtomicU32>);

impl NodeBehavior for Counter {
    fn update(&mut self, _ctx: &mut NodeContext, _dt: f32) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn counting_scene(counter: &Arc<AtomicU32>) -> Scene {
    let mut scene = Scene::new();
    scene.spawn_root_child(Node::new("counter", NodeType::UPDATE).with_behavior(Counter(counter.clone())));
    scene
}

fn engine_context() -> Arc<EngineContext> {
    Arc::new(EngineContext::new(
        Arc::new(ManualClock::new(0.0)),
        EngineHandle::new(),
        EngineOptions::default(),
    ))
}

// ============================================================================
// Tests: Create / Register
// ============================================================================

#[test]
fn test_scene_manager_new() {
    let sm = SceneManager::new();
    assert_eq!(sm.scene_count(), 0);
    assert!(sm.active_scene().is_none());
}

#[test]
fn test_create_scene_same_as_stored() {
    let mut sm = SceneManager::new();
    let created = sm.create_scene("main").unwrap();
    let retrieved = sm.scene("main").unwrap();

    assert!(Arc::ptr_eq(&created, &retrieved));
    assert!(sm.has_scene("main"));
    assert_eq!(created.lock().unwrap().len(), 1);
}

#[test]
fn test_create_scene_duplicate_name_fails() {
    let mut sm = SceneManager::new();
    sm.create_scene("main").unwrap();

    let result = sm.create_scene("main");
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
    assert_eq!(sm.scene_count(), 1);
}

#[test]
fn test_register_scene_overwrites() {
    let mut sm = SceneManager::new();
    let first = sm.create_scene("level").unwrap();

    let mut prepared = Scene::new();
    prepared.spawn_root_child(Node::new("boss", NodeType::BASE));
    let second = sm.register_scene("level", prepared);

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(sm.scene_count(), 1);
    assert!(sm.scene("level").unwrap().lock().unwrap().find_by_name("boss").is_some());
}

// ============================================================================
// Tests: Load / Active
// ============================================================================

#[test]
fn test_load_scene_sets_active() {
    let mut sm = SceneManager::new();
    let menu = sm.create_scene("menu").unwrap();
    sm.create_scene("level").unwrap();

    sm.load_scene("menu").unwrap();
    assert_eq!(sm.active_scene_name(), Some("menu"));
    assert!(Arc::ptr_eq(&sm.active_scene().unwrap(), &menu));

    sm.load_scene("level").unwrap();
    assert_eq!(sm.active_scene_name(), Some("level"));
}

#[test]
fn test_load_unknown_scene_keeps_active() {
    let mut sm = SceneManager::new();
    sm.create_scene("menu").unwrap();
    sm.load_scene("menu").unwrap();

    assert!(matches!(sm.load_scene("missing"), Err(Error::InvalidOperation(_))));
    assert_eq!(sm.active_scene_name(), Some("menu"));
}

// ============================================================================
// Tests: Remove / Clear
// ============================================================================

#[test]
fn test_remove_scene() {
    let mut sm = SceneManager::new();
    sm.create_scene("main").unwrap();
    sm.create_scene("ui").unwrap();

    assert!(sm.remove_scene("main").is_some());
    assert!(sm.remove_scene("main").is_none());
    assert_eq!(sm.scene_names(), vec!["ui"]);
}

#[test]
fn test_active_scene_cannot_be_removed() {
    let mut sm = SceneManager::new();
    sm.create_scene("main").unwrap();
    sm.load_scene("main").unwrap();

    assert!(sm.remove_scene("main").is_none());
    assert!(sm.has_scene("main"));
}

#[test]
fn test_clear_drops_active() {
    let mut sm = SceneManager::new();
    sm.create_scene("main").unwrap();
    sm.load_scene("main").unwrap();

    sm.clear();

    assert_eq!(sm.scene_count(), 0);
    assert!(sm.active_scene().is_none());
    assert!(sm.create_scene("main").is_ok());
}

// ============================================================================
// Tests: Engine hooks
// ============================================================================

#[test]
fn test_only_active_scene_is_updated() {
    let menu_updates = Arc::new(AtomicU32::new(0));
    let level_updates = Arc::new(AtomicU32::new(0));
    let mut sm = SceneManager::new();
    sm.register_scene("menu", counting_scene(&menu_updates));
    sm.register_scene("level", counting_scene(&level_updates));

    GameComponent::update(&mut sm, 0.016);
    assert_eq!(menu_updates.load(Ordering::SeqCst), 0);

    sm.load_scene("menu").unwrap();
    GameComponent::update(&mut sm, 0.016);
    sm.load_scene("level").unwrap();
    GameComponent::update(&mut sm, 0.016);
    GameComponent::update(&mut sm, 0.016);

    assert_eq!(menu_updates.load(Ordering::SeqCst), 1);
    assert_eq!(level_updates.load(Ordering::SeqCst), 2);
    assert!(sm.scene("level").unwrap().lock().unwrap().is_started());
}

#[test]
fn test_context_reaches_existing_and_new_scenes() {
    let context = engine_context();
    let mut sm = SceneManager::new();
    let early = sm.create_scene("early").unwrap();

    sm.attach(context.clone());
    let late = sm.create_scene("late").unwrap();

    assert!(early.lock().unwrap().context().is_some_and(|c| Arc::ptr_eq(c, &context)));
    assert!(late.lock().unwrap().context().is_some_and(|c| Arc::ptr_eq(c, &context)));
}

#[test]
fn test_render_area_reaches_scenes_loaded_later() {
    let mut sm = SceneManager::new();
    let early = sm.create_scene("early").unwrap();
    let camera = early.lock().unwrap().spawn_root_child(Node::new("camera", NodeType::CAMERA));

    sm.on_render_area_changed(800, 400);

    let mut prepared = Scene::new();
    let late_camera = prepared.spawn_root_child(Node::new("camera", NodeType::CAMERA));
    let late = sm.register_scene("late", prepared);

    assert_eq!(early.lock().unwrap().camera(camera).map(|c| c.aspect()), Some(2.0));
    assert_eq!(late.lock().unwrap().camera(late_camera).map(|c| c.aspect()), Some(2.0));
}

#[test]
fn test_render_collects_active_scene() {
    let mut sm = SceneManager::new();
    let scene = sm.create_scene("main").unwrap();
    scene.lock().unwrap().spawn_root_child(Node::new("camera", NodeType::CAMERA));

    let mut state = RenderState::new();
    sm.render(&mut state);
    assert!(state.camera.is_none());

    sm.load_scene("main").unwrap();
    sm.render(&mut state);
    assert_eq!(state.cameras.len(), 1);
}
