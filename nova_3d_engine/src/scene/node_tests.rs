use super::*;
use crate::render::{MaterialHandle, MeshHandle};
use crate::scene::LightType;

// ============================================================================
// NodeType
// ============================================================================

#[test]
fn test_camera_implies_spatial_update_render() {
    let tags = NodeType::CAMERA.with_implied();
    assert!(tags.contains(NodeType::BASE | NodeType::SPATIAL | NodeType::UPDATE | NodeType::RENDER));
    assert!(!tags.contains(NodeType::PHYSICS));
}

#[test]
fn test_physics_and_model_imply_spatial() {
    assert!(NodeType::PHYSICS.with_implied().contains(NodeType::SPATIAL));
    let model = NodeType::MODEL.with_implied();
    assert!(model.contains(NodeType::SPATIAL | NodeType::RENDER));
}

#[test]
fn test_plain_update_node_is_not_spatial() {
    let tags = NodeType::UPDATE.with_implied();
    assert_eq!(tags, NodeType::BASE | NodeType::UPDATE);
}

// ============================================================================
// Node construction
// ============================================================================

#[test]
fn test_new_node_is_detached_enabled_not_started() {
    let node = Node::new("player", NodeType::UPDATE);
    assert_eq!(node.name(), "player");
    assert!(node.is_enabled());
    assert!(!node.is_started());
    assert!(node.parent().is_none());
    assert!(node.children().is_empty());
    assert!(node.context().is_none());
}

#[test]
fn test_data_blocks_follow_tags() {
    let base = Node::new("group", NodeType::BASE);
    assert!(base.transform().is_none());
    assert!(base.camera().is_none());

    let spatial = Node::new("pivot", NodeType::SPATIAL);
    assert!(spatial.transform().is_some());
    assert!(spatial.camera().is_none());

    let camera = Node::new("cam", NodeType::CAMERA);
    assert!(camera.transform().is_some());
    assert!(camera.camera().is_some());
    assert!(camera.light().is_none());

    let light = Node::new("lamp", NodeType::LIGHT);
    assert!(light.transform().is_some());
    assert_eq!(light.light().map(Light::light_type), Some(LightType::Ambient));
}

#[test]
fn test_with_light_adds_light_and_spatial() {
    let node = Node::new("sun", NodeType::BASE).with_light(Light::directional().with_shadows(2, 0.5));
    assert!(node.has(NodeType::LIGHT | NodeType::SPATIAL));
    assert!(node.transform().is_some());
    assert_eq!(node.light().map(Light::cascade_count), Some(2));
}

#[test]
fn test_with_render_data_adds_render_tag() {
    let node = Node::new("cube", NodeType::SPATIAL)
        .with_render_data(RenderData::new(MeshHandle(1), MaterialHandle(2)));
    assert!(node.has(NodeType::RENDER));
    let data = node.render_data().unwrap();
    assert_eq!(data.mesh, MeshHandle(1));
    assert!(data.visible);
    assert!(data.local_bounds.is_none());
}

#[test]
fn test_with_camera_on_plain_node() {
    let node = Node::new("late cam", NodeType::BASE).with_camera(Camera::default());
    assert!(node.has(NodeType::CAMERA | NodeType::SPATIAL | NodeType::RENDER));
    assert!(node.transform().is_some());
}

#[test]
fn test_disabled_builder() {
    let node = Node::new("off", NodeType::UPDATE).disabled();
    assert!(!node.is_enabled());
}
