//! Browser front end: thin `#[wasm_bindgen]` wrappers around one [`Scene`].
//!
//! Each binding extracts from the thread-local scene and calls the core
//! functions; nothing here holds logic of its own.

use std::cell::RefCell;

use glam::Mat4;
use wasm_bindgen::prelude::*;

use crate::config::SceneConfig;
use crate::logging;
use crate::render::{FrameContext, UniformBuffer};
use crate::scene::{PlaybackCommand, Scene};
use crate::skeleton::BuiltinSkeletons;

// Global state access, thin wrapper for WASM bindings only
thread_local! {
    static SCENE: RefCell<Option<Scene>> = const { RefCell::new(None) };
}

fn with_scene<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&Scene) -> R,
{
    SCENE.with(|scene| {
        let borrowed = scene.borrow();
        borrowed.as_ref().map(f)
    })
}

fn with_scene_mut<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Scene) -> R,
{
    SCENE.with(|scene| {
        let mut borrowed = scene.borrow_mut();
        borrowed.as_mut().map(f)
    })
}

fn mat4_from_slice(values: &[f32]) -> Result<Mat4, JsValue> {
    let array: &[f32; 16] = values
        .try_into()
        .map_err(|_| JsValue::from_str(&format!("expected 16 floats, got {}", values.len())))?;
    Ok(Mat4::from_cols_array(array))
}

/// Build the scene from an optional JSON config (empty string for defaults)
#[wasm_bindgen]
pub fn init_rig(config_json: &str) -> Result<(), JsValue> {
    let config = if config_json.trim().is_empty() {
        SceneConfig::default()
    } else {
        SceneConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
    };

    let level = config.level_filter().map_err(|e| JsValue::from_str(&e.to_string()))?;
    logging::init(level);

    let mut scene =
        Scene::from_config(&config, &BuiltinSkeletons).map_err(|e| JsValue::from_str(&e.to_string()))?;
    scene.initialize(|_, _| {});

    SCENE.with(|slot| *slot.borrow_mut() = Some(scene));
    Ok(())
}

/// Advance simulation time (call each frame with delta time)
#[wasm_bindgen]
pub fn advance_time(delta_ms: f32) {
    with_scene_mut(|scene| scene.frame(delta_ms / 1000.0));
}

/// Returns whether the key is bound to a playback command
#[wasm_bindgen]
pub fn key_pressed(key: &str, pressed: bool) -> bool {
    with_scene_mut(|scene| scene.handle_key_name(key, pressed)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn toggle_pause() {
    with_scene_mut(|scene| scene.handle(PlaybackCommand::TogglePause));
}

#[wasm_bindgen]
pub fn reset_animation() {
    with_scene_mut(|scene| scene.handle(PlaybackCommand::Reset));
}

#[wasm_bindgen]
pub fn next_keyframe() {
    with_scene_mut(|scene| scene.handle(PlaybackCommand::NextKeyframe));
}

#[wasm_bindgen]
pub fn prev_keyframe() {
    with_scene_mut(|scene| scene.handle(PlaybackCommand::PrevKeyframe));
}

/// Per-part uniforms for this frame, 48 floats per part, joint then bone
/// for every joint in depth-first order.
#[wasm_bindgen]
pub fn part_uniforms(view: &[f32], projection: &[f32], image_index: u32) -> Result<Vec<f32>, JsValue> {
    let frame = FrameContext::new(image_index, mat4_from_slice(view)?, mat4_from_slice(projection)?);

    Ok(with_scene(|scene| {
        let mut buffer = UniformBuffer::new();
        scene.render(&frame, &mut buffer);
        buffer.as_floats().to_vec()
    })
    .unwrap_or_default())
}

/// Column-major world matrix of the named joint, empty if unknown
#[wasm_bindgen]
pub fn joint_world_matrix(name: &str) -> Vec<f32> {
    with_scene(|scene| {
        let skeleton = scene.skeleton();
        skeleton
            .find_joint(name)
            .and_then(|id| skeleton.joint(id))
            .map(|joint| joint.world_matrix().to_cols_array().to_vec())
    })
    .flatten()
    .unwrap_or_default()
}

/// Current pose of the named joint in degrees, empty if unknown
#[wasm_bindgen]
pub fn joint_pose(name: &str) -> Vec<f32> {
    with_scene(|scene| {
        let skeleton = scene.skeleton();
        skeleton
            .find_joint(name)
            .and_then(|id| skeleton.joint(id))
            .map(|joint| joint.angles().to_array().to_vec())
    })
    .flatten()
    .unwrap_or_default()
}

#[wasm_bindgen]
pub fn skeleton_position() -> Vec<f32> {
    with_scene(|scene| scene.skeleton().position().to_array().to_vec()).unwrap_or_default()
}

/// Index of the current keyframe, or -1 when there is none
#[wasm_bindgen]
pub fn current_keyframe_index() -> i32 {
    with_scene(|scene| scene.animation().current_keyframe_index())
        .flatten()
        .map_or(-1, |i| i as i32)
}

#[wasm_bindgen]
pub fn keyframe_count() -> usize {
    with_scene(|scene| scene.animation().keyframe_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn is_paused() -> bool {
    with_scene(|scene| scene.animation().is_paused()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn current_time() -> f32 {
    with_scene(|scene| scene.animation().current_time()).unwrap_or(0.0)
}
