//! Per-frame driver tying one animation to one skeleton.
//!
//! Core functions take explicit references; the scene only sequences them:
//! advance the cursor, apply poses and root position, propagate matrices,
//! then submit transforms to the rendering layer.

use crate::animation::{Animation, AnimationClip};
use crate::config::SceneConfig;
use crate::error::Result;
use crate::joint::{Joint, JointId, LogLimitObserver};
use crate::render::{FrameContext, TransformSink};
use crate::skeleton::{Skeleton, SkeletonSource};

/// Discrete playback controls bound to key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    TogglePause,
    Reset,
    NextKeyframe,
    PrevKeyframe,
}

impl PlaybackCommand {
    /// Space toggles pause, `r` resets, `m`/`n` step forward/back a keyframe.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            ' ' => Some(Self::TogglePause),
            'r' => Some(Self::Reset),
            'm' => Some(Self::NextKeyframe),
            'n' => Some(Self::PrevKeyframe),
            _ => None,
        }
    }

    /// Map a browser key name. Only single-character names are bound, so
    /// named keys such as `"Meta"` or `"NumLock"` never fire a command.
    pub fn from_key_name(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        let (Some(key), None) = (chars.next(), chars.next()) else {
            return None;
        };
        Self::from_key(key)
    }
}

#[derive(Debug)]
pub struct Scene {
    skeleton: Skeleton,
    animation: Animation,
}

impl Scene {
    pub fn new(skeleton: Skeleton, animation: Animation) -> Self {
        Self {
            skeleton,
            animation,
        }
    }

    /// Build the configured scene.
    ///
    /// A skeleton that fails to resolve degrades to an empty one; an unknown
    /// clip is an error.
    pub fn from_config(config: &SceneConfig, source: &dyn SkeletonSource) -> Result<Self> {
        let mut skeleton = Skeleton::load(source, &config.skeleton);
        if config.report_limit_hits {
            skeleton.set_limit_observer(LogLimitObserver);
        }

        let mut animation = AnimationClip::builtin(&config.clip)?.to_animation();
        if let Some(looping) = config.looping {
            animation.set_looping(looping);
        }
        if let Some(duration) = config.duration {
            animation.set_duration(duration);
        }

        log::info!(
            "Scene ready: skeleton '{}' ({} joints), clip '{}' ({} keyframes, {}s{})",
            skeleton.name(),
            skeleton.len(),
            config.clip,
            animation.keyframe_count(),
            animation.duration(),
            if animation.is_looping() { ", looping" } else { "" }
        );

        Ok(Self::new(skeleton, animation))
    }

    /// Run the initialization traversal; `visit` sees each joint pre-order.
    pub fn initialize(&mut self, visit: impl FnMut(JointId, &Joint)) {
        self.skeleton.initialize(visit);
    }

    /// Advance one frame by `delta_time` seconds and recompute every matrix.
    pub fn frame(&mut self, delta_time: f32) {
        self.animation.update(delta_time);
        self.animation.apply_to_skeleton(&mut self.skeleton);
        self.skeleton.update();
    }

    /// Hand this frame's part transforms to the rendering layer.
    pub fn render<S: TransformSink + ?Sized>(&self, frame: &FrameContext, sink: &mut S) {
        self.skeleton.submit(frame, sink);
    }

    pub fn handle(&mut self, command: PlaybackCommand) {
        match command {
            PlaybackCommand::TogglePause => {
                self.animation.toggle_pause();
                log::info!("{}", if self.animation.is_paused() { "Paused" } else { "Playing" });
            }
            PlaybackCommand::Reset => {
                self.animation.reset();
                log::info!("Animation reset");
            }
            PlaybackCommand::NextKeyframe => {
                self.animation.next_keyframe();
                self.log_keyframe();
            }
            PlaybackCommand::PrevKeyframe => {
                self.animation.prev_keyframe();
                self.log_keyframe();
            }
        }
    }

    /// Dispatch a key event; only presses act. Returns whether the key is bound.
    pub fn handle_key(&mut self, key: char, pressed: bool) -> bool {
        self.dispatch(PlaybackCommand::from_key(key), pressed)
    }

    /// Like [`Scene::handle_key`] for a browser key name.
    pub fn handle_key_name(&mut self, key: &str, pressed: bool) -> bool {
        self.dispatch(PlaybackCommand::from_key_name(key), pressed)
    }

    fn dispatch(&mut self, command: Option<PlaybackCommand>, pressed: bool) -> bool {
        let Some(command) = command else {
            return false;
        };
        if pressed {
            self.handle(command);
        }
        true
    }

    fn log_keyframe(&self) {
        if let Some(index) = self.animation.current_keyframe_index() {
            log::info!("Keyframe {} / {}", index, self.animation.keyframe_count() - 1);
        }
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animation
    }

    /// Release every joint post-order and drop the tree
    pub fn destroy(&mut self, release: impl FnMut(JointId, &Joint)) {
        self.skeleton.destroy(release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::{LimitHit, LimitObserver};
    use crate::math::{Mat4, Vec3};
    use crate::names::ANIMATED_JOINTS;
    use crate::render::{PartKind, UniformBuffer};
    use crate::skeleton::{BuiltinSkeletons, JsonSkeletonSource};
    use std::cell::Cell;
    use std::rc::Rc;

    fn body_scene() -> Scene {
        Scene::from_config(&SceneConfig::default(), &BuiltinSkeletons).unwrap()
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(PlaybackCommand::from_key(' '), Some(PlaybackCommand::TogglePause));
        assert_eq!(PlaybackCommand::from_key('R'), Some(PlaybackCommand::Reset));
        assert_eq!(PlaybackCommand::from_key('m'), Some(PlaybackCommand::NextKeyframe));
        assert_eq!(PlaybackCommand::from_key('n'), Some(PlaybackCommand::PrevKeyframe));
        assert_eq!(PlaybackCommand::from_key('q'), None);
    }

    #[test]
    fn test_key_names_bind_single_characters_only() {
        assert_eq!(PlaybackCommand::from_key_name(" "), Some(PlaybackCommand::TogglePause));
        assert_eq!(PlaybackCommand::from_key_name("M"), Some(PlaybackCommand::NextKeyframe));
        for name in ["Meta", "NumLock", "Numpad1", "Enter", "rr", ""] {
            assert_eq!(PlaybackCommand::from_key_name(name), None, "{:?} should be unbound", name);
        }

        let mut scene = body_scene();
        scene.frame(1.2);
        assert!(!scene.handle_key_name("Meta", true));
        assert!(!scene.handle_key_name("NumLock", true));
        assert!((scene.animation().current_time() - 1.2).abs() < 1e-6);
        assert!(scene.handle_key_name("m", true));
        assert_eq!(scene.animation().current_time(), 2.0);
    }

    #[test]
    fn test_frame_moves_root_and_joints() {
        let mut scene = body_scene();
        // Keyframe 6 of the throw is the top of the jump
        scene.animation_mut().seek(3.2);
        scene.frame(0.0);

        assert_eq!(scene.skeleton().position(), Vec3::new(0.0, 2.0, 0.0));
        let pelvis = scene.skeleton().find_joint("pelvis").unwrap();
        let origin = scene.skeleton().joint(pelvis).unwrap().world_matrix().w_axis.truncate();
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5), "got {:?}", origin);

        let elbow = scene.skeleton().find_joint("elbow_r").unwrap();
        let expected = scene.animation().pose_at("elbow_r");
        assert_eq!(scene.skeleton().joint(elbow).unwrap().angles(), expected);
    }

    #[test]
    fn test_full_loop_stays_finite() {
        let mut scene = body_scene();
        let mut buffer = UniformBuffer::new();
        let frame = FrameContext::new(0, Mat4::IDENTITY, Mat4::IDENTITY);

        for _ in 0..400 {
            scene.frame(1.0 / 60.0);
            buffer.clear();
            scene.render(&frame, &mut buffer);
            assert_eq!(buffer.len(), 2 * ANIMATED_JOINTS.len());
            assert!(buffer.as_floats().iter().all(|v| v.is_finite()));
        }
        assert!(scene.animation().current_time() < scene.animation().duration());
        assert!(buffer.get("wrist_r", PartKind::Bone).is_some());
    }

    struct Counter(Rc<Cell<usize>>);

    impl LimitObserver for Counter {
        fn on_limit_hit(&mut self, _hit: &LimitHit<'_>) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_builtin_clip_stays_inside_limits() {
        let mut scene = body_scene();
        let hits = Rc::new(Cell::new(0));
        scene.skeleton_mut().set_limit_observer(Counter(hits.clone()));

        for _ in 0..(6 * 30) {
            scene.frame(1.0 / 30.0);
        }
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_commands() {
        let mut scene = body_scene();
        scene.frame(1.2);

        assert!(scene.handle_key(' ', true));
        assert!(scene.animation().is_paused());
        scene.frame(1.0);
        assert!((scene.animation().current_time() - 1.2).abs() < 1e-6);

        assert!(scene.handle_key('m', true));
        assert_eq!(scene.animation().current_time(), 2.0);
        assert!(scene.handle_key('n', true));
        assert_eq!(scene.animation().current_time(), 1.0);

        // Releases are bound but inert
        assert!(scene.handle_key('r', false));
        assert_eq!(scene.animation().current_time(), 1.0);
        assert!(scene.handle_key('r', true));
        assert_eq!(scene.animation().current_time(), 0.0);
        assert!(!scene.animation().is_paused());

        assert!(!scene.handle_key('x', true));
    }

    #[test]
    fn test_config_overrides_and_missing_skeleton() {
        let config = SceneConfig {
            skeleton: "nobody".to_string(),
            looping: Some(false),
            duration: Some(2.0),
            ..SceneConfig::default()
        };
        let mut scene = Scene::from_config(&config, &JsonSkeletonSource::new()).unwrap();
        assert!(scene.skeleton().is_empty());
        assert!(!scene.animation().is_looping());

        scene.frame(5.0);
        assert_eq!(scene.animation().current_time(), 2.0);
        assert!(scene.animation().is_paused());
    }

    #[test]
    fn test_unknown_clip_is_error() {
        let config = SceneConfig {
            clip: "dunk".to_string(),
            ..SceneConfig::default()
        };
        assert!(Scene::from_config(&config, &BuiltinSkeletons).is_err());
    }

    #[test]
    fn test_initialize_and_destroy() {
        let mut scene = body_scene();
        let mut visited = 0;
        scene.initialize(|_, _| visited += 1);
        assert_eq!(visited, ANIMATED_JOINTS.len());

        let mut released = Vec::new();
        scene.destroy(|_, joint| released.push(joint.name().to_string()));
        assert_eq!(released.last().map(String::as_str), Some("pelvis"));
        assert!(scene.skeleton().is_empty());
    }
}
