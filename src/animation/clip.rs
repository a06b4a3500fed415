use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{Animation, Keyframe};
use crate::error::{Result, RigError};

// ============================================================================
// JSON clip format
// ============================================================================

/// Euler angles in degrees, as authored in clip files
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct EulerAngles {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl From<EulerAngles> for Vec3 {
    fn from(e: EulerAngles) -> Self {
        Vec3::new(e.x, e.y, e.z)
    }
}

impl From<Vec3> for EulerAngles {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

/// A single keyframe in JSON format
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct KeyframeJson {
    pub time: f32,

    /// Skeleton position at this instant; the origin when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_position: Option<[f32; 3]>,

    #[serde(default)]
    pub poses: BTreeMap<String, EulerAngles>,
}

/// JSON format for a keyframe clip
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnimationClip {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    pub duration: f32,
    #[serde(default = "default_looping")]
    pub looping: bool,
    pub keyframes: Vec<KeyframeJson>,
}

fn default_version() -> u32 {
    1
}

fn default_looping() -> bool {
    true
}

/// Clips compiled into the crate, by name
const BUILTIN_CLIPS: &[(&str, &str)] = &[(
    "basketball_throw",
    include_str!("../../assets/clips/basketball_throw.json"),
)];

impl AnimationClip {
    /// Parse and validate a clip.
    ///
    /// Keyframes may appear in any order; times must be finite and
    /// non-negative and the duration positive.
    pub fn from_json(json: &str) -> Result<Self> {
        let clip: AnimationClip = serde_json::from_str(json)?;
        clip.validate()?;
        Ok(clip)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(RigError::InvalidClip(format!(
                "'{}': duration must be positive, got {}",
                self.name, self.duration
            )));
        }

        for (i, kf) in self.keyframes.iter().enumerate() {
            if !kf.time.is_finite() || kf.time < 0.0 {
                return Err(RigError::InvalidClip(format!(
                    "'{}': keyframe {} has invalid time {}",
                    self.name, i, kf.time
                )));
            }
        }
        Ok(())
    }

    /// Look up a built-in clip.
    pub fn builtin(name: &str) -> Result<Self> {
        BUILTIN_CLIPS
            .iter()
            .find(|(clip_name, _)| *clip_name == name)
            .ok_or_else(|| RigError::ClipNotFound(name.to_string()))
            .and_then(|(_, json)| Self::from_json(json))
    }

    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN_CLIPS.iter().map(|(name, _)| *name)
    }

    /// Build a playable animation, sorting keyframes by time
    pub fn to_animation(&self) -> Animation {
        let mut animation = Animation::new(self.duration, self.looping);
        for kf in &self.keyframes {
            animation.insert_keyframe(Keyframe {
                time: kf.time,
                poses: kf
                    .poses
                    .iter()
                    .map(|(name, angles)| (name.clone(), Vec3::from(*angles)))
                    .collect(),
                root_position: kf.root_position.map(Vec3::from_array).unwrap_or(Vec3::ZERO),
            });
        }
        animation
    }

    /// Capture an animation's keyframes and settings
    pub fn from_animation(name: impl Into<String>, animation: &Animation) -> Self {
        let keyframes = animation
            .keyframes()
            .iter()
            .map(|kf| KeyframeJson {
                time: kf.time,
                root_position: Some(kf.root_position.to_array()),
                poses: kf
                    .poses
                    .iter()
                    .map(|(name, angles)| (name.clone(), EulerAngles::from(*angles)))
                    .collect(),
            })
            .collect();

        Self {
            version: default_version(),
            name: name.into(),
            duration: animation.duration(),
            looping: animation.is_looping(),
            keyframes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names;

    #[test]
    fn test_builtin_basketball_throw() {
        let clip = AnimationClip::builtin("basketball_throw").unwrap();
        assert_eq!(clip.duration, 6.0);
        assert!(clip.looping);
        assert_eq!(clip.keyframes.len(), 10);

        for kf in &clip.keyframes {
            for name in kf.poses.keys() {
                assert!(names::is_animated(name), "unexpected joint {} at {}", name, kf.time);
            }
        }

        let anim = clip.to_animation();
        assert_eq!(anim.keyframe_count(), 10);
        assert_eq!(anim.keyframes()[6].root_position, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_unknown_builtin() {
        let err = AnimationClip::builtin("dunk").unwrap_err();
        assert!(matches!(err, RigError::ClipNotFound(ref n) if n == "dunk"));
    }

    #[test]
    fn test_partial_euler_and_missing_root() {
        let json = r#"{
            "name": "nod",
            "duration": 2.0,
            "keyframes": [
                { "time": 1.0, "poses": { "neck": { "x": -30.0 } } },
                { "time": 0.0, "root_position": [0.0, 1.0, 0.0] }
            ]
        }"#;
        let clip = AnimationClip::from_json(json).unwrap();
        assert_eq!(clip.version, 1);
        assert!(clip.looping);

        let anim = clip.to_animation();
        assert_eq!(anim.keyframes()[0].time, 0.0);
        assert_eq!(anim.keyframes()[1].pose("neck"), Vec3::new(-30.0, 0.0, 0.0));
        assert_eq!(anim.keyframes()[1].root_position, Vec3::ZERO);
    }

    #[test]
    fn test_invalid_clips_rejected() {
        let zero = r#"{ "name": "z", "duration": 0.0, "keyframes": [] }"#;
        assert!(matches!(AnimationClip::from_json(zero), Err(RigError::InvalidClip(_))));

        let negative = r#"{ "name": "n", "duration": 1.0, "keyframes": [{ "time": -0.5 }] }"#;
        assert!(matches!(AnimationClip::from_json(negative), Err(RigError::InvalidClip(_))));

        assert!(matches!(AnimationClip::from_json("[]"), Err(RigError::Json(_))));
    }

    #[test]
    fn test_from_animation_preserves_playback_data() {
        let source = AnimationClip::builtin("basketball_throw").unwrap().to_animation();
        let clip = AnimationClip::from_animation("copy", &source);
        let json = clip.to_json_string().unwrap();
        let restored = AnimationClip::from_json(&json).unwrap().to_animation();

        assert_eq!(restored.keyframes(), source.keyframes());
        assert_eq!(restored.duration(), source.duration());
        assert_eq!(restored.is_looping(), source.is_looping());
    }
}
