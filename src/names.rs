//! Joint names driven by keyframe animation.
//!
//! This module is included by both the build script and the runtime code so
//! clip validation and playback agree on the same name set.

/// Every joint an animation may pose, in application order.
pub const ANIMATED_JOINTS: [&str; 19] = [
    // Column
    "pelvis",
    "spine",
    "neck",
    // Left arm
    "clavicle_l",
    "shoulder_l",
    "elbow_l",
    "wrist_l",
    // Right arm
    "clavicle_r",
    "shoulder_r",
    "elbow_r",
    "wrist_r",
    // Left leg
    "hip_l",
    "leg_l",
    "knee_l",
    "ankle_l",
    // Right leg
    "hip_r",
    "leg_r",
    "knee_r",
    "ankle_r",
];

/// Whether `name` is one of the animated joints.
pub fn is_animated(name: &str) -> bool {
    ANIMATED_JOINTS.contains(&name)
}
