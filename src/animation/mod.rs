//! Keyframe playback and interpolation.
//!
//! An [`Animation`] owns a time-sorted list of keyframes and a playback
//! cursor. Poses and the root position are sampled by bracketing the cursor
//! between a previous and a next keyframe and interpolating linearly.

pub mod clip;

pub use clip::*;

use std::collections::BTreeMap;

use crate::math::Vec3;
use crate::names::ANIMATED_JOINTS;
use crate::skeleton::Skeleton;

/// Tolerance used by keyframe navigation so the current keyframe is not
/// selected again.
pub const KEYFRAME_EPSILON: f32 = 0.01;

/// A timestamped target pose for some joints plus a root position sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    /// Euler pose in degrees per joint name
    pub poses: BTreeMap<String, Vec3>,
    pub root_position: Vec3,
}

impl Keyframe {
    pub fn new(time: f32, root_position: Vec3) -> Self {
        Self {
            time,
            poses: BTreeMap::new(),
            root_position,
        }
    }

    pub fn with_pose(mut self, joint: impl Into<String>, angles: Vec3) -> Self {
        self.poses.insert(joint.into(), angles);
        self
    }

    /// Pose for `joint`; a missing entry contributes the zero pose.
    #[inline]
    pub fn pose(&self, joint: &str) -> Vec3 {
        self.poses.get(joint).copied().unwrap_or(Vec3::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    /// Non-looping playback reached the end; left only through `reset`
    Finished,
}

#[derive(Debug, Clone)]
pub struct Animation {
    keyframes: Vec<Keyframe>,
    duration: f32,
    current_time: f32,
    looping: bool,
    paused: bool,
}

impl Animation {
    /// Negative durations are treated as zero.
    pub fn new(duration: f32, looping: bool) -> Self {
        Self {
            keyframes: Vec::new(),
            duration: duration.max(0.0),
            current_time: 0.0,
            looping,
            paused: false,
        }
    }

    /// Insert a keyframe before the first one whose time is not less than `time`.
    pub fn add_keyframe(&mut self, time: f32, poses: BTreeMap<String, Vec3>, root_position: Vec3) {
        self.insert_keyframe(Keyframe {
            time,
            poses,
            root_position,
        });
    }

    pub fn insert_keyframe(&mut self, keyframe: Keyframe) {
        let index = self.keyframes.partition_point(|kf| kf.time < keyframe.time);
        self.keyframes.insert(index, keyframe);
    }

    /// Advance the cursor by `delta_time` seconds.
    ///
    /// Looping playback wraps into `[0, duration)` whatever the size of the
    /// step; otherwise the cursor stops at `duration` and playback pauses.
    pub fn update(&mut self, delta_time: f32) {
        if self.paused || self.keyframes.is_empty() {
            return;
        }

        self.current_time = (self.current_time + delta_time).max(0.0);

        if self.current_time >= self.duration {
            if self.looping {
                self.current_time = if self.duration > 0.0 {
                    self.current_time % self.duration
                } else {
                    0.0
                };
            } else {
                self.current_time = self.duration;
                self.paused = true;
            }
        }
    }

    pub fn reset(&mut self) {
        self.current_time = 0.0;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Move the cursor, clamped into `[0, duration]`
    pub fn seek(&mut self, time: f32) {
        self.current_time = time.clamp(0.0, self.duration);
    }

    /// Last keyframe at or before the cursor and first one at or after it.
    ///
    /// Both default to the first keyframe; past the last keyframe this yields
    /// `(last, first)`.
    fn bracket(&self) -> Option<(&Keyframe, &Keyframe)> {
        let first = self.keyframes.first()?;
        let (mut prev, mut next) = (first, first);

        for kf in &self.keyframes {
            if kf.time <= self.current_time {
                prev = kf;
            }
            if kf.time >= self.current_time {
                next = kf;
                break;
            }
        }
        Some((prev, next))
    }

    fn sample(&self, value: impl Fn(&Keyframe) -> Vec3) -> Vec3 {
        let Some((prev, next)) = self.bracket() else {
            return Vec3::ZERO;
        };

        if std::ptr::eq(prev, next) || prev.time == next.time {
            return value(prev);
        }

        let t = ((self.current_time - prev.time) / (next.time - prev.time)).clamp(0.0, 1.0);
        value(prev).lerp(value(next), t)
    }

    /// Interpolated pose of `joint` at the cursor
    pub fn pose_at(&self, joint: &str) -> Vec3 {
        self.sample(|kf| kf.pose(joint))
    }

    /// Interpolated root position at the cursor
    pub fn skeleton_position(&self) -> Vec3 {
        self.sample(|kf| kf.root_position)
    }

    /// Write the root position and every animated joint's pose into
    /// `skeleton`. Joints the skeleton lacks are skipped.
    pub fn apply_to_skeleton(&self, skeleton: &mut Skeleton) {
        skeleton.set_position(self.skeleton_position());

        for name in ANIMATED_JOINTS {
            if let Some(id) = skeleton.find_joint(name) {
                skeleton.set_joint_pose(id, self.pose_at(name));
            }
        }
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.current_time = self.current_time.min(self.duration);
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Index of the first keyframe at or after the cursor, else the last one.
    /// `None` when there are no keyframes.
    pub fn current_keyframe_index(&self) -> Option<usize> {
        self.keyframes
            .iter()
            .position(|kf| kf.time >= self.current_time)
            .or_else(|| self.keyframes.len().checked_sub(1))
    }

    /// Jump to the first keyframe after the cursor, wrapping to the first.
    pub fn next_keyframe(&mut self) {
        let target = self
            .keyframes
            .iter()
            .find(|kf| kf.time > self.current_time + KEYFRAME_EPSILON)
            .or_else(|| self.keyframes.first());

        if let Some(kf) = target {
            self.current_time = kf.time;
        }
    }

    /// Jump to the last keyframe before the cursor, wrapping to the last.
    pub fn prev_keyframe(&mut self) {
        let target = self
            .keyframes
            .iter()
            .rev()
            .find(|kf| kf.time < self.current_time - KEYFRAME_EPSILON)
            .or_else(|| self.keyframes.last());

        if let Some(kf) = target {
            self.current_time = kf.time;
        }
    }

    pub fn state(&self) -> PlaybackState {
        if !self.paused {
            PlaybackState::Playing
        } else if !self.looping && self.current_time >= self.duration {
            PlaybackState::Finished
        } else {
            PlaybackState::Paused
        }
    }
}
