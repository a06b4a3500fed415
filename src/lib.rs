//! Ball-joint rig - keyframe animation over a hierarchy of ball joints.
//!
//! Each frame an [`Animation`] advances its cursor and writes interpolated
//! poses and a root position into a [`Skeleton`], which then propagates
//! world matrices from its roots down to every joint. The rendering layer
//! receives one transform per body part through a [`TransformSink`].

pub mod animation;
pub mod config;
pub mod error;
pub mod joint;
pub mod logging;
pub mod math;
pub mod names;
pub mod render;
pub mod scene;
pub mod skeleton;

#[cfg(target_arch = "wasm32")]
mod bindings;

#[cfg(target_arch = "wasm32")]
pub use bindings::*;

pub use animation::{Animation, AnimationClip, Keyframe, PlaybackState};
pub use config::SceneConfig;
pub use error::{Result, RigError};
pub use joint::{Joint, JointId, JointLimits, LimitHit, LimitObserver, LogLimitObserver};
pub use math::{JointMatrix, Mat4, Vec3};
pub use render::{FrameContext, PartKind, PartUniform, TransformSink, UniformBuffer};
pub use scene::{PlaybackCommand, Scene};
pub use skeleton::{BuiltinSkeletons, JsonSkeletonSource, Skeleton, SkeletonDescription, SkeletonSource};
