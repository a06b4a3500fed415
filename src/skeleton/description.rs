//! Hierarchical joint/bone descriptions and their resolvers.
//!
//! A description is the static input a [`Skeleton`](super::Skeleton) is
//! built from. Missing fields fall back to the loader defaults: zero offset,
//! `z_axis = (0, 0, 1)`, `y_axis = (0, 1, 0)` and `±180` for any bound left
//! out of a `limits` block.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RigError};
use crate::joint::DEFAULT_LIMIT_DEGREES;
use crate::math::Vec3;

fn default_z_axis() -> Vec3 {
    Vec3::Z
}

fn default_y_axis() -> Vec3 {
    Vec3::Y
}

fn default_min() -> Vec3 {
    Vec3::splat(-DEFAULT_LIMIT_DEGREES)
}

fn default_max() -> Vec3 {
    Vec3::splat(DEFAULT_LIMIT_DEGREES)
}

/// Skeleton-level record: global placement plus the root joints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonDescription {
    pub name: String,
    #[serde(default)]
    pub offset: Vec3,
    #[serde(default = "default_z_axis")]
    pub z_axis: Vec3,
    #[serde(default = "default_y_axis")]
    pub y_axis: Vec3,
    #[serde(default)]
    pub root_joints: Vec<JointDescription>,
}

/// One joint and, recursively, its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDescription {
    pub name: String,
    #[serde(default)]
    pub length: f32,
    #[serde(default)]
    pub offset: Vec3,
    #[serde(default = "default_z_axis")]
    pub z_axis: Vec3,
    #[serde(default = "default_y_axis")]
    pub y_axis: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitsDescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JointDescription>,
}

/// Presence of this block enables clamping on the joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitsDescription {
    #[serde(default = "default_min")]
    pub min: Vec3,
    #[serde(default = "default_max")]
    pub max: Vec3,
}

impl Default for LimitsDescription {
    fn default() -> Self {
        Self {
            min: default_min(),
            max: default_max(),
        }
    }
}

impl JointDescription {
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            length,
            offset: Vec3::ZERO,
            z_axis: Vec3::Z,
            y_axis: Vec3::Y,
            limits: None,
            children: Vec::new(),
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_axes(mut self, z_axis: Vec3, y_axis: Vec3) -> Self {
        self.z_axis = z_axis;
        self.y_axis = y_axis;
        self
    }

    pub fn with_limits(mut self, min: Vec3, max: Vec3) -> Self {
        self.limits = Some(LimitsDescription { min, max });
        self
    }

    pub fn with_child(mut self, child: JointDescription) -> Self {
        self.children.push(child);
        self
    }

    /// Number of joints in this subtree, itself included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(JointDescription::count).sum::<usize>()
    }
}

impl SkeletonDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset: Vec3::ZERO,
            z_axis: Vec3::Z,
            y_axis: Vec3::Y,
            root_joints: Vec::new(),
        }
    }

    pub fn with_root(mut self, root: JointDescription) -> Self {
        self.root_joints.push(root);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of joints across every root
    pub fn joint_count(&self) -> usize {
        self.root_joints.iter().map(JointDescription::count).sum()
    }
}

/// Resolves a skeleton description by name.
pub trait SkeletonSource {
    fn resolve(&self, name: &str) -> Result<SkeletonDescription>;
}

/// Skeletons compiled into the crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinSkeletons;

impl BuiltinSkeletons {
    pub const BODY: &'static str = include_str!("../../assets/skeletons/body.json");

    pub fn names() -> &'static [&'static str] {
        &["body"]
    }
}

impl SkeletonSource for BuiltinSkeletons {
    fn resolve(&self, name: &str) -> Result<SkeletonDescription> {
        match name {
            "body" => SkeletonDescription::from_json(Self::BODY),
            _ => Err(RigError::SkeletonNotFound(name.to_string())),
        }
    }
}

/// JSON documents registered in memory, backed by an optional directory of
/// `<name>.json` files.
#[derive(Debug, Default, Clone)]
pub struct JsonSkeletonSource {
    documents: HashMap<String, String>,
    directory: Option<PathBuf>,
}

impl JsonSkeletonSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            documents: HashMap::new(),
            directory: Some(directory.into()),
        }
    }

    /// Register a document; it shadows a file of the same name.
    pub fn insert(&mut self, name: impl Into<String>, json: impl Into<String>) {
        self.documents.insert(name.into(), json.into());
    }
}

impl SkeletonSource for JsonSkeletonSource {
    fn resolve(&self, name: &str) -> Result<SkeletonDescription> {
        if let Some(json) = self.documents.get(name) {
            return SkeletonDescription::from_json(json);
        }

        let Some(directory) = &self.directory else {
            return Err(RigError::SkeletonNotFound(name.to_string()));
        };

        let path = directory.join(format!("{}.json", name));
        match fs::read_to_string(&path) {
            Ok(json) => SkeletonDescription::from_json(&json),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(RigError::SkeletonNotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_loader_defaults() {
        let json = r#"{
            "name": "arm",
            "root_joints": [
                { "name": "shoulder", "length": 0.3, "limits": { "max": [10.0, 20.0, 30.0] } }
            ]
        }"#;
        let desc = SkeletonDescription::from_json(json).unwrap();
        assert_eq!(desc.z_axis, Vec3::Z);
        assert_eq!(desc.y_axis, Vec3::Y);

        let shoulder = &desc.root_joints[0];
        assert_eq!(shoulder.offset, Vec3::ZERO);
        assert_eq!(shoulder.z_axis, Vec3::Z);
        assert_eq!(shoulder.y_axis, Vec3::Y);
        let limits = shoulder.limits.unwrap();
        assert_eq!(limits.min, Vec3::splat(-180.0));
        assert_eq!(limits.max, Vec3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_builtin_body_resolves() {
        let desc = BuiltinSkeletons.resolve("body").unwrap();
        assert_eq!(desc.name, "body");
        assert_eq!(desc.root_joints.len(), 1);
        assert_eq!(desc.joint_count(), crate::names::ANIMATED_JOINTS.len());
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let err = BuiltinSkeletons.resolve("dragon").unwrap_err();
        assert!(matches!(err, RigError::SkeletonNotFound(ref n) if n == "dragon"));

        let err = JsonSkeletonSource::new().resolve("body").unwrap_err();
        assert!(matches!(err, RigError::SkeletonNotFound(_)));
    }

    #[test]
    fn test_missing_file_in_directory_is_not_found() {
        let source = JsonSkeletonSource::with_directory(std::env::temp_dir().join("balljoint-rig-missing"));
        let err = source.resolve("body").unwrap_err();
        assert!(matches!(err, RigError::SkeletonNotFound(_)), "got {:?}", err);
    }

    #[test]
    fn test_registered_document_and_malformed_json() {
        let mut source = JsonSkeletonSource::new();
        source.insert("stick", r#"{ "name": "stick", "root_joints": [{ "name": "a" }] }"#);
        source.insert("broken", "{ not json");

        let stick = source.resolve("stick").unwrap();
        assert_eq!(stick.joint_count(), 1);

        let err = source.resolve("broken").unwrap_err();
        assert!(matches!(err, RigError::Json(_)));
    }

    #[test]
    fn test_description_json_round_trip() {
        let desc = SkeletonDescription::new("arm").with_root(
            JointDescription::new("shoulder", 0.3)
                .with_child(JointDescription::new("elbow", 0.25).with_limits(Vec3::splat(-90.0), Vec3::ZERO)),
        );
        let json = desc.to_json_string().unwrap();
        assert_eq!(SkeletonDescription::from_json(&json).unwrap(), desc);
    }
}
