//! Build script for asset validation
//!
//! Runs at compile time over the embedded clips and skeletons so a bad asset
//! fails the build instead of degrading silently at runtime.

// Include the shared joint names
#[path = "src/names.rs"]
mod names;

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Keyframe {
    time: f32,
    #[serde(default)]
    poses: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AnimationClip {
    name: String,
    duration: f32,
    keyframes: Vec<Keyframe>,
}

#[derive(Debug, Deserialize)]
struct Limits {
    #[serde(default = "default_min")]
    min: [f32; 3],
    #[serde(default = "default_max")]
    max: [f32; 3],
}

fn default_min() -> [f32; 3] {
    [-180.0; 3]
}

fn default_max() -> [f32; 3] {
    [180.0; 3]
}

#[derive(Debug, Deserialize)]
struct JointRecord {
    name: String,
    #[serde(default)]
    length: f32,
    #[serde(default)]
    limits: Option<Limits>,
    #[serde(default)]
    children: Vec<JointRecord>,
}

#[derive(Debug, Deserialize)]
struct SkeletonRecord {
    name: String,
    #[serde(default)]
    root_joints: Vec<JointRecord>,
}

/// Validate a clip: known joint names, times inside the clip
fn validate_clip_file(path: &Path) -> Result<(), String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let clip: AnimationClip = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    let mut errors = Vec::new();

    if !(clip.duration > 0.0) {
        errors.push(format!("  duration must be positive, got {}", clip.duration));
    }

    for (i, keyframe) in clip.keyframes.iter().enumerate() {
        if !(0.0..=clip.duration).contains(&keyframe.time) {
            errors.push(format!(
                "  keyframe {}: time {:.2}s outside [0, {:.2}]",
                i, keyframe.time, clip.duration
            ));
        }
        for name in keyframe.poses.keys() {
            if !names::is_animated(name) {
                errors.push(format!("  keyframe {}: unknown joint '{}'", i, name));
            }
        }
    }

    if errors.is_empty() {
        println!(
            "cargo:warning=✓ {} validated ({} keyframes)",
            clip.name,
            clip.keyframes.len()
        );
        Ok(())
    } else {
        Err(format!("Clip '{}' is invalid:\n{}", clip.name, errors.join("\n")))
    }
}

fn check_joint(joint: &JointRecord, seen: &mut HashSet<String>, errors: &mut Vec<String>) {
    if joint.length < 0.0 {
        errors.push(format!("  {}: negative length {}", joint.name, joint.length));
    }
    if let Some(limits) = &joint.limits {
        for axis in 0..3 {
            if limits.min[axis] > limits.max[axis] {
                errors.push(format!(
                    "  {}: limit min {} above max {} on axis {}",
                    joint.name, limits.min[axis], limits.max[axis], axis
                ));
            }
        }
    }
    if !seen.insert(joint.name.clone()) {
        // Lookup still works (first match), but the later joint is unreachable by name
        println!("cargo:warning=duplicate joint name '{}'", joint.name);
    }
    for child in &joint.children {
        check_joint(child, seen, errors);
    }
}

/// Validate a skeleton: non-negative lengths, ordered limits
fn validate_skeleton_file(path: &Path) -> Result<(), String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let skeleton: SkeletonRecord = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    for root in &skeleton.root_joints {
        check_joint(root, &mut seen, &mut errors);
    }

    if errors.is_empty() {
        println!(
            "cargo:warning=✓ skeleton {} validated ({} joints)",
            skeleton.name,
            seen.len()
        );
        Ok(())
    } else {
        Err(format!("Skeleton '{}' is invalid:\n{}", skeleton.name, errors.join("\n")))
    }
}

fn validate_dir(dir: &Path, validate: fn(&Path) -> Result<(), String>) -> bool {
    if !dir.exists() {
        println!("cargo:warning={} not found, skipping validation", dir.display());
        return true;
    }

    let mut ok = true;
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                println!("cargo:rerun-if-changed={}", path.display());

                if let Err(e) = validate(&path) {
                    println!("cargo:warning=VALIDATION ERROR: {}", e);
                    ok = false;
                }
            }
        }
    }

    println!("cargo:rerun-if-changed={}", dir.display());
    ok
}

fn main() {
    // Rerun if the shared names change
    println!("cargo:rerun-if-changed=src/names.rs");

    let clips_ok = validate_dir(Path::new("assets/clips"), validate_clip_file);
    let skeletons_ok = validate_dir(Path::new("assets/skeletons"), validate_skeleton_file);

    if !(clips_ok && skeletons_ok) {
        panic!("Asset validation failed! Fix the files listed above.");
    }
}
