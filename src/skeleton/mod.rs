//! Skeleton: a forest of ball joints stored in an arena.
//!
//! Joints are addressed by [`JointId`]; each stores its parent handle and its
//! ordered child handles. Every traversal is depth-first pre-order except
//! [`Skeleton::destroy`], which releases children before their parent.

pub mod description;

pub use description::*;

use crate::error::Result;
use crate::joint::{Joint, JointId, LimitObserver};
use crate::math::{Mat4, Vec3};
use crate::render::{FrameContext, PartKind, TransformSink};

pub const DEFAULT_SKELETON_NAME: &str = "body";

pub struct Skeleton {
    name: String,
    /// World offset; overwritten every frame by the animation's root position
    position: Vec3,
    // Stored but not applied to the base transform
    z_axis: Vec3,
    y_axis: Vec3,

    joints: Vec<Joint>,
    roots: Vec<JointId>,

    limit_observer: Option<Box<dyn LimitObserver>>,
}

impl std::fmt::Debug for Skeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Skeleton")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("joints", &self.joints.len())
            .field("roots", &self.roots)
            .field("limit_observer", &self.limit_observer.is_some())
            .finish()
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new(DEFAULT_SKELETON_NAME)
    }
}

impl Skeleton {
    /// Empty skeleton at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            z_axis: Vec3::Z,
            y_axis: Vec3::Y,
            joints: Vec::new(),
            roots: Vec::new(),
            limit_observer: None,
        }
    }

    /// Instantiate every joint of `desc` once, preserving child order.
    pub fn from_description(desc: &SkeletonDescription) -> Self {
        let mut skeleton = Self::new(desc.name.clone());
        skeleton.position = desc.offset;
        skeleton.z_axis = desc.z_axis;
        skeleton.y_axis = desc.y_axis;

        for root in &desc.root_joints {
            skeleton.build_subtree(None, root);
        }
        skeleton
    }

    fn build_subtree(&mut self, parent: Option<JointId>, desc: &JointDescription) -> Option<JointId> {
        let mut joint = Joint::new(desc.name.clone(), desc.length, desc.offset, desc.z_axis, desc.y_axis);
        if let Some(limits) = desc.limits {
            joint.set_limits(limits.min, limits.max);
        }

        let id = match parent {
            Some(parent) => self.add_child(parent, joint)?,
            None => self.add_root(joint),
        };
        for child in &desc.children {
            self.build_subtree(Some(id), child);
        }
        Some(id)
    }

    /// Resolve `name` and build from it.
    pub fn try_load(source: &dyn SkeletonSource, name: &str) -> Result<Self> {
        let desc = source.resolve(name)?;
        let skeleton = Self::from_description(&desc);
        log::info!(
            "Loaded skeleton '{}' with {} root joints ({} joints)",
            skeleton.name,
            skeleton.roots.len(),
            skeleton.joints.len()
        );
        Ok(skeleton)
    }

    /// Like [`Skeleton::try_load`], but a failed load leaves an empty skeleton.
    ///
    /// Every traversal and lookup on the empty skeleton is a no-op.
    pub fn load(source: &dyn SkeletonSource, name: &str) -> Self {
        Self::try_load(source, name).unwrap_or_else(|err| {
            log::warn!("Could not load skeleton '{}': {}", name, err);
            Self::new(name)
        })
    }

    pub fn add_root(&mut self, joint: Joint) -> JointId {
        let id = self.push(joint, None);
        self.roots.push(id);
        id
    }

    /// Append `joint` to the children of `parent`.
    ///
    /// Returns `None`, leaving the skeleton untouched, when `parent` is not a
    /// joint of this skeleton.
    pub fn add_child(&mut self, parent: JointId, joint: Joint) -> Option<JointId> {
        let id = JointId::new(self.joints.len());
        self.joints.get_mut(parent.index())?.children.push(id);
        Some(self.push(joint, Some(parent)))
    }

    fn push(&mut self, mut joint: Joint, parent: Option<JointId>) -> JointId {
        let id = JointId::new(self.joints.len());
        joint.parent = parent;
        joint.children.clear();
        self.joints.push(joint);
        id
    }

    /// Report limit hits of [`Skeleton::set_joint_pose`] to `observer`.
    pub fn set_limit_observer(&mut self, observer: impl LimitObserver + 'static) {
        self.limit_observer = Some(Box::new(observer));
    }

    pub fn clear_limit_observer(&mut self) {
        self.limit_observer = None;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Global orientation hint as `(z_axis, y_axis)`
    pub fn orientation(&self) -> (Vec3, Vec3) {
        (self.z_axis, self.y_axis)
    }

    pub fn set_orientation(&mut self, z_axis: Vec3, y_axis: Vec3) {
        self.z_axis = z_axis;
        self.y_axis = y_axis;
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// First root joint, if any
    pub fn root(&self) -> Option<JointId> {
        self.roots.first().copied()
    }

    pub fn root_joints(&self) -> &[JointId] {
        &self.roots
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.index())
    }

    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(id.index())
    }

    pub fn parent(&self, id: JointId) -> Option<JointId> {
        self.joint(id).and_then(Joint::parent)
    }

    pub fn children(&self, id: JointId) -> &[JointId] {
        self.joint(id).map(Joint::children).unwrap_or(&[])
    }

    /// Every joint, roots in order, each subtree pre-order
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst::new(self, self.roots.iter().rev().copied().collect())
    }

    /// The subtree rooted at `id`, `id` included
    pub fn depth_first_from(&self, id: JointId) -> DepthFirst<'_> {
        let stack = if id.index() < self.joints.len() { vec![id] } else { Vec::new() };
        DepthFirst::new(self, stack)
    }

    /// First joint named `name` in depth-first order across the roots.
    pub fn find_joint(&self, name: &str) -> Option<JointId> {
        self.depth_first().find(|&id| self.joints[id.index()].name() == name)
    }

    /// First joint named `name` in the subtree of `id`, `id` included.
    pub fn find_child(&self, id: JointId, name: &str) -> Option<JointId> {
        self.depth_first_from(id)
            .find(|&id| self.joints[id.index()].name() == name)
    }

    /// Assign a pose through the joint's limits, reporting a fresh limit hit
    /// to the observer. Unknown handles are ignored.
    pub fn set_joint_pose(&mut self, id: JointId, angles: Vec3) {
        let Some(joint) = self.joints.get_mut(id.index()) else {
            return;
        };
        if let Some(hit) = joint.set_pose(angles) {
            if let Some(observer) = self.limit_observer.as_mut() {
                observer.on_limit_hit(&hit);
            }
        }
    }

    /// Compute root-case matrices pre-order and hand each joint to `visit`,
    /// where the rendering layer allocates per-part resources.
    pub fn initialize(&mut self, mut visit: impl FnMut(JointId, &Joint)) {
        let order: Vec<JointId> = self.depth_first().collect();
        for id in order {
            let joint = &mut self.joints[id.index()];
            joint.compute_local_matrix();
            visit(id, joint);
        }
    }

    /// Recompute every world matrix from the translation-only base transform.
    pub fn update(&mut self) {
        let base = Mat4::from_translation(self.position);
        for i in 0..self.roots.len() {
            let root = self.roots[i];
            self.update_subtree(root, &base);
        }
    }

    /// Recompute the subtree of `id` under `parent`: each joint before its
    /// children, which receive its bone-end matrix.
    pub fn update_subtree(&mut self, id: JointId, parent: &Mat4) {
        if id.index() >= self.joints.len() {
            return;
        }

        let mut stack = vec![(id, *parent)];
        while let Some((id, parent)) = stack.pop() {
            let joint = &mut self.joints[id.index()];
            joint.compute_matrix(&parent);

            let bone_end = joint.bone_end_matrix();
            stack.extend(joint.children.iter().rev().map(|&child| (child, bone_end)));
        }
    }

    /// Submit a joint sphere and a bone cylinder per joint, pre-order.
    pub fn submit<S: TransformSink + ?Sized>(&self, frame: &FrameContext, sink: &mut S) {
        for id in self.depth_first() {
            let joint = &self.joints[id.index()];
            sink.submit(joint, PartKind::Joint, &joint.world_matrix(), frame);
            sink.submit(joint, PartKind::Bone, &joint.bone_matrix(), frame);
        }
    }

    /// Release every joint post-order (children before parents, roots in
    /// order), then drop the tree. Previously issued handles become invalid.
    pub fn destroy(&mut self, mut release: impl FnMut(JointId, &Joint)) {
        let mut stack: Vec<JointId> = self.roots.clone();
        let mut mirrored = Vec::with_capacity(self.joints.len());
        while let Some(id) = stack.pop() {
            mirrored.push(id);
            stack.extend_from_slice(&self.joints[id.index()].children);
        }

        for &id in mirrored.iter().rev() {
            release(id, &self.joints[id.index()]);
        }

        self.joints.clear();
        self.roots.clear();
    }
}

/// Pre-order iterator over joint handles.
pub struct DepthFirst<'a> {
    skeleton: &'a Skeleton,
    stack: Vec<JointId>,
}

impl<'a> DepthFirst<'a> {
    fn new(skeleton: &'a Skeleton, stack: Vec<JointId>) -> Self {
        Self { skeleton, stack }
    }
}

impl Iterator for DepthFirst<'_> {
    type Item = JointId;

    fn next(&mut self) -> Option<JointId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.skeleton.joints[id.index()].children.iter().rev().copied());
        Some(id)
    }
}
