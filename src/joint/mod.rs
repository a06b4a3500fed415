//! Ball joints: three-degree-of-freedom rotational nodes of a skeleton.
//!
//! A joint owns its rest orientation relative to its parent, its current
//! Euler pose (degrees around local X, Y, Z), optional per-axis limits and the
//! world matrix cached from the last update. Tree links are arena handles;
//! the owning [`Skeleton`](crate::skeleton::Skeleton) drives traversal.

pub mod id;
pub mod limits;

pub use id::*;
pub use limits::*;

use crate::math::{JointMatrix, Mat4, Vec3};

#[derive(Debug, Clone)]
pub struct Joint {
    name: String,
    /// Bone length along local Z; children attach at the bone end
    length: f32,
    /// Translation from the parent's attachment frame, in the parent's frame
    offset: Vec3,
    local_z: Vec3,
    local_y: Vec3,

    // Absolute placement, only used when the joint is computed on its own
    location: Vec3,
    dir: Vec3,
    up: Vec3,
    right: Vec3,

    angles: Vec3,
    limits: Option<JointLimits>,
    was_limited: bool,

    pub(crate) parent: Option<JointId>,
    pub(crate) children: Vec<JointId>,

    world_matrix: Mat4,
}

impl Joint {
    /// Create a joint from its rest description.
    ///
    /// The local X axis is derived as `y_axis × z_axis`.
    pub fn new(name: impl Into<String>, length: f32, offset: Vec3, z_axis: Vec3, y_axis: Vec3) -> Self {
        Self {
            name: name.into(),
            length,
            offset,
            local_z: z_axis,
            local_y: y_axis,
            location: Vec3::ZERO,
            dir: z_axis,
            up: y_axis,
            right: y_axis.cross(z_axis),
            angles: Vec3::ZERO,
            limits: None,
            was_limited: false,
            parent: None,
            children: Vec::new(),
            world_matrix: Mat4::IDENTITY,
        }
    }

    /// Unnamed joint with the identity rest orientation
    pub fn with_length(length: f32) -> Self {
        Self::new("", length, Vec3::ZERO, Vec3::Z, Vec3::Y)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Rest axes relative to the parent as `(x, y, z)`
    pub fn local_axes(&self) -> (Vec3, Vec3, Vec3) {
        (self.local_y.cross(self.local_z), self.local_y, self.local_z)
    }

    /// Current pose in degrees around local X, Y, Z
    pub fn angles(&self) -> Vec3 {
        self.angles
    }

    pub fn limits(&self) -> Option<&JointLimits> {
        self.limits.as_ref()
    }

    pub fn parent(&self) -> Option<JointId> {
        self.parent
    }

    pub fn children(&self) -> &[JointId] {
        &self.children
    }

    /// World matrix from the last update
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// Assign the pose, clamped component-wise when limits are enabled.
    ///
    /// Returns the hit only on the transition into a limited state, so a
    /// joint held against its limit is reported once.
    pub fn set_pose(&mut self, requested: Vec3) -> Option<LimitHit<'_>> {
        let Some(limits) = self.limits else {
            self.angles = requested;
            return None;
        };

        self.angles = limits.clamp(requested);

        let is_limited = JointLimits::is_limited(requested, self.angles);
        let entered = is_limited && !self.was_limited;
        self.was_limited = is_limited;

        if !entered {
            return None;
        }
        Some(LimitHit {
            joint: &self.name,
            requested,
            applied: self.angles,
        })
    }

    /// Set rotation bounds and enable clamping from now on.
    pub fn set_limits(&mut self, min: Vec3, max: Vec3) {
        self.limits = Some(JointLimits::new(min, max));
    }

    pub fn set_location(&mut self, location: Vec3) {
        self.location = location;
        self.compute_local_matrix();
    }

    /// Set the absolute orientation; right is derived as `up × dir`.
    pub fn set_orientation(&mut self, dir: Vec3, up: Vec3) {
        self.dir = dir;
        self.up = up;
        self.right = up.cross(dir);
        self.compute_local_matrix();
    }

    /// Rotation built from the current angles
    pub fn pose_matrix(&self) -> Mat4 {
        Mat4::from_euler_degrees(self.angles)
    }

    /// Absolute placement: `right, up, dir` columns and `location` origin
    pub fn basis_matrix(&self) -> Mat4 {
        Mat4::from_axes(self.right, self.up, self.dir, self.location)
    }

    /// Rest pose relative to the parent's attachment frame, translated by `offset`
    pub fn local_orientation_matrix(&self) -> Mat4 {
        let (x_axis, y_axis, z_axis) = self.local_axes();
        Mat4::from_axes(x_axis, y_axis, z_axis, self.offset)
    }

    /// Compute the world matrix without a parent: `basis * pose`.
    pub fn compute_local_matrix(&mut self) {
        self.world_matrix = self.basis_matrix() * self.pose_matrix();
    }

    /// Compute the world matrix under `parent`: `parent * orientation * pose`.
    pub fn compute_matrix(&mut self, parent: &Mat4) {
        self.world_matrix = *parent * self.local_orientation_matrix() * self.pose_matrix();
    }

    /// World matrix moved along local Z by the bone length; children attach here.
    pub fn bone_end_matrix(&self) -> Mat4 {
        self.world_matrix.translated_local(Vec3::new(0.0, 0.0, self.length))
    }

    /// Pivot of the rendered bone, halfway along its length
    pub fn bone_matrix(&self) -> Mat4 {
        self.world_matrix.translated_local(Vec3::new(0.0, 0.0, self.length / 2.0))
    }
}
