//! Linear algebra primitives using glam, plus the joint matrix kernels.

pub use glam::{Mat4, Vec3, Vec4};

/// Small epsilon value for floating-point comparisons
pub const EPSILON: f32 = 1e-6;

/// Extension trait with the matrix constructions used by the joint hierarchy.
pub trait JointMatrix {
    /// Pose matrix from Euler angles in degrees around X, Y, Z.
    ///
    /// Composition is `Rz(z) * Ry(y) * Rx(x)`: roll innermost, yaw outermost.
    fn from_euler_degrees(angles: Vec3) -> Mat4;

    /// Affine matrix whose first three columns are the given axes and whose
    /// fourth column is `origin`.
    fn from_axes(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3, origin: Vec3) -> Mat4;

    /// Post-multiply by a translation expressed in this matrix's local frame.
    fn translated_local(&self, offset: Vec3) -> Mat4;
}

impl JointMatrix for Mat4 {
    fn from_euler_degrees(angles: Vec3) -> Mat4 {
        let (sx, cx) = angles.x.to_radians().sin_cos();
        let (sy, cy) = angles.y.to_radians().sin_cos();
        let (sz, cz) = angles.z.to_radians().sin_cos();

        Mat4::from_cols(
            Vec4::new(cz * cy, sz * cy, -sy, 0.0),
            Vec4::new(-sz * cx + cz * sy * sx, cz * cx + sz * sy * sx, cy * sx, 0.0),
            Vec4::new(sz * sx + cz * sy * cx, -cz * sx + sz * sy * cx, cy * cx, 0.0),
            Vec4::W,
        )
    }

    fn from_axes(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3, origin: Vec3) -> Mat4 {
        Mat4::from_cols(
            x_axis.extend(0.0),
            y_axis.extend(0.0),
            z_axis.extend(0.0),
            origin.extend(1.0),
        )
    }

    #[inline]
    fn translated_local(&self, offset: Vec3) -> Mat4 {
        *self * Mat4::from_translation(offset)
    }
}
