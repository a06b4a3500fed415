//! Boundary to the rendering layer.
//!
//! The skeleton hands one model matrix per renderable part to a
//! [`TransformSink`]; [`UniformBuffer`] is a sink that packs them into the
//! per-draw uniform layout the shaders read.

use glam::Mat4;
use static_assertions::assert_eq_size;

use crate::joint::Joint;

/// Renderable body part attached to each joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// Sphere at the joint origin
    Joint,
    /// Cylinder centred halfway along the bone
    Bone,
}

/// Per-frame camera data supplied by the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Swapchain image the uniforms are written for
    pub image_index: u32,
    pub view: Mat4,
    pub projection: Mat4,
}

impl FrameContext {
    pub fn new(image_index: u32, view: Mat4, projection: Mat4) -> Self {
        Self {
            image_index,
            view,
            projection,
        }
    }
}

/// Capability to submit a transform for one renderable part.
pub trait TransformSink {
    fn submit(&mut self, joint: &Joint, part: PartKind, model: &Mat4, frame: &FrameContext);
}

impl<F> TransformSink for F
where
    F: FnMut(&Joint, PartKind, &Mat4, &FrameContext),
{
    fn submit(&mut self, joint: &Joint, part: PartKind, model: &Mat4, frame: &FrameContext) {
        self(joint, part, model, frame)
    }
}

/// GPU uniform block for one draw: column-major matrices.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PartUniform {
    /// projection * view * model
    pub mvp: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// view * model
    pub model_view: [[f32; 4]; 4],
}

assert_eq_size!(PartUniform, [u8; 192]);

impl PartUniform {
    pub fn new(model: &Mat4, frame: &FrameContext) -> Self {
        let model_view = frame.view * *model;
        Self {
            mvp: (frame.projection * model_view).to_cols_array_2d(),
            view: frame.view.to_cols_array_2d(),
            model_view: model_view.to_cols_array_2d(),
        }
    }
}

/// Collects one [`PartUniform`] per submitted part, in submission order.
#[derive(Debug, Default, Clone)]
pub struct UniformBuffer {
    entries: Vec<(String, PartKind)>,
    uniforms: Vec<PartUniform>,
    image_index: Option<u32>,
}

impl UniformBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous frame's contents, keeping the allocation
    pub fn clear(&mut self) {
        self.entries.clear();
        self.uniforms.clear();
        self.image_index = None;
    }

    pub fn len(&self) -> usize {
        self.uniforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uniforms.is_empty()
    }

    /// Image index of the last submission
    pub fn image_index(&self) -> Option<u32> {
        self.image_index
    }

    pub fn uniforms(&self) -> &[PartUniform] {
        &self.uniforms
    }

    pub fn get(&self, joint: &str, part: PartKind) -> Option<&PartUniform> {
        self.entries
            .iter()
            .position(|(name, kind)| name == joint && *kind == part)
            .map(|i| &self.uniforms[i])
    }

    /// Raw bytes ready for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uniforms)
    }

    /// Flattened floats, 48 per part
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.uniforms)
    }
}

impl TransformSink for UniformBuffer {
    fn submit(&mut self, joint: &Joint, part: PartKind, model: &Mat4, frame: &FrameContext) {
        self.entries.push((joint.name().to_string(), part));
        self.uniforms.push(PartUniform::new(model, frame));
        self.image_index = Some(frame.image_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_part_uniform_products() {
        let model = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let projection = Mat4::perspective_rh(1.0, 1.5, 0.1, 100.0);
        let frame = FrameContext::new(2, view, projection);

        let uniform = PartUniform::new(&model, &frame);
        let mvp = Mat4::from_cols_array_2d(&uniform.mvp);
        assert!(mvp.abs_diff_eq(projection * view * model, 1e-5));
        assert_eq!(Mat4::from_cols_array_2d(&uniform.view), view);
        assert_eq!(Mat4::from_cols_array_2d(&uniform.model_view), view * model);
    }

    #[test]
    fn test_uniform_buffer_collects_in_order() {
        let frame = FrameContext::new(1, Mat4::IDENTITY, Mat4::IDENTITY);
        let joint = Joint::with_length(0.5);
        let model = Mat4::from_translation(Vec3::Y);

        let mut buffer = UniformBuffer::new();
        buffer.submit(&joint, PartKind::Joint, &Mat4::IDENTITY, &frame);
        buffer.submit(&joint, PartKind::Bone, &model, &frame);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.image_index(), Some(1));
        assert_eq!(buffer.as_bytes().len(), 2 * 192);
        assert_eq!(buffer.as_floats().len(), 2 * 48);
        assert_eq!(buffer.get("", PartKind::Bone).unwrap().model_view, model.to_cols_array_2d());

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.get("", PartKind::Joint), None);
    }
}
