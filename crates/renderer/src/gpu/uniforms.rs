use bytemuck::{Pod, Zeroable};

use crate::color::FrameColor;

/// Host side of the `FrameParams` block declared by the shader prelude.
///
/// Layout must match the std140 block in `compile.rs`: two `vec4`s.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    /// Normalised draw color; the prelude exposes it as `gl_Color`.
    pub color: [f32; 4],
    /// Surface width and height in pixels; zw unused.
    pub surface: [f32; 4],
}

impl FrameUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            color: FrameColor::default().normalized(),
            surface: [width as f32, height as f32, 0.0, 0.0],
        }
    }

    pub fn set_color(&mut self, color: FrameColor) {
        self.color = color.normalized();
    }

    pub fn set_surface(&mut self, width: u32, height: u32) {
        self.surface[0] = width as f32;
        self.surface[1] = height as f32;
    }
}
