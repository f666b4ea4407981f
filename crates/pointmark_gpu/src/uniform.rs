//! Uniform types shared with `shaders/image.wgsl`.

use bytemuck::{Pod, Zeroable};

/// Pan/zoom view state in screen pixels.
///
/// The shader maps an image-space point `p` to `p * zoom + pan` and then to
/// clip space using `viewport`, so the layout must match the WGSL `View`
/// struct field for field.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ViewUniform {
    pub pan: [f32; 2],
    pub viewport: [f32; 2],
    pub image_size: [f32; 2],
    pub zoom: f32,
    pub _padding: f32,
}

impl ViewUniform {
    pub fn new(
        pan: (f32, f32),
        zoom: f32,
        viewport: (f32, f32),
        image_size: (f32, f32),
    ) -> Self {
        Self {
            pan: [pan.0, pan.1],
            viewport: [viewport.0.max(1.0), viewport.1.max(1.0)],
            image_size: [image_size.0, image_size.1],
            zoom,
            _padding: 0.0,
        }
    }
}

impl Default for ViewUniform {
    fn default() -> Self {
        Self::new((0.0, 0.0), 1.0, (1.0, 1.0), (1.0, 1.0))
    }
}
