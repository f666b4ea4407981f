use crate::config::TextureConfig;
use crate::context::GpuContext;
use crate::error::{GpuError, Result};

/// GPU texture holding the image being annotated.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from RGBA8 bytes with default configuration.
    pub fn from_rgba8(ctx: &GpuContext, data: &[u8], width: u32, height: u32) -> Result<Self> {
        Self::from_rgba8_with_config(ctx, data, width, height, TextureConfig::default())
    }

    /// Create a texture from RGBA8 bytes with custom configuration.
    pub fn from_rgba8_with_config(
        ctx: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        config: TextureConfig,
    ) -> Result<Self> {
        check_len(data, width, height)?;
        check_dimensions(width, height, ctx.device.limits().max_texture_dimension_2d)?;

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Image Texture"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Image Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: config.mag_filter,
            min_filter: config.min_filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture = Self {
            texture,
            view,
            sampler,
            width,
            height,
        };
        texture.write(ctx, data)?;
        Ok(texture)
    }

    /// Re-upload pixel data of the same dimensions (e.g. after markers were drawn).
    pub fn write(&self, ctx: &GpuContext, data: &[u8]) -> Result<()> {
        check_len(data, self.width, self.height)?;
        ctx.queue.write_texture(
            self.texture.as_image_copy(),
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            extent(self.width, self.height),
        );
        Ok(())
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// Reject sizes the device cannot allocate; wgpu would panic on them.
fn check_dimensions(width: u32, height: u32, max_dimension: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(GpuError::Texture(format!(
            "Image {}x{} has no pixels",
            width, height
        )));
    }
    if width > max_dimension || height > max_dimension {
        return Err(GpuError::Texture(format!(
            "Image {}x{} exceeds the GPU texture limit of {} pixels per side",
            width, height, max_dimension
        )));
    }
    Ok(())
}

fn check_len(data: &[u8], width: u32, height: u32) -> Result<()> {
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(GpuError::Texture(format!(
            "Invalid data size: expected {} bytes for {}x{} RGBA8, got {}",
            expected,
            width,
            height,
            data.len()
        )));
    }
    Ok(())
}
