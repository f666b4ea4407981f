//! GPU presentation for pointmark: puts one RGBA image on a winit window
//! under a pan/zoom view.

pub mod bindings;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod texture;
pub mod uniform;
pub mod vertex;

pub use config::{GpuConfig, TextureConfig};
pub use context::GpuContext;
pub use error::{GpuError, Result};
pub use pipeline::ImagePipeline;
pub use texture::Texture;
pub use uniform::ViewUniform;
pub use vertex::Vertex;
