//! Shader binding constants.
//!
//! These numbers must match the `@group`/`@binding` attributes in
//! `shaders/image.wgsl`.

/// Group 0: Uniforms
pub const UNIFORM_GROUP: u32 = 0;
/// Binding 0 in group 0: view uniform
pub const UNIFORM_VIEW_BINDING: u32 = 0;

/// Group 1: Texture resources
pub const TEXTURE_GROUP: u32 = 1;
/// Binding 0 in group 1: Texture 2D
pub const TEXTURE_BINDING: u32 = 0;
/// Binding 1 in group 1: Sampler
pub const SAMPLER_BINDING: u32 = 1;
