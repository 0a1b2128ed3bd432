//! Texture sinks
//!
//! A [`TextureSink`] is the rendering context a VAT texture is installed into.
//! The builder only needs four capabilities from it, so it never depends on a
//! concrete engine texture type:
//!
//! - **allocate**: create a 2D texture from a descriptor and its pixel bytes
//! - **release**: free a texture previously allocated
//! - **max_texture_dimension**: device limit used for validation
//! - **supports_format**: whether a pixel format can be sampled
//!
//! Two implementations ship with the crate:
//! - [`WgpuTextureSink`]: uploads to a `wgpu` device
//! - [`HeadlessTextureSink`]: keeps textures in memory (offline tools, tests)

mod gpu;
mod headless;

pub use gpu::{GpuVatTexture, WgpuTextureSink};
pub use headless::{HeadlessTexture, HeadlessTextureSink};

use slotmap::new_key_type;

use crate::errors::Result;
use crate::texture::VatTextureDescriptor;

new_key_type! {
    /// Opaque handle to a texture owned by a sink.
    pub struct TextureHandle;
}

/// Default `max_texture_dimension_2d` of WebGPU's baseline limits.
pub const DEFAULT_MAX_TEXTURE_DIMENSION: u32 = 8192;

pub trait TextureSink: Send + Sync {
    /// Allocates a texture and uploads `data` (tightly packed rows).
    fn allocate(&self, desc: &VatTextureDescriptor<'_>, data: &[u8]) -> Result<TextureHandle>;

    /// Frees a texture. Releasing an unknown handle is a no-op.
    fn release(&self, handle: TextureHandle);

    fn max_texture_dimension(&self) -> u32 {
        DEFAULT_MAX_TEXTURE_DIMENSION
    }

    fn supports_format(&self, _format: wgpu::TextureFormat) -> bool {
        true
    }
}
