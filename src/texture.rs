//! Baked VAT textures
//!
//! The fixed sampling policy, the allocation request handed to a
//! [`TextureSink`](crate::sink::TextureSink), and the immutable resource the
//! cache hands out.

use glam::Mat4;
use uuid::Uuid;

use crate::layout::TextureLayout;
use crate::packer::{PackedTexels, PixelPrecision};
use crate::samples::SCALARS_PER_BONE;
use crate::sink::TextureHandle;

// ============================================================================
// 1. Sampling policy
// ============================================================================

/// Sampler and upload policy of every VAT texture.
///
/// Texels are data slots, not colors: any filtering blends unrelated bones or
/// frames. The policy is a constant and has no setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VatSamplingPolicy {
    address_mode_u: wgpu::AddressMode,
    address_mode_v: wgpu::AddressMode,
    mag_filter: wgpu::FilterMode,
    min_filter: wgpu::FilterMode,
    mipmap_filter: wgpu::MipmapFilterMode,
    mip_level_count: u32,
    flip_y: bool,
}

impl VatSamplingPolicy {
    pub const POLICY: Self = Self {
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        mip_level_count: 1,
        flip_y: false,
    };

    #[inline]
    #[must_use]
    pub fn address_modes(&self) -> (wgpu::AddressMode, wgpu::AddressMode) {
        (self.address_mode_u, self.address_mode_v)
    }

    #[inline]
    #[must_use]
    pub fn mag_filter(&self) -> wgpu::FilterMode {
        self.mag_filter
    }

    #[inline]
    #[must_use]
    pub fn min_filter(&self) -> wgpu::FilterMode {
        self.min_filter
    }

    #[inline]
    #[must_use]
    pub fn mipmap_filter(&self) -> wgpu::MipmapFilterMode {
        self.mipmap_filter
    }

    #[inline]
    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }

    #[inline]
    #[must_use]
    pub fn generates_mipmaps(&self) -> bool {
        self.mip_level_count > 1
    }

    /// Row 0 of the texture is frame 0 of the buffer.
    #[inline]
    #[must_use]
    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    #[must_use]
    pub fn sampler_descriptor<'a>(&self, label: Option<&'a str>) -> wgpu::SamplerDescriptor<'a> {
        wgpu::SamplerDescriptor {
            label,
            address_mode_u: self.address_mode_u,
            address_mode_v: self.address_mode_v,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: self.mag_filter,
            min_filter: self.min_filter,
            mipmap_filter: self.mipmap_filter,
            ..Default::default()
        }
    }
}

// ============================================================================
// 2. Allocation request
// ============================================================================

/// Everything a [`TextureSink`](crate::sink::TextureSink) needs to allocate a
/// VAT texture.
#[derive(Debug, Clone, Copy)]
pub struct VatTextureDescriptor<'a> {
    pub label: Option<&'a str>,
    pub layout: TextureLayout,
    pub precision: PixelPrecision,
    pub sampling: VatSamplingPolicy,
}

impl VatTextureDescriptor<'_> {
    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.precision.texture_format()
    }

    #[inline]
    #[must_use]
    pub fn bytes_per_row(&self) -> u32 {
        self.precision.bytes_per_texel() * self.layout.width
    }

    #[inline]
    #[must_use]
    pub fn usage() -> wgpu::TextureUsages {
        wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST
    }
}

// ============================================================================
// 3. Baked Texture
// ============================================================================

/// A VAT texture installed in a sink.
///
/// Bound to exactly one (skeleton, sample buffer) pair and immutable. The
/// sink handle is released by the owning [`VatCache`](crate::cache::VatCache)
/// only.
#[derive(Debug)]
pub struct BakedTextureResource {
    pub(crate) name: String,
    pub(crate) skeleton_id: Uuid,
    pub(crate) layout: TextureLayout,
    pub(crate) texels: PackedTexels,
    pub(crate) handle: TextureHandle,
    pub(crate) fingerprint: u128,
}

impl BakedTextureResource {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn skeleton_id(&self) -> Uuid {
        self.skeleton_id
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> TextureLayout {
        self.layout
    }

    #[inline]
    #[must_use]
    pub fn precision(&self) -> PixelPrecision {
        self.texels.precision()
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.precision().texture_format()
    }

    #[inline]
    #[must_use]
    pub fn sampling(&self) -> VatSamplingPolicy {
        VatSamplingPolicy::POLICY
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Fingerprint of the sample buffer this texture was baked from.
    #[inline]
    #[must_use]
    pub fn fingerprint(&self) -> u128 {
        self.fingerprint
    }

    /// CPU copy of the uploaded pixels.
    #[inline]
    #[must_use]
    pub fn texels(&self) -> &PackedTexels {
        &self.texels
    }

    /// Reads the 16 scalars of `bone` at `frame`, the way the vertex stage does.
    #[must_use]
    pub fn bone_texels(&self, frame: u32, bone: usize) -> Option<[f32; SCALARS_PER_BONE]> {
        let range = self.layout.scalar_range(frame, bone)?;
        let mut out = [0.0; SCALARS_PER_BONE];
        for (slot, index) in out.iter_mut().zip(range) {
            *slot = self.texels.get(index)?;
        }
        Some(out)
    }

    /// Reconstructs a bone transform stored column-major across its texels.
    #[must_use]
    pub fn bone_transform(&self, frame: u32, bone: usize) -> Option<Mat4> {
        self.bone_texels(frame, bone)
            .map(|cols| Mat4::from_cols_array(&cols))
    }

    /// Transform stored in the reserved root slot of `frame`.
    #[must_use]
    pub fn root_transform(&self, frame: u32) -> Option<Mat4> {
        self.bone_transform(frame, self.layout.bone_count())
    }
}
