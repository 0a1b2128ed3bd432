//! Half-float pixel packing
//!
//! Converts an [`AnimationSampleBuffer`] into the pixel payload uploaded to
//! the VAT texture:
//! - [`PixelPrecision::Half`]: IEEE 754 binary16, `Rgba16Float` (default)
//! - [`PixelPrecision::Full`]: binary32, `Rgba32Float`
//!
//! Half precision keeps ~11 significant bits (relative error ≤ 2⁻¹¹), which
//! is enough for baked bone transforms and halves the upload size. Both
//! formats are sampled exactly (no implicit conversion) with nearest
//! filtering.
//!
//! Packing never touches the caller's buffer.

use half::f16;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VatError};
use crate::layout::CHANNELS_PER_TEXEL;
use crate::samples::{AnimationSampleBuffer, SampleData};

/// Relative rounding error bound of a half-float (2⁻¹¹).
pub const HALF_EPSILON: f32 = 1.0 / 2048.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelPrecision {
    #[default]
    Half,
    Full,
}

impl PixelPrecision {
    #[inline]
    #[must_use]
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            Self::Half => wgpu::TextureFormat::Rgba16Float,
            Self::Full => wgpu::TextureFormat::Rgba32Float,
        }
    }

    #[inline]
    #[must_use]
    pub fn bytes_per_scalar(self) -> usize {
        match self {
            Self::Half => 2,
            Self::Full => 4,
        }
    }

    #[inline]
    #[must_use]
    pub fn bytes_per_texel(self) -> u32 {
        (self.bytes_per_scalar() * CHANNELS_PER_TEXEL) as u32
    }

    /// The other precision, used when a sink cannot sample this one.
    #[inline]
    #[must_use]
    pub fn fallback(self) -> Self {
        match self {
            Self::Half => Self::Full,
            Self::Full => Self::Half,
        }
    }
}

/// Pixel payload ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub enum PackedTexels {
    Half(Vec<f16>),
    Full(Vec<f32>),
}

impl PackedTexels {
    #[must_use]
    pub fn precision(&self) -> PixelPrecision {
        match self {
            Self::Half(_) => PixelPrecision::Half,
            Self::Full(_) => PixelPrecision::Full,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Half(v) => v.len(),
            Self::Full(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scalar readback, widened to `f32`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        match self {
            Self::Half(v) => v.get(index).map(|h| h.to_f32()),
            Self::Full(v) => v.get(index).copied(),
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Half(v) => bytemuck::cast_slice(v),
            Self::Full(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Narrows a single value, rejecting finite inputs that overflow to infinity.
#[inline]
pub fn pack_half(index: usize, value: f32) -> Result<f16> {
    let packed = f16::from_f32(value);
    if value.is_finite() && packed.is_infinite() {
        return Err(VatError::NonFiniteSample { index, value });
    }
    Ok(packed)
}

/// Packs `samples` into pixel data of the requested precision.
pub fn pack(samples: &AnimationSampleBuffer, precision: PixelPrecision) -> Result<PackedTexels> {
    let packed = match (samples.data(), precision) {
        (SampleData::Half(src), PixelPrecision::Half) => PackedTexels::Half(src.clone()),
        (SampleData::Half(src), PixelPrecision::Full) => {
            PackedTexels::Full(src.iter().map(|h| h.to_f32()).collect())
        }
        (SampleData::Single(src), PixelPrecision::Half) => PackedTexels::Half(
            src.iter()
                .enumerate()
                .map(|(i, &v)| pack_half(i, v))
                .collect::<Result<Vec<_>>>()?,
        ),
        (SampleData::Single(src), PixelPrecision::Full) => PackedTexels::Full(src.clone()),
    };
    Ok(packed)
}
