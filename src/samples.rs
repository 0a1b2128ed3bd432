//! Animation sample buffers
//!
//! An [`AnimationSampleBuffer`] is the flat scalar stream produced by an
//! offline baker or importer: for every frame, sixteen scalars per bone
//! (four RGBA texels) followed by sixteen scalars for the reserved root slot.
//!
//! The buffer is read-only once constructed. Its fingerprint identifies the
//! content for cache invalidation.

use glam::Mat4;
use half::f16;
use xxhash_rust::xxh3::xxh3_128;

use crate::errors::{Result, VatError};
use crate::layout::{CHANNELS_PER_TEXEL, TEXELS_PER_BONE};

/// Scalars describing one bone for one frame (4 texels × RGBA).
pub const SCALARS_PER_BONE: usize = TEXELS_PER_BONE * CHANNELS_PER_TEXEL;

#[derive(Debug, Clone, PartialEq)]
pub enum SampleData {
    /// Half-precision scalars (the canonical baked form).
    Half(Vec<f16>),
    /// Single-precision scalars, narrowed by the packer.
    Single(Vec<f32>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSampleBuffer {
    data: SampleData,
}

impl AnimationSampleBuffer {
    #[must_use]
    pub fn from_half(data: Vec<f16>) -> Self {
        Self {
            data: SampleData::Half(data),
        }
    }

    /// Wraps raw IEEE 754 binary16 bit patterns.
    #[must_use]
    pub fn from_half_bits(bits: &[u16]) -> Self {
        Self::from_half(bits.iter().copied().map(f16::from_bits).collect())
    }

    #[must_use]
    pub fn from_f32(data: Vec<f32>) -> Self {
        Self {
            data: SampleData::Single(data),
        }
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &SampleData {
        &self.data
    }

    /// Number of scalars in the buffer.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.data {
            SampleData::Half(v) => v.len(),
            SampleData::Single(v) => v.len(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn is_half(&self) -> bool {
        matches!(self.data, SampleData::Half(_))
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        match &self.data {
            SampleData::Half(v) => v.get(index).map(|h| h.to_f32()),
            SampleData::Single(v) => v.get(index).copied(),
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            SampleData::Half(v) => bytemuck::cast_slice(v),
            SampleData::Single(v) => bytemuck::cast_slice(v),
        }
    }

    /// xxh3-128 of the raw buffer bytes, salted with the element width so a
    /// half and a single buffer never collide.
    #[must_use]
    pub fn fingerprint(&self) -> u128 {
        let salt: u128 = if self.is_half() { 16 } else { 32 };
        xxh3_128(self.as_bytes()) ^ salt
    }
}

/// Records per-frame joint matrices into a single-precision sample buffer.
///
/// Each bone's matrix is stored column-major across its four texels; the
/// reserved slot at the end of the row carries the root transform.
#[derive(Debug, Clone)]
pub struct SampleRecorder {
    bone_count: usize,
    frame_count: usize,
    data: Vec<f32>,
}

impl SampleRecorder {
    #[must_use]
    pub fn new(bone_count: usize) -> Self {
        Self {
            bone_count,
            frame_count: 0,
            data: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(bone_count: usize, frames: usize) -> Self {
        let mut recorder = Self::new(bone_count);
        // A hint only: oversized requests fall back to growing on demand.
        if let Some(scalars) = Self::scalars_for(bone_count, frames) {
            let _ = recorder.data.try_reserve(scalars);
        }
        recorder
    }

    /// Scalar count of `frames` rows, or `None` on overflow.
    fn scalars_for(bone_count: usize, frames: usize) -> Option<usize> {
        bone_count
            .checked_add(1)?
            .checked_mul(SCALARS_PER_BONE)?
            .checked_mul(frames)
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Appends one frame (one texture row).
    pub fn push_frame(&mut self, joints: &[Mat4], root: Mat4) -> Result<()> {
        if joints.len() != self.bone_count {
            return Err(VatError::BoneCountMismatch {
                expected: self.bone_count,
                actual: joints.len(),
            });
        }

        for joint in joints.iter().chain(std::iter::once(&root)) {
            self.data.extend_from_slice(&joint.to_cols_array());
        }
        self.frame_count += 1;
        Ok(())
    }

    #[must_use]
    pub fn finish(self) -> AnimationSampleBuffer {
        AnimationSampleBuffer::from_f32(self.data)
    }

    /// Finishes the recording, narrowing to half precision up front.
    #[must_use]
    pub fn finish_half(self) -> AnimationSampleBuffer {
        AnimationSampleBuffer::from_half(self.data.into_iter().map(f16::from_f32).collect())
    }
}
