//! VAT texel addressing
//!
//! One texture row holds one animation frame. Inside a row, every bone owns
//! [`TEXELS_PER_BONE`] consecutive RGBA texels, followed by one reserved slot
//! of the same size for the root transform:
//!
//! ```text
//!          bone 0          bone 1               root slot
//! row f: | t0 t1 t2 t3 | t4 t5 t6 t7 | ... | tN tN+1 tN+2 tN+3 |
//! ```
//!
//! For frame `f` and bone `b` a consumer reads row `f`, columns
//! `b * 4 ..= b * 4 + 3`. The layout is exact: a buffer that does not fill a
//! whole number of rows is rejected, never padded or truncated.

use std::ops::Range;

use glam::UVec2;

use crate::errors::{Result, VatError};

/// Texels reserved per bone in a row.
pub const TEXELS_PER_BONE: usize = 4;
/// Scalars per texel (RGBA).
pub const CHANNELS_PER_TEXEL: usize = 4;
/// Slots appended to every row after the bones (root transform).
pub const RESERVED_SLOTS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureLayout {
    /// Row width in texels: `(bone_count + 1) * 4`.
    pub width: u32,
    /// Number of rows, one per frame.
    pub height: u32,
    bone_count: usize,
}

impl TextureLayout {
    /// Row width in texels for a skeleton with `bone_count` bones.
    #[inline]
    #[must_use]
    pub fn width_for(bone_count: usize) -> Option<usize> {
        bone_count
            .checked_add(RESERVED_SLOTS)?
            .checked_mul(TEXELS_PER_BONE)
    }

    /// Derives the texel grid from the bone count and the number of scalars.
    pub fn compute(bone_count: usize, buffer_len: usize) -> Result<Self> {
        let invalid = |width: usize| VatError::InvalidLayout {
            bone_count,
            width,
            buffer_len,
        };

        let width = Self::width_for(bone_count).ok_or_else(|| invalid(0))?;
        let row_scalars = width
            .checked_mul(CHANNELS_PER_TEXEL)
            .ok_or_else(|| invalid(width))?;

        if buffer_len == 0 || buffer_len % row_scalars != 0 {
            return Err(invalid(width));
        }
        let height = buffer_len / row_scalars;

        Ok(Self {
            width: u32::try_from(width).map_err(|_| invalid(width))?,
            height: u32::try_from(height).map_err(|_| invalid(width))?,
            bone_count,
        })
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn texel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Scalars in one row (one frame).
    #[inline]
    #[must_use]
    pub fn row_scalars(&self) -> usize {
        self.width as usize * CHANNELS_PER_TEXEL
    }

    #[inline]
    #[must_use]
    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    /// Column of the reserved root slot's first texel.
    #[inline]
    #[must_use]
    pub fn root_slot_column(&self) -> u32 {
        (self.bone_count * TEXELS_PER_BONE) as u32
    }

    /// Coordinate of the first texel of `bone` in `frame`.
    ///
    /// `bone == bone_count` addresses the reserved root slot.
    #[must_use]
    pub fn bone_texel_origin(&self, frame: u32, bone: usize) -> Option<UVec2> {
        if frame >= self.height || bone > self.bone_count {
            return None;
        }
        Some(UVec2::new((bone * TEXELS_PER_BONE) as u32, frame))
    }

    /// The four texel coordinates holding `bone` in `frame`.
    #[must_use]
    pub fn bone_texels(&self, frame: u32, bone: usize) -> Option<[UVec2; TEXELS_PER_BONE]> {
        let origin = self.bone_texel_origin(frame, bone)?;
        Some(std::array::from_fn(|i| origin + UVec2::new(i as u32, 0)))
    }

    /// Range of the flat sample buffer that encodes `bone` in `frame`.
    #[must_use]
    pub fn scalar_range(&self, frame: u32, bone: usize) -> Option<Range<usize>> {
        let origin = self.bone_texel_origin(frame, bone)?;
        let start =
            origin.y as usize * self.row_scalars() + origin.x as usize * CHANNELS_PER_TEXEL;
        Some(start..start + TEXELS_PER_BONE * CHANNELS_PER_TEXEL)
    }
}
