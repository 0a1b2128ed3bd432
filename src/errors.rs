//! Error Types
//!
//! This module defines the error types used by the VAT baker.
//!
//! # Overview
//!
//! The main error type [`VatError`] covers every failure mode of a bake:
//! - Missing or malformed caller-supplied data (skeleton, sample buffer)
//! - Values that cannot be represented in the target pixel format
//! - Texture sink limits and allocation failures
//!
//! All of them are deterministic precondition failures. Nothing here is
//! transient, so no operation in this crate retries.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, VatError>`.
//!
//! ```rust,ignore
//! use myth_vat::errors::{VatError, Result};
//!
//! fn bake() -> Result<()> {
//!     Err(VatError::MissingSkeleton)
//! }
//! ```

use thiserror::Error;

/// The main error type for VAT baking.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VatError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// No skeleton descriptor was supplied, so the texture width is unknown.
    #[error("Missing skeleton: a skeleton descriptor is required to compute the VAT layout")]
    MissingSkeleton,

    /// The sample buffer length is not an exact multiple of one texture row.
    #[error(
        "Invalid VAT layout: {buffer_len} samples do not fill whole rows of {width} texels \
         (bone count {bone_count})"
    )]
    InvalidLayout {
        /// Bone count of the skeleton the buffer was paired with
        bone_count: usize,
        /// Computed row width in texels
        width: usize,
        /// Number of scalars in the sample buffer
        buffer_len: usize,
    },

    /// The recorder was handed a frame with the wrong number of joints.
    #[error("Bone count mismatch: expected {expected} joint matrices, got {actual}")]
    BoneCountMismatch {
        /// Bone count of the skeleton
        expected: usize,
        /// Number of matrices supplied
        actual: usize,
    },

    // ========================================================================
    // Packing Errors
    // ========================================================================
    /// A finite sample overflows the half-float range.
    #[error("Sample {index} ({value}) is not representable as a half-float")]
    NonFiniteSample {
        /// Position of the offending scalar in the buffer
        index: usize,
        /// The original single-precision value
        value: f32,
    },

    // ========================================================================
    // Texture Sink Errors
    // ========================================================================
    /// The computed texture exceeds the sink's maximum 2D dimension.
    #[error("VAT texture {width}x{height} exceeds the device limit of {max}")]
    ExceedsDeviceLimit {
        /// Texture width in texels
        width: u32,
        /// Texture height in texels
        height: u32,
        /// Maximum supported 2D dimension
        max: u32,
    },

    /// Neither the requested nor the fallback pixel format can be sampled.
    #[error("Texture format {0:?} is not supported by the texture sink")]
    UnsupportedFormat(wgpu::TextureFormat),

    /// The texture sink failed to allocate the resource.
    #[error("Texture allocation failed: {0}")]
    Allocation(String),
}

/// Alias for `Result<T, VatError>`.
pub type Result<T> = std::result::Result<T, VatError>;
