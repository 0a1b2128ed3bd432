//! # Myth VAT
//!
//! Bakes skeletal animation samples into vertex animation textures (VAT):
//! one texture row per frame, four RGBA texels per bone, sampled by the
//! vertex stage with nearest filtering instead of uploading bone matrices per
//! instance.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use myth_vat::{HeadlessTextureSink, SkeletonDescriptor, AnimationSampleBuffer, VatCache};
//!
//! let cache = VatCache::new(Arc::new(HeadlessTextureSink::new()));
//! let skeleton = SkeletonDescriptor::from_bone_names("Hero", ["hips", "spine", "head"]);
//! let vat = cache.get_or_build(Some(&skeleton), &samples)?;
//! assert_eq!(vat.name(), "VAT_Hero");
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod builder;
pub mod cache;
pub mod errors;
pub mod layout;
pub mod packer;
pub mod samples;
pub mod settings;
pub mod sink;
pub mod skeleton;
pub mod texture;

pub use builder::{VatTextureBuilder, resource_name};
pub use cache::{CacheStats, EntryState, VatCache};
pub use errors::{Result, VatError};
pub use layout::TextureLayout;
pub use packer::{PackedTexels, PixelPrecision};
pub use samples::{AnimationSampleBuffer, SampleRecorder};
pub use settings::VatSettings;
pub use sink::{HeadlessTextureSink, TextureHandle, TextureSink, WgpuTextureSink};
pub use skeleton::{BoneDescriptor, SkeletonDescriptor};
pub use texture::{BakedTextureResource, VatSamplingPolicy};
