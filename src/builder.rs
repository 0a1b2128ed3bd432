//! VAT texture builder
//!
//! Turns a skeleton and its sample buffer into a [`BakedTextureResource`]:
//!
//! 1. compute the [`TextureLayout`] (fails fast, before any allocation)
//! 2. validate it against the sink's limits and pick a samplable precision
//! 3. pack the samples
//! 4. allocate the texture in the sink with the fixed sampling policy
//!
//! The builder is stateless and takes its sink explicitly; caching and
//! disposal belong to [`VatCache`](crate::cache::VatCache).

use crate::errors::{Result, VatError};
use crate::layout::TextureLayout;
use crate::packer::{self, PixelPrecision};
use crate::samples::AnimationSampleBuffer;
use crate::settings::VatSettings;
use crate::sink::TextureSink;
use crate::skeleton::SkeletonDescriptor;
use crate::texture::{BakedTextureResource, VatSamplingPolicy, VatTextureDescriptor};

/// Resource name of the VAT texture baked for `skeleton`.
#[must_use]
pub fn resource_name(prefix: &str, skeleton: &SkeletonDescriptor) -> String {
    format!("{prefix}{}", skeleton.name())
}

pub struct VatTextureBuilder<'a> {
    sink: &'a dyn TextureSink,
    settings: &'a VatSettings,
}

impl<'a> VatTextureBuilder<'a> {
    #[must_use]
    pub fn new(sink: &'a dyn TextureSink, settings: &'a VatSettings) -> Self {
        Self { sink, settings }
    }

    /// Derives the layout for a bake without allocating anything.
    pub fn layout(
        skeleton: Option<&SkeletonDescriptor>,
        samples: &AnimationSampleBuffer,
    ) -> Result<TextureLayout> {
        let skeleton = skeleton.ok_or(VatError::MissingSkeleton)?;
        TextureLayout::compute(skeleton.bone_count(), samples.len())
    }

    pub fn build(
        &self,
        skeleton: Option<&SkeletonDescriptor>,
        samples: &AnimationSampleBuffer,
    ) -> Result<BakedTextureResource> {
        let skeleton = skeleton.ok_or(VatError::MissingSkeleton)?;
        let layout = TextureLayout::compute(skeleton.bone_count(), samples.len())?;

        let max = self.sink.max_texture_dimension();
        if layout.width > max || layout.height > max {
            return Err(VatError::ExceedsDeviceLimit {
                width: layout.width,
                height: layout.height,
                max,
            });
        }

        let precision = self.resolve_precision()?;
        let texels = packer::pack(samples, precision)?;
        let name = resource_name(&self.settings.name_prefix, skeleton);

        let desc = VatTextureDescriptor {
            label: self.settings.label_textures.then_some(name.as_str()),
            layout,
            precision,
            sampling: VatSamplingPolicy::POLICY,
        };
        let handle = self.sink.allocate(&desc, texels.as_bytes())?;

        log::debug!(
            "Baked {name}: {} bones x {} frames -> {}x{} {:?}",
            skeleton.bone_count(),
            layout.height,
            layout.width,
            layout.height,
            desc.format()
        );

        Ok(BakedTextureResource {
            name,
            skeleton_id: skeleton.id(),
            layout,
            texels,
            handle,
            fingerprint: samples.fingerprint(),
        })
    }

    fn resolve_precision(&self) -> Result<PixelPrecision> {
        let requested = self.settings.precision;
        if self.sink.supports_format(requested.texture_format()) {
            return Ok(requested);
        }

        let fallback = requested.fallback();
        if self.settings.allow_precision_fallback
            && self.sink.supports_format(fallback.texture_format())
        {
            log::warn!(
                "{:?} is not samplable on this device, baking VAT as {:?}",
                requested.texture_format(),
                fallback.texture_format()
            );
            return Ok(fallback);
        }

        Err(VatError::UnsupportedFormat(requested.texture_format()))
    }
}
