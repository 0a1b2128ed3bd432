use parking_lot::Mutex;
use slotmap::SlotMap;

use crate::errors::{Result, VatError};
use crate::texture::VatTextureDescriptor;

use super::{TextureHandle, TextureSink};

/// GPU side of a VAT texture: the texture, its default view and its sampler.
pub struct GpuVatTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: wgpu::Extent3d,
    pub format: wgpu::TextureFormat,
}

/// Sink that uploads VAT textures to a `wgpu` device.
pub struct WgpuTextureSink {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: Mutex<SlotMap<TextureHandle, GpuVatTexture>>,
}

impl WgpuTextureSink {
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            textures: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Returns the view and sampler to bind for `handle`.
    #[must_use]
    pub fn binding(&self, handle: TextureHandle) -> Option<(wgpu::TextureView, wgpu::Sampler)> {
        let textures = self.textures.lock();
        let gpu = textures.get(handle)?;
        Some((gpu.view.clone(), gpu.sampler.clone()))
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.textures.lock().len()
    }
}

impl TextureSink for WgpuTextureSink {
    fn allocate(&self, desc: &VatTextureDescriptor<'_>, data: &[u8]) -> Result<TextureHandle> {
        let size = desc.layout.extent();
        let bytes_per_row = desc.bytes_per_row();
        let expected = bytes_per_row as usize * size.height as usize;
        if data.len() != expected {
            return Err(VatError::Allocation(format!(
                "upload of {} bytes does not match {}x{} {:?}",
                data.len(),
                size.width,
                size.height,
                desc.format()
            )));
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: desc.label,
            size,
            mip_level_count: desc.sampling.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format(),
            usage: VatTextureDescriptor::usage(),
            view_formats: &[],
        });

        // Uploaded unflipped: texture row f is frame f.
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(size.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: desc.label,
            format: Some(desc.format()),
            dimension: Some(wgpu::TextureViewDimension::D2),
            ..Default::default()
        });
        let sampler = self
            .device
            .create_sampler(&desc.sampling.sampler_descriptor(desc.label));

        log::debug!(
            "Uploaded VAT texture {:?} ({}x{}, {:?})",
            desc.label,
            size.width,
            size.height,
            desc.format()
        );

        let handle = self.textures.lock().insert(GpuVatTexture {
            texture,
            view,
            sampler,
            size,
            format: desc.format(),
        });
        Ok(handle)
    }

    fn release(&self, handle: TextureHandle) {
        if let Some(gpu) = self.textures.lock().remove(handle) {
            gpu.texture.destroy();
        }
    }

    fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn supports_format(&self, format: wgpu::TextureFormat) -> bool {
        let features = self.device.features();
        format
            .guaranteed_format_features(features)
            .allowed_usages
            .contains(VatTextureDescriptor::usage())
    }
}
