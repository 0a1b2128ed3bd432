use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::errors::{Result, VatError};
use crate::texture::{VatSamplingPolicy, VatTextureDescriptor};

use super::{DEFAULT_MAX_TEXTURE_DIMENSION, TextureHandle, TextureSink};

/// A texture held by [`HeadlessTextureSink`].
#[derive(Debug, Clone)]
pub struct HeadlessTexture {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub sampling: VatSamplingPolicy,
    pub data: Vec<u8>,
}

/// In-memory sink used by offline bake tools and tests.
///
/// Keeps a copy of every uploaded texture and counts allocations.
pub struct HeadlessTextureSink {
    textures: Mutex<SlotMap<TextureHandle, HeadlessTexture>>,
    allocations: AtomicU64,
    releases: AtomicU64,
    max_dimension: u32,
    unsupported: FxHashSet<wgpu::TextureFormat>,
}

impl Default for HeadlessTextureSink {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessTextureSink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            textures: Mutex::new(SlotMap::with_key()),
            allocations: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            max_dimension: DEFAULT_MAX_TEXTURE_DIMENSION,
            unsupported: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Simulates a device that cannot sample `format`.
    #[must_use]
    pub fn without_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.unsupported.insert(format);
        self
    }

    /// Total number of successful `allocate` calls.
    #[must_use]
    pub fn allocation_count(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn release_count(&self) -> u64 {
        self.releases.load(Ordering::Relaxed)
    }

    /// Number of textures currently alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.textures.lock().len()
    }

    #[must_use]
    pub fn texture(&self, handle: TextureHandle) -> Option<HeadlessTexture> {
        self.textures.lock().get(handle).cloned()
    }
}

impl TextureSink for HeadlessTextureSink {
    fn allocate(&self, desc: &VatTextureDescriptor<'_>, data: &[u8]) -> Result<TextureHandle> {
        let expected = desc.bytes_per_row() as usize * desc.layout.height as usize;
        if data.len() != expected {
            return Err(VatError::Allocation(format!(
                "upload of {} bytes does not match {}x{} {:?}",
                data.len(),
                desc.layout.width,
                desc.layout.height,
                desc.format()
            )));
        }

        let texture = HeadlessTexture {
            label: desc.label.map(str::to_string),
            width: desc.layout.width,
            height: desc.layout.height,
            format: desc.format(),
            sampling: desc.sampling,
            data: data.to_vec(),
        };
        let handle = self.textures.lock().insert(texture);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    fn release(&self, handle: TextureHandle) {
        if self.textures.lock().remove(handle).is_some() {
            self.releases.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_dimension
    }

    fn supports_format(&self, format: wgpu::TextureFormat) -> bool {
        !self.unsupported.contains(&format)
    }
}
