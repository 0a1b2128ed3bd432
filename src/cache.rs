//! VAT texture cache
//!
//! One baked texture per skeleton identity, shared by every instance that
//! plays the same clips. Each entry moves through:
//!
//! ```text
//! Uncreated ──► Building ──► Ready ──► Disposed
//!                  ▲           │
//!                  └───────────┘  (rebuild-and-replace)
//! ```
//!
//! - **Building**: at most one per identity. Concurrent requests for the same
//!   identity block until the in-flight build settles.
//! - **Ready**: immutable. A new buffer for the same skeleton builds a fresh
//!   texture and swaps the entry; the old texture is released after the swap.
//! - **Disposed**: the sink handle is released and only a tombstone remains
//!   (eviction or [`VatCache::clear`]). A later request bakes it again.
//!
//! The cache is the only owner of sink handles. Callers keep the skeleton
//! identity (or an `Arc` to the immutable resource, which cannot release it).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::builder::VatTextureBuilder;
use crate::errors::{Result, VatError};
use crate::layout::TextureLayout;
use crate::samples::AnimationSampleBuffer;
use crate::settings::VatSettings;
use crate::sink::TextureSink;
use crate::skeleton::SkeletonDescriptor;
use crate::texture::BakedTextureResource;

/// Observable state of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Uncreated,
    Building,
    Ready,
    Disposed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Textures allocated by this cache.
    pub builds: u64,
    /// Requests served from a `Ready` entry.
    pub hits: u64,
    /// Textures released (eviction, replacement, teardown).
    pub disposals: u64,
}

enum Slot {
    Building,
    Ready(Arc<BakedTextureResource>),
    Disposed,
}

enum Lookup {
    InFlight,
    Stale,
    Vacant,
}

pub struct VatCache {
    sink: Arc<dyn TextureSink>,
    settings: VatSettings,
    slots: Mutex<FxHashMap<Uuid, Slot>>,
    settled: Condvar,
    builds: AtomicU64,
    hits: AtomicU64,
    disposals: AtomicU64,
}

impl VatCache {
    #[must_use]
    pub fn new(sink: Arc<dyn TextureSink>) -> Self {
        Self::with_settings(sink, VatSettings::default())
    }

    #[must_use]
    pub fn with_settings(sink: Arc<dyn TextureSink>, settings: VatSettings) -> Self {
        Self {
            sink,
            settings,
            slots: Mutex::new(FxHashMap::default()),
            settled: Condvar::new(),
            builds: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            disposals: AtomicU64::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &VatSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn TextureSink> {
        &self.sink
    }

    /// Returns the texture for `skeleton`, baking it on first use.
    ///
    /// A `Ready` entry baked from a different buffer, or for a skeleton with a
    /// different bone count, is rebuilt and replaced. Input that does not fit
    /// the skeleton fails before the cache is consulted.
    pub fn get_or_build(
        &self,
        skeleton: Option<&SkeletonDescriptor>,
        samples: &AnimationSampleBuffer,
    ) -> Result<Arc<BakedTextureResource>> {
        let skeleton = skeleton.ok_or(VatError::MissingSkeleton)?;
        let layout = TextureLayout::compute(skeleton.bone_count(), samples.len())?;

        let key = skeleton.id();
        let fingerprint = samples.fingerprint();

        let mut slots = self.slots.lock();
        loop {
            let lookup = match slots.get(&key) {
                Some(Slot::Ready(res))
                    if res.fingerprint() == fingerprint && res.layout() == layout =>
                {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    log::trace!("VAT cache hit: {}", res.name());
                    return Ok(Arc::clone(res));
                }
                Some(Slot::Ready(_)) => Lookup::Stale,
                Some(Slot::Building) => Lookup::InFlight,
                Some(Slot::Disposed) | None => Lookup::Vacant,
            };

            match lookup {
                Lookup::InFlight => self.settled.wait(&mut slots),
                Lookup::Stale => {
                    log::warn!(
                        "VAT for skeleton '{}' baked from a different buffer or layout, rebuilding",
                        skeleton.name()
                    );
                    break;
                }
                Lookup::Vacant => break,
            }
        }

        let previous = Self::begin_build(&mut slots, key);
        drop(slots);
        self.finish_build(key, previous, skeleton, samples)
    }

    /// Bakes a new texture for `skeleton` and atomically swaps it in.
    pub fn replace(
        &self,
        skeleton: &SkeletonDescriptor,
        samples: &AnimationSampleBuffer,
    ) -> Result<Arc<BakedTextureResource>> {
        let key = skeleton.id();

        let mut slots = self.slots.lock();
        while matches!(slots.get(&key), Some(Slot::Building)) {
            self.settled.wait(&mut slots);
        }
        let previous = Self::begin_build(&mut slots, key);
        drop(slots);

        log::info!("Replacing VAT for skeleton '{}'", skeleton.name());
        self.finish_build(key, previous, skeleton, samples)
    }

    #[must_use]
    pub fn get(&self, skeleton_id: Uuid) -> Option<Arc<BakedTextureResource>> {
        match self.slots.lock().get(&skeleton_id) {
            Some(Slot::Ready(res)) => Some(Arc::clone(res)),
            _ => None,
        }
    }

    #[must_use]
    pub fn state(&self, skeleton_id: Uuid) -> EntryState {
        match self.slots.lock().get(&skeleton_id) {
            Some(Slot::Ready(_)) => EntryState::Ready,
            Some(Slot::Building) => EntryState::Building,
            Some(Slot::Disposed) => EntryState::Disposed,
            None => EntryState::Uncreated,
        }
    }

    #[must_use]
    pub fn contains(&self, skeleton_id: Uuid) -> bool {
        self.state(skeleton_id) == EntryState::Ready
    }

    /// Number of `Ready` entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases the texture of `skeleton_id`. Returns `false` if there was no
    /// `Ready` entry; an in-flight build is left alone.
    pub fn evict(&self, skeleton_id: Uuid) -> bool {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(&skeleton_id) else {
            return false;
        };
        if !matches!(slot, Slot::Ready(_)) {
            return false;
        }
        let Slot::Ready(res) = std::mem::replace(slot, Slot::Disposed) else {
            return false;
        };
        drop(slots);

        self.dispose(&res);
        true
    }

    /// Releases every `Ready` texture (scene teardown).
    pub fn clear(&self) {
        let disposed: Vec<Arc<BakedTextureResource>> = {
            let mut slots = self.slots.lock();
            slots
                .values_mut()
                .filter(|slot| matches!(slot, Slot::Ready(_)))
                .filter_map(|slot| match std::mem::replace(slot, Slot::Disposed) {
                    Slot::Ready(res) => Some(res),
                    _ => None,
                })
                .collect()
        };

        for res in &disposed {
            self.dispose(res);
        }
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            builds: self.builds.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            disposals: self.disposals.load(Ordering::Relaxed),
        }
    }

    // ========================================================================
    // Internal Methods
    // ========================================================================

    fn builder(&self) -> VatTextureBuilder<'_> {
        VatTextureBuilder::new(self.sink.as_ref(), &self.settings)
    }

    /// Marks `key` as `Building`, handing back the entry it displaced.
    fn begin_build(
        slots: &mut FxHashMap<Uuid, Slot>,
        key: Uuid,
    ) -> Option<Arc<BakedTextureResource>> {
        match slots.insert(key, Slot::Building) {
            Some(Slot::Ready(previous)) => Some(previous),
            _ => None,
        }
    }

    fn finish_build(
        &self,
        key: Uuid,
        previous: Option<Arc<BakedTextureResource>>,
        skeleton: &SkeletonDescriptor,
        samples: &AnimationSampleBuffer,
    ) -> Result<Arc<BakedTextureResource>> {
        let mut guard = BuildGuard {
            cache: self,
            key,
            previous,
            armed: true,
        };
        let result = self.builder().build(Some(skeleton), samples);

        let mut slots = self.slots.lock();
        match result {
            Ok(res) => {
                self.builds.fetch_add(1, Ordering::Relaxed);
                let res = Arc::new(res);
                slots.insert(key, Slot::Ready(Arc::clone(&res)));
                let displaced = guard.previous.take();
                guard.armed = false;
                drop(slots);
                self.settled.notify_all();

                if let Some(old) = displaced {
                    self.dispose(&old);
                }
                Ok(res)
            }
            Err(err) => {
                drop(slots);
                log::debug!("VAT build for '{}' failed: {err}", skeleton.name());
                // The guard restores the previous entry and wakes waiters.
                drop(guard);
                Err(err)
            }
        }
    }

    fn dispose(&self, res: &BakedTextureResource) {
        self.sink.release(res.handle());
        self.disposals.fetch_add(1, Ordering::Relaxed);
        log::debug!("Disposed VAT texture {}", res.name());
    }
}

impl Drop for VatCache {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Settles a `Building` slot if the build does not complete normally: the
/// displaced `Ready` entry comes back (or the slot is removed) and waiters
/// are woken.
struct BuildGuard<'a> {
    cache: &'a VatCache,
    key: Uuid,
    previous: Option<Arc<BakedTextureResource>>,
    armed: bool,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut slots = self.cache.slots.lock();
        match self.previous.take() {
            Some(previous) => {
                slots.insert(self.key, Slot::Ready(previous));
            }
            None => {
                slots.remove(&self.key);
            }
        }
        drop(slots);
        self.cache.settled.notify_all();
    }
}
