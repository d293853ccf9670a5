//! Per-run cache for the collision kernel and the fragment tensor.
//!
//! Both objects are pure functions of their inputs, so each is stored with
//! the key it was built from and rebuilt only when the key changes. A new
//! grid version always changes the key. The cache lives inside the run
//! context and is cleared on teardown; nothing is shared between runs.

use std::sync::Arc;

use super::fragments::FragmentTensor;
use super::kernel::CollisionKernel;
use crate::error::DiskResult;

/// Inputs that determine the collision kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernelKey {
    pub grid_version: u64,
    pub n_bins: usize,
    pub bulk_density_bits: u64,
    pub velocity_law: u8,
    pub velocity_bits: u64,
    pub h_factor_bits: u64,
    pub scale_height_bits: u64,
}

/// Inputs that determine the fragment tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentKey {
    pub grid_version: u64,
    pub n_bins: usize,
    pub alpha_bits: u64,
    pub remnant_binning: u8,
    pub qstar_fingerprint: u64,
    pub bulk_density_bits: u64,
    pub velocity_bits: u64,
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub kernel_hits: u64,
    pub kernel_builds: u64,
    pub fragment_hits: u64,
    pub fragment_builds: u64,
}

#[derive(Debug, Default)]
pub struct CollisionCache {
    kernel: Option<(KernelKey, Arc<CollisionKernel>)>,
    fragments: Option<(FragmentKey, Arc<FragmentTensor>)>,
    stats: CacheStats,
}

impl CollisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached kernel for `key`, building it with `build` on a miss.
    pub fn kernel<F>(&mut self, key: KernelKey, build: F) -> DiskResult<Arc<CollisionKernel>>
    where
        F: FnOnce() -> DiskResult<CollisionKernel>,
    {
        if let Some((cached_key, kernel)) = &self.kernel {
            if *cached_key == key {
                self.stats.kernel_hits += 1;
                return Ok(Arc::clone(kernel));
            }
        }
        let kernel = Arc::new(build()?);
        self.stats.kernel_builds += 1;
        log::trace!("collision kernel rebuilt for grid version {}", key.grid_version);
        self.kernel = Some((key, Arc::clone(&kernel)));
        Ok(kernel)
    }

    /// Cached fragment tensor for `key`, building it with `build` on a miss.
    pub fn fragments<F>(&mut self, key: FragmentKey, build: F) -> DiskResult<Arc<FragmentTensor>>
    where
        F: FnOnce() -> DiskResult<FragmentTensor>,
    {
        if let Some((cached_key, tensor)) = &self.fragments {
            if *cached_key == key {
                self.stats.fragment_hits += 1;
                return Ok(Arc::clone(tensor));
            }
        }
        let tensor = Arc::new(build()?);
        self.stats.fragment_builds += 1;
        log::trace!("fragment tensor rebuilt for grid version {}", key.grid_version);
        self.fragments = Some((key, Arc::clone(&tensor)));
        Ok(tensor)
    }

    /// Drop every cached object.
    pub fn invalidate(&mut self) {
        self.kernel = None;
        self.fragments = None;
    }

    pub fn is_empty(&self) -> bool {
        self.kernel.is_none() && self.fragments.is_none()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
