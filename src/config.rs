//! pixelcube global configuration options.

use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::hypercube::HypercubeStep;

/// Global configuration options for the pixelcube crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Coalesce Region Reads
///  > default: [`false`]
///
/// If enabled, hypercube reconstruction gathers every byte range it needs and requests them from the row source with a single [`get_regions`](crate::source::RowHypercubeSourceTraits::get_regions) call.
/// Otherwise each row (or sample) is requested with its own [`get_region`](crate::source::RowHypercubeSourceTraits::get_region) call.
/// The reconstructed bytes are identical either way.
///
/// ## Strided Steps
///  > default: `[[2, 2, 1, 1, 1], [6, 5, 4, 3, 2]]`
///
/// The step vectors exercised by [`PixelsComparison::compare_hypercube`](crate::oracle::PixelsComparison::compare_hypercube) after the solid comparison.
///
/// ## Compare Offsets
///  > default: [`true`]
///
/// If enabled, [`PixelsComparison::compare_other_getters`](crate::oracle::PixelsComparison::compare_other_getters) also checks row, plane, stack and timepoint offsets.
#[derive(Debug, Clone)]
pub struct Config {
    coalesce_region_reads: bool,
    strided_steps: Vec<HypercubeStep>,
    compare_offsets: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            coalesce_region_reads: false,
            strided_steps: vec![[2, 2, 1, 1, 1], [6, 5, 4, 3, 2]],
            compare_offsets: true,
        }
    }
}

impl Config {
    /// Get the [coalesce region reads](#coalesce-region-reads) configuration.
    #[must_use]
    pub fn coalesce_region_reads(&self) -> bool {
        self.coalesce_region_reads
    }

    /// Set the [coalesce region reads](#coalesce-region-reads) configuration.
    pub fn set_coalesce_region_reads(&mut self, coalesce_region_reads: bool) {
        self.coalesce_region_reads = coalesce_region_reads;
    }

    /// Get the [strided steps](#strided-steps) configuration.
    #[must_use]
    pub fn strided_steps(&self) -> &[HypercubeStep] {
        &self.strided_steps
    }

    /// Set the [strided steps](#strided-steps) configuration.
    pub fn set_strided_steps(&mut self, strided_steps: Vec<HypercubeStep>) {
        self.strided_steps = strided_steps;
    }

    /// Get the [compare offsets](#compare-offsets) configuration.
    #[must_use]
    pub fn compare_offsets(&self) -> bool {
        self.compare_offsets
    }

    /// Set the [compare offsets](#compare-offsets) configuration.
    pub fn set_compare_offsets(&mut self, compare_offsets: bool) {
        self.compare_offsets = compare_offsets;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global pixelcube configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap()
}

/// Returns a mutable reference to the global pixelcube configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap()
}
