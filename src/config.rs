//! Engine configuration
//!
//! Controls output scales, the rounding policy and when per-partition work is
//! spread across the rayon thread pool.

use crate::common::constants::{
    DEFAULT_AVG_SCALE, DEFAULT_DISTRIBUTION_SCALE, DEFAULT_PARALLEL_MIN_PARTITIONS,
    DEFAULT_PARALLEL_MIN_ROWS, DEFAULT_SUM_SCALE, MAX_DECIMAL_SCALE,
};
use crate::common::decimal::RoundingMode;
use crate::common::error::{WindowError, WindowResult};
use serde::{Deserialize, Serialize};

/// Window engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Scale of SUM results
    pub default_scale: u32,
    /// Scale of AVG results
    pub avg_scale: u32,
    /// Scale of PERCENT_RANK and CUME_DIST results
    pub distribution_scale: u32,
    /// Rounding applied at every output scale
    pub rounding: RoundingMode,
    /// Parallel partition evaluation
    pub parallel: ParallelConfig,
}

impl WindowConfig {
    /// Sequential configuration with the default scales
    pub fn sequential() -> Self {
        Self {
            parallel: ParallelConfig::disabled(),
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing keys fall back to their defaults
    pub fn from_json(json: &str) -> WindowResult<Self> {
        let config: WindowConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> WindowResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the SUM scale and the rounding mode used everywhere
    pub fn with_default_scale(mut self, scale: u32, rounding: RoundingMode) -> Self {
        self.default_scale = scale;
        self.rounding = rounding;
        self
    }

    pub fn with_avg_scale(mut self, scale: u32) -> Self {
        self.avg_scale = scale;
        self
    }

    pub fn with_distribution_scale(mut self, scale: u32) -> Self {
        self.distribution_scale = scale;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> WindowResult<()> {
        for (name, scale) in [
            ("default_scale", self.default_scale),
            ("avg_scale", self.avg_scale),
            ("distribution_scale", self.distribution_scale),
        ] {
            if scale > MAX_DECIMAL_SCALE {
                return Err(WindowError::Config(format!(
                    "{} = {} exceeds the maximum decimal scale {}",
                    name, scale, MAX_DECIMAL_SCALE
                )));
            }
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_scale: DEFAULT_SUM_SCALE,
            avg_scale: DEFAULT_AVG_SCALE,
            distribution_scale: DEFAULT_DISTRIBUTION_SCALE,
            rounding: RoundingMode::HalfUp,
            parallel: ParallelConfig::default(),
        }
    }
}

/// When to evaluate partitions on the rayon pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    pub enabled: bool,
    /// Partition count below which evaluation stays sequential
    pub min_partitions: usize,
    /// Input row count below which evaluation stays sequential
    pub min_rows: usize,
}

impl ParallelConfig {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            min_partitions: DEFAULT_PARALLEL_MIN_PARTITIONS,
            min_rows: DEFAULT_PARALLEL_MIN_ROWS,
        }
    }

    pub fn from_system() -> Self {
        Self::new(num_cpus::get() > 1)
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Whether an input of this shape should be evaluated in parallel
    pub fn should_parallelize(&self, partition_count: usize, row_count: usize) -> bool {
        self.enabled && partition_count >= self.min_partitions && row_count >= self.min_rows
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self::from_system()
    }
}
