//! Constants used throughout the window engine

/// Default scale for SUM results
pub const DEFAULT_SUM_SCALE: u32 = 0;

/// Default scale for AVG results
pub const DEFAULT_AVG_SCALE: u32 = 4;

/// Default scale for PERCENT_RANK and CUME_DIST results
pub const DEFAULT_DISTRIBUTION_SCALE: u32 = 2;

/// Largest scale a `rust_decimal::Decimal` can carry
pub const MAX_DECIMAL_SCALE: u32 = 28;

/// NTH_VALUE position that selects the last row of the frame
pub const NTH_VALUE_LAST: i64 = -1;

/// Minimum number of partitions before per-partition work is spread over rayon
pub const DEFAULT_PARALLEL_MIN_PARTITIONS: usize = 10;

/// Minimum number of input rows before per-partition work is spread over rayon
pub const DEFAULT_PARALLEL_MIN_ROWS: usize = 1000;
