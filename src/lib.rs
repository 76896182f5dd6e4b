//! PrismDB Window - In-Memory Analytic Window Functions
//!
//! Evaluates SQL-style window functions over ordinary Rust collections:
//! `OVER (PARTITION BY ... ORDER BY ... ROWS BETWEEN ...)` semantics for
//! ranking (ROW_NUMBER, RANK, DENSE_RANK, PERCENT_RANK, CUME_DIST), offset
//! (LAG, LEAD, NTH_VALUE) and frame aggregate (SUM, AVG, MIN, MAX, COUNT)
//! functions. Numeric results use exact decimal arithmetic.
//!
//! ```
//! use prism_window::{FrameBound, WindowConfig, WindowEngine, WindowSpec};
//!
//! let scores = vec![("a", 10), ("a", 10), ("a", 20), ("a", 30)];
//! let spec = WindowSpec::<(&str, i32)>::new()
//!     .partition_by(|r| r.0)
//!     .order_by_key(|r| r.1)
//!     .rows_between(FrameBound::UnboundedPreceding, FrameBound::CurrentRow);
//!
//! let engine = WindowEngine::new(WindowConfig::sequential()).unwrap();
//! let ranks: Vec<usize> = engine.rank(&scores, &spec).unwrap().into_iter().map(|(_, r)| r).collect();
//! assert_eq!(ranks, vec![1, 1, 3, 4]);
//! ```
//!
//! The engine only borrows the input; callers must not mutate it while an
//! evaluation is running.

pub mod common;
pub mod config;
pub mod window;

// Re-export common types for convenience
pub use common::{RoundingMode, ToDecimal, WindowError, WindowResult};

// Re-export configuration for convenience
pub use config::{ParallelConfig, WindowConfig};

// Re-export the window system for convenience
pub use window::{
    Comparator, FrameBound, FrameBounds, FrameResolver, Partition, PartitionKey, Partitioner,
    WindowEngine, WindowFrame, WindowFunction, WindowFunctionType, WindowSpec,
};

pub use rust_decimal::Decimal;
