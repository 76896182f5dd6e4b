//! Window functions: OVER (PARTITION BY ... ORDER BY ... ROWS BETWEEN ...)
//!
//! Data flows one way: rows are partitioned, each partition is sorted by the
//! window ordering, every row's frame is resolved, and a window function
//! turns the partition into one value per row.

pub mod engine;
pub mod frame;
pub mod functions;
pub mod partition;
pub mod spec;

pub use engine::{Partition, WindowEngine, WindowFunction, WindowFunctionType};
pub use frame::{FrameBound, FrameBounds, FrameResolver, WindowFrame};
pub use partition::{KeyExtractor, PartitionKey, Partitioner};
pub use spec::{Comparator, WindowSpec};
