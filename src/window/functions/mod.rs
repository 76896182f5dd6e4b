//! Window function implementations
//!
//! Each function is a [`WindowFunction`](crate::window::engine::WindowFunction)
//! that maps one sorted partition to one value per row.

pub mod aggregate;
pub mod extrema;
pub mod field;
pub mod offset;
pub mod ranking;

pub use aggregate::{sliding_totals, Avg, Count, FrameTotal, Sum};
pub use extrema::{Max, Min};
pub use field::{Field, FieldExtractor, TryField};
pub use offset::{Lag, Lead, NthValue};
pub use ranking::{
    cut_first_rank, rank_same_asc, rank_sorted, CumeDist, DenseRank, NTile, PercentRank, Rank,
    RankMode, RowNumber,
};
