//! Window function evaluation
//!
//! The engine partitions the input, sorts each partition by the window's
//! ordering, hands every partition to a [`WindowFunction`] and concatenates
//! the per-row results. Partitions are independent, so large inputs are
//! evaluated on the rayon pool; the output order is the same either way.

use crate::common::error::{WindowError, WindowResult};
use crate::common::decimal::ToDecimal;
use crate::config::WindowConfig;
use crate::internal_err;
use crate::window::frame::{FrameBounds, FrameResolver, WindowFrame};
use crate::window::functions::{
    Avg, Count, CumeDist, DenseRank, Lag, Lead, Max, Min, NTile, NthValue, PercentRank, Rank,
    RowNumber, Sum,
};
use crate::window::partition::Partitioner;
use crate::window::spec::{Comparator, WindowSpec};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, trace};

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowFunctionType {
    RowNumber,
    Rank,
    DenseRank,
    PercentRank,
    CumeDist,
    NTile,
    Lag,
    Lead,
    FirstValue,
    LastValue,
    NthValue,
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

impl WindowFunctionType {
    pub fn name(&self) -> &'static str {
        match self {
            WindowFunctionType::RowNumber => "ROW_NUMBER",
            WindowFunctionType::Rank => "RANK",
            WindowFunctionType::DenseRank => "DENSE_RANK",
            WindowFunctionType::PercentRank => "PERCENT_RANK",
            WindowFunctionType::CumeDist => "CUME_DIST",
            WindowFunctionType::NTile => "NTILE",
            WindowFunctionType::Lag => "LAG",
            WindowFunctionType::Lead => "LEAD",
            WindowFunctionType::FirstValue => "FIRST_VALUE",
            WindowFunctionType::LastValue => "LAST_VALUE",
            WindowFunctionType::NthValue => "NTH_VALUE",
            WindowFunctionType::Sum => "SUM",
            WindowFunctionType::Avg => "AVG",
            WindowFunctionType::Min => "MIN",
            WindowFunctionType::Max => "MAX",
            WindowFunctionType::Count => "COUNT",
        }
    }

    /// Whether the function yields one value per input row
    pub fn is_row_preserving(&self) -> bool {
        !matches!(self, WindowFunctionType::NTile)
    }
}

impl fmt::Display for WindowFunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One sorted partition as seen by a window function
pub struct Partition<'p, T> {
    pub rows: &'p [&'p T],
    pub frame: WindowFrame,
    pub comparator: Option<&'p Comparator<'p, T>>,
    pub config: &'p WindowConfig,
}

impl<'p, T> Partition<'p, T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn resolve(&self, row: usize) -> FrameBounds {
        FrameResolver::resolve(&self.frame, self.rows.len(), row)
    }

    pub fn is_all_rows(&self) -> bool {
        FrameResolver::is_all_rows(&self.frame)
    }

    pub fn comparator(&self, function: WindowFunctionType) -> WindowResult<&'p Comparator<'p, T>> {
        self.comparator.ok_or_else(|| missing_ordering(function))
    }
}

fn missing_ordering(function: WindowFunctionType) -> WindowError {
    WindowError::MissingOrdering(format!("{} requires an ORDER BY in the window", function))
}

/// A window function: turns one sorted partition into one value per row
pub trait WindowFunction<T>: Send + Sync {
    type Output: Send;

    fn function_type(&self) -> WindowFunctionType;

    /// Ranking functions cannot run without an ordering
    fn requires_ordering(&self) -> bool {
        false
    }

    /// Argument checks run once, before any partition is built
    fn validate(&self) -> WindowResult<()> {
        Ok(())
    }

    /// Values for `partition.rows`, in the same order
    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<Self::Output>>;
}

/// Window function evaluator
#[derive(Debug, Clone, Default)]
pub struct WindowEngine {
    config: WindowConfig,
}

impl WindowEngine {
    pub fn new(config: WindowConfig) -> WindowResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Evaluate `function` over `rows` windowed by `spec`.
    ///
    /// Returns one `(row, value)` pair per input row, grouped by partition.
    /// Any error aborts the whole evaluation.
    pub fn evaluate<'a, T, W>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        function: &W,
    ) -> WindowResult<Vec<(&'a T, W::Output)>>
    where
        T: Sync,
        W: WindowFunction<T>,
    {
        let function_type = function.function_type();
        function.validate()?;
        if function.requires_ordering() && !spec.has_ordering() {
            return Err(missing_ordering(function_type));
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let partitions = Partitioner::partition(rows, spec.partition_keys())?;
        let frame = spec.frame();
        let comparator = spec.comparator();
        debug!(
            function = %function_type,
            rows = rows.len(),
            partitions = partitions.len(),
            ?frame,
            "evaluating window function"
        );

        let per_partition = if self
            .config
            .parallel
            .should_parallelize(partitions.len(), rows.len())
        {
            partitions
                .into_par_iter()
                .map(|partition| self.evaluate_partition(partition, frame, comparator, function))
                .collect::<WindowResult<Vec<_>>>()?
        } else {
            partitions
                .into_iter()
                .map(|partition| self.evaluate_partition(partition, frame, comparator, function))
                .collect::<WindowResult<Vec<_>>>()?
        };

        Ok(per_partition.into_iter().flatten().collect())
    }

    fn evaluate_partition<'a, T, W>(
        &self,
        mut rows: Vec<&'a T>,
        frame: WindowFrame,
        comparator: Option<&Comparator<'_, T>>,
        function: &W,
    ) -> WindowResult<Vec<(&'a T, W::Output)>>
    where
        W: WindowFunction<T>,
    {
        if let Some(compare) = comparator {
            rows.sort_by(|a, b| compare(*a, *b));
        }
        trace!(function = %function.function_type(), rows = rows.len(), "partition");

        let values = function.evaluate(&Partition {
            rows: &rows,
            frame,
            comparator,
            config: &self.config,
        })?;

        let function_type = function.function_type();
        if function_type.is_row_preserving() && values.len() != rows.len() {
            return Err(internal_err!(
                "{} produced {} values for a partition of {} rows",
                function_type,
                values.len(),
                rows.len()
            ));
        }
        Ok(rows.into_iter().zip(values).collect())
    }

    pub fn row_number<'a, T: Sync>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
    ) -> WindowResult<Vec<(&'a T, usize)>> {
        self.evaluate(rows, spec, &RowNumber)
    }

    pub fn rank<'a, T: Sync>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
    ) -> WindowResult<Vec<(&'a T, usize)>> {
        self.evaluate(rows, spec, &Rank)
    }

    pub fn dense_rank<'a, T: Sync>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
    ) -> WindowResult<Vec<(&'a T, usize)>> {
        self.evaluate(rows, spec, &DenseRank)
    }

    pub fn percent_rank<'a, T: Sync>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
    ) -> WindowResult<Vec<(&'a T, Decimal)>> {
        self.evaluate(rows, spec, &PercentRank)
    }

    pub fn cume_dist<'a, T: Sync>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
    ) -> WindowResult<Vec<(&'a T, Decimal)>> {
        self.evaluate(rows, spec, &CumeDist)
    }

    /// NTILE is declared but not implemented: the result is always empty
    pub fn ntile<'a, T: Sync>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        buckets: i64,
    ) -> WindowResult<Vec<(&'a T, usize)>> {
        self.evaluate(rows, spec, &NTile::new(buckets))
    }

    pub fn lag<'a, T, V, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
        offset: i64,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Send,
        F: Fn(&T) -> V + Send + Sync,
    {
        self.evaluate(rows, spec, &Lag::new(field, offset))
    }

    /// LAG with a fallible field; the first failure aborts as an extraction error
    pub fn try_lag<'a, T, V, E, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
        offset: i64,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Send,
        E: fmt::Display,
        F: Fn(&T) -> Result<V, E> + Send + Sync,
    {
        self.evaluate(rows, spec, &Lag::try_new(field, offset))
    }

    pub fn lead<'a, T, V, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
        offset: i64,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Send,
        F: Fn(&T) -> V + Send + Sync,
    {
        self.evaluate(rows, spec, &Lead::new(field, offset))
    }

    pub fn try_lead<'a, T, V, E, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
        offset: i64,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Send,
        E: fmt::Display,
        F: Fn(&T) -> Result<V, E> + Send + Sync,
    {
        self.evaluate(rows, spec, &Lead::try_new(field, offset))
    }

    /// `n` is 1-based; `-1` selects the last row of the frame
    pub fn nth_value<'a, T, V, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
        n: i64,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Send,
        F: Fn(&T) -> V + Send + Sync,
    {
        self.evaluate(rows, spec, &NthValue::new(field, n))
    }

    pub fn try_nth_value<'a, T, V, E, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
        n: i64,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Send,
        E: fmt::Display,
        F: Fn(&T) -> Result<V, E> + Send + Sync,
    {
        self.evaluate(rows, spec, &NthValue::try_new(field, n))
    }

    pub fn first_value<'a, T, V, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Send,
        F: Fn(&T) -> V + Send + Sync,
    {
        self.evaluate(rows, spec, &NthValue::first(field))
    }

    pub fn last_value<'a, T, V, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Send,
        F: Fn(&T) -> V + Send + Sync,
    {
        self.evaluate(rows, spec, &NthValue::last(field))
    }

    pub fn sum<'a, T, N, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
    ) -> WindowResult<Vec<(&'a T, Decimal)>>
    where
        T: Sync,
        N: ToDecimal,
        F: Fn(&T) -> N + Send + Sync,
    {
        self.evaluate(rows, spec, &Sum::new(field))
    }

    pub fn try_sum<'a, T, N, E, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
    ) -> WindowResult<Vec<(&'a T, Decimal)>>
    where
        T: Sync,
        N: ToDecimal,
        E: fmt::Display,
        F: Fn(&T) -> Result<N, E> + Send + Sync,
    {
        self.evaluate(rows, spec, &Sum::try_new(field))
    }

    /// `None` for rows whose frame holds no partition rows
    pub fn avg<'a, T, N, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
    ) -> WindowResult<Vec<(&'a T, Option<Decimal>)>>
    where
        T: Sync,
        N: ToDecimal,
        F: Fn(&T) -> N + Send + Sync,
    {
        self.evaluate(rows, spec, &Avg::new(field))
    }

    pub fn try_avg<'a, T, N, E, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
    ) -> WindowResult<Vec<(&'a T, Option<Decimal>)>>
    where
        T: Sync,
        N: ToDecimal,
        E: fmt::Display,
        F: Fn(&T) -> Result<N, E> + Send + Sync,
    {
        self.evaluate(rows, spec, &Avg::try_new(field))
    }

    pub fn min<'a, T, V, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Ord + Clone + Send,
        F: Fn(&T) -> V + Send + Sync,
    {
        self.evaluate(rows, spec, &Min::new(field))
    }

    pub fn try_min<'a, T, V, E, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Ord + Clone + Send,
        E: fmt::Display,
        F: Fn(&T) -> Result<V, E> + Send + Sync,
    {
        self.evaluate(rows, spec, &Min::try_new(field))
    }

    pub fn max<'a, T, V, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Ord + Clone + Send,
        F: Fn(&T) -> V + Send + Sync,
    {
        self.evaluate(rows, spec, &Max::new(field))
    }

    pub fn try_max<'a, T, V, E, F>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
        field: F,
    ) -> WindowResult<Vec<(&'a T, Option<V>)>>
    where
        T: Sync,
        V: Ord + Clone + Send,
        E: fmt::Display,
        F: Fn(&T) -> Result<V, E> + Send + Sync,
    {
        self.evaluate(rows, spec, &Max::try_new(field))
    }

    pub fn count<'a, T: Sync>(
        &self,
        rows: &'a [T],
        spec: &WindowSpec<'_, T>,
    ) -> WindowResult<Vec<(&'a T, usize)>> {
        self.evaluate(rows, spec, &Count)
    }
}

/// Whether two adjacent sorted rows fall in the same tie-group
pub(crate) fn is_peer<T>(compare: &Comparator<'_, T>, a: &T, b: &T) -> bool {
    compare(a, b) == Ordering::Equal
}
