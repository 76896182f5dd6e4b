//! Frame aggregates: SUM, AVG, COUNT
//!
//! SUM and AVG keep a running decimal total while the frame slides down the
//! partition. For ROWS frames both clamped frame edges only ever move forward,
//! so every row is added once and removed at most once: O(N) per partition
//! regardless of frame width. A whole-partition frame is computed once and
//! broadcast.

use crate::common::decimal::{checked_add, checked_sub, divide, round, ToDecimal};
use crate::common::error::WindowResult;
use crate::window::engine::{Partition, WindowFunction, WindowFunctionType};
use crate::window::functions::field::{Field, FieldExtractor, TryField};
use rust_decimal::Decimal;

/// Running total and row count of one row's frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTotal {
    pub sum: Decimal,
    pub rows: usize,
}

/// Half-open `[lo, hi)` slice of the partition covered by `row`'s frame.
/// Empty frames collapse to `lo == hi`; both edges are monotone in `row`.
pub(crate) fn clamped_span<T>(partition: &Partition<'_, T>, row: usize) -> (usize, usize) {
    let len = partition.len() as i64;
    let bounds = partition.resolve(row);
    let lo = bounds.start.clamp(0, len);
    let hi = bounds.end.saturating_add(1).clamp(0, len).max(lo);
    (lo as usize, hi as usize)
}

fn field_values<T, X>(partition: &Partition<'_, T>, field: &X) -> WindowResult<Vec<Decimal>>
where
    X: FieldExtractor<T>,
    X::Value: ToDecimal,
{
    field
        .extract_all(partition.rows)?
        .iter()
        .map(ToDecimal::to_decimal)
        .collect()
}

/// Per-row frame totals computed with a sliding window
pub fn sliding_totals<T, X>(partition: &Partition<'_, T>, field: &X) -> WindowResult<Vec<FrameTotal>>
where
    X: FieldExtractor<T>,
    X::Value: ToDecimal,
{
    let values = field_values(partition, field)?;

    if partition.is_all_rows() {
        let mut sum = Decimal::ZERO;
        for value in &values {
            sum = checked_add(sum, *value)?;
        }
        let total = FrameTotal {
            sum,
            rows: values.len(),
        };
        return Ok(vec![total; values.len()]);
    }

    // rows [removed, added) are currently inside `sum`
    let mut sum = Decimal::ZERO;
    let mut added = 0;
    let mut removed = 0;
    let mut totals = Vec::with_capacity(values.len());
    for row in 0..values.len() {
        let (lo, hi) = clamped_span(partition, row);
        while added < hi {
            sum = checked_add(sum, values[added])?;
            added += 1;
        }
        while removed < lo {
            sum = checked_sub(sum, values[removed])?;
            removed += 1;
        }
        totals.push(FrameTotal {
            sum,
            rows: added - removed,
        });
    }
    Ok(totals)
}

/// SUM - frame total, rounded to the configured default scale
pub struct Sum<X> {
    field: X,
}

impl<F, N> Sum<Field<F, N>> {
    pub fn new(field: F) -> Self {
        Self {
            field: Field::new(field),
        }
    }
}

impl<F, N, E> Sum<TryField<F, N, E>> {
    pub fn try_new(field: F) -> Self {
        Self {
            field: TryField::new(field),
        }
    }
}

impl<T, X> WindowFunction<T> for Sum<X>
where
    X: FieldExtractor<T>,
    X::Value: ToDecimal,
{
    type Output = Decimal;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::Sum
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<Decimal>> {
        let config = partition.config;
        sliding_totals(partition, &self.field)?
            .into_iter()
            .map(|total| round(total.sum, config.default_scale, config.rounding))
            .collect()
    }
}

/// AVG - frame total divided by the number of partition rows in the frame.
/// `None` when the frame holds no partition rows.
pub struct Avg<X> {
    field: X,
}

impl<F, N> Avg<Field<F, N>> {
    pub fn new(field: F) -> Self {
        Self {
            field: Field::new(field),
        }
    }
}

impl<F, N, E> Avg<TryField<F, N, E>> {
    pub fn try_new(field: F) -> Self {
        Self {
            field: TryField::new(field),
        }
    }
}

impl<T, X> WindowFunction<T> for Avg<X>
where
    X: FieldExtractor<T>,
    X::Value: ToDecimal,
{
    type Output = Option<Decimal>;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::Avg
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<Option<Decimal>>> {
        let config = partition.config;
        sliding_totals(partition, &self.field)?
            .into_iter()
            .map(|total| {
                if total.rows == 0 {
                    return Ok(None);
                }
                divide(
                    total.sum,
                    Decimal::from(total.rows),
                    config.avg_scale,
                    config.rounding,
                )
                .map(Some)
            })
            .collect()
    }
}

/// COUNT - partition rows inside the frame, never negative
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

impl<T> WindowFunction<T> for Count {
    type Output = usize;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::Count
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<usize>> {
        let len = partition.len();
        if partition.is_all_rows() {
            return Ok(vec![len; len]);
        }
        Ok((0..len)
            .map(|row| partition.resolve(row).clamped_len(len))
            .collect())
    }
}
