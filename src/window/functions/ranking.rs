//! Ranking functions: ROW_NUMBER, RANK, DENSE_RANK, PERCENT_RANK, CUME_DIST, NTILE
//!
//! All of them work on a partition already sorted by the window ordering.
//! Adjacent rows that compare equal form a tie-group and share a rank.

use crate::common::decimal::{ratio, RoundingMode};
use crate::common::error::{WindowError, WindowResult};
use crate::window::engine::{is_peer, Partition, WindowFunction, WindowFunctionType};
use crate::window::spec::Comparator;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tracing::warn;

/// How ranks advance when a new tie-group starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMode {
    /// Jump to the 1-based position of the group's first row (gaps)
    Gapped,
    /// Advance by exactly one (no gaps)
    Dense,
}

/// Rank the sorted `rows`, stopping before the first row whose rank would
/// exceed `limit`. Window functions pass the partition size as `limit`.
pub fn rank_sorted<T>(
    rows: &[&T],
    compare: &Comparator<'_, T>,
    mode: RankMode,
    limit: usize,
) -> Vec<usize> {
    let mut ranks = Vec::with_capacity(rows.len());
    if rows.is_empty() || limit == 0 {
        return ranks;
    }

    let mut rank = 1;
    ranks.push(rank);
    for i in 1..rows.len() {
        if !is_peer(compare, rows[i - 1], rows[i]) {
            rank = match mode {
                RankMode::Gapped => i + 1,
                RankMode::Dense => rank + 1,
            };
        }
        if rank > limit {
            break;
        }
        ranks.push(rank);
    }
    ranks
}

/// ROW_NUMBER - sequential integers from 1, ties broken by input order
#[derive(Debug, Clone, Copy, Default)]
pub struct RowNumber;

impl<T> WindowFunction<T> for RowNumber {
    type Output = usize;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::RowNumber
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<usize>> {
        Ok((1..=partition.len()).collect())
    }
}

/// RANK - tied rows share a rank, the next group skips ahead
#[derive(Debug, Clone, Copy, Default)]
pub struct Rank;

impl<T> WindowFunction<T> for Rank {
    type Output = usize;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::Rank
    }

    fn requires_ordering(&self) -> bool {
        true
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<usize>> {
        let compare = partition.comparator(WindowFunctionType::Rank)?;
        Ok(rank_sorted(partition.rows, compare, RankMode::Gapped, partition.len()))
    }
}

/// DENSE_RANK - like RANK without gaps
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseRank;

impl<T> WindowFunction<T> for DenseRank {
    type Output = usize;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::DenseRank
    }

    fn requires_ordering(&self) -> bool {
        true
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<usize>> {
        let compare = partition.comparator(WindowFunctionType::DenseRank)?;
        Ok(rank_sorted(partition.rows, compare, RankMode::Dense, partition.len()))
    }
}

/// PERCENT_RANK - `(rank - 1) / (rows - 1)`; a single-row partition yields 0
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentRank;

impl<T> WindowFunction<T> for PercentRank {
    type Output = Decimal;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::PercentRank
    }

    fn requires_ordering(&self) -> bool {
        true
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<Decimal>> {
        let compare = partition.comparator(WindowFunctionType::PercentRank)?;
        let scale = partition.config.distribution_scale;
        let rounding = partition.config.rounding;
        let rows = partition.len();

        if rows == 1 {
            return Ok(vec![zero(scale, rounding)?]);
        }
        rank_sorted(partition.rows, compare, RankMode::Gapped, rows)
            .into_iter()
            .map(|rank| ratio(rank - 1, rows - 1, scale, rounding))
            .collect()
    }
}

fn zero(scale: u32, rounding: RoundingMode) -> WindowResult<Decimal> {
    ratio(0, 1, scale, rounding)
}

/// CUME_DIST - share of partition rows ordered at or before the row's tie-group
#[derive(Debug, Clone, Copy, Default)]
pub struct CumeDist;

impl<T> WindowFunction<T> for CumeDist {
    type Output = Decimal;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::CumeDist
    }

    fn requires_ordering(&self) -> bool {
        true
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<Decimal>> {
        let compare = partition.comparator(WindowFunctionType::CumeDist)?;
        let scale = partition.config.distribution_scale;
        let rounding = partition.config.rounding;
        let rows = partition.rows;

        let mut result = Vec::with_capacity(rows.len());
        let mut group_start = 0;
        while group_start < rows.len() {
            let mut group_end = group_start;
            while group_end + 1 < rows.len() && is_peer(compare, rows[group_end], rows[group_end + 1]) {
                group_end += 1;
            }
            let value = ratio(group_end + 1, rows.len(), scale, rounding)?;
            result.extend(std::iter::repeat(value).take(group_end - group_start + 1));
            group_start = group_end + 1;
        }
        Ok(result)
    }
}

/// NTILE - declared, not implemented; every partition yields no values
#[derive(Debug, Clone, Copy)]
pub struct NTile {
    buckets: i64,
}

impl NTile {
    pub fn new(buckets: i64) -> Self {
        Self { buckets }
    }
}

impl<T> WindowFunction<T> for NTile {
    type Output = usize;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::NTile
    }

    fn validate(&self) -> WindowResult<()> {
        if self.buckets <= 0 {
            return Err(WindowError::InvalidArgument(format!(
                "NTILE buckets must be positive, got {}",
                self.buckets
            )));
        }
        warn!(buckets = self.buckets, "NTILE is not implemented; returning no rows");
        Ok(())
    }

    fn evaluate(&self, _partition: &Partition<'_, T>) -> WindowResult<Vec<usize>> {
        Ok(Vec::new())
    }
}

/// Sort `rows` by `compare` and dense-rank them, keeping only rows ranked
/// within the first `n` tie-groups
pub fn rank_same_asc<'a, T, F>(rows: &'a [T], compare: F, n: i64) -> WindowResult<Vec<(&'a T, usize)>>
where
    F: Fn(&T, &T) -> Ordering + Send + Sync,
{
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    if n <= 0 {
        return Err(WindowError::InvalidArgument(format!(
            "first N should be greater than zero, got {}",
            n
        )));
    }

    let compare: Comparator<'_, T> = std::sync::Arc::new(compare);
    let mut sorted: Vec<&'a T> = rows.iter().collect();
    sorted.sort_by(|a, b| compare(*a, *b));
    let ranks = rank_sorted(&sorted, &compare, RankMode::Dense, n as usize);
    Ok(sorted.into_iter().zip(ranks).collect())
}

/// The rows belonging to the top `n` tie-groups under `compare`
pub fn cut_first_rank<'a, T, F>(rows: &'a [T], compare: F, n: i64) -> WindowResult<Vec<&'a T>>
where
    F: Fn(&T, &T) -> Ordering + Send + Sync,
{
    Ok(rank_same_asc(rows, compare, n)?
        .into_iter()
        .map(|(row, _)| row)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowConfig;
    use crate::window::frame::WindowFrame;
    use std::sync::Arc;

    fn by_value() -> Comparator<'static, i32> {
        Arc::new(|a: &i32, b: &i32| a.cmp(b))
    }

    fn run<W: WindowFunction<i32>>(function: &W, values: &[i32]) -> WindowResult<Vec<W::Output>> {
        let rows: Vec<&i32> = values.iter().collect();
        let compare = by_value();
        let config = WindowConfig::sequential();
        function.evaluate(&Partition {
            rows: &rows,
            frame: WindowFrame::all_rows(),
            comparator: Some(&compare),
            config: &config,
        })
    }

    fn decimals(values: &[Decimal]) -> Vec<String> {
        values.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_row_number() -> WindowResult<()> {
        assert_eq!(run(&RowNumber, &[10, 20, 20, 40])?, vec![1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn test_rank() -> WindowResult<()> {
        let result = run(&Rank, &[10, 20, 20, 30, 30, 30, 40])?;
        assert_eq!(result, vec![1, 2, 2, 4, 4, 4, 7]);
        Ok(())
    }

    #[test]
    fn test_dense_rank() -> WindowResult<()> {
        let result = run(&DenseRank, &[10, 20, 20, 30, 30, 30, 40])?;
        assert_eq!(result, vec![1, 2, 2, 3, 3, 3, 4]);
        Ok(())
    }

    #[test]
    fn test_percent_rank() -> WindowResult<()> {
        let result = run(&PercentRank, &[10, 20, 20, 30])?;
        assert_eq!(decimals(&result), vec!["0.00", "0.33", "0.33", "1.00"]);

        let single = run(&PercentRank, &[5])?;
        assert_eq!(decimals(&single), vec!["0.00"]);
        Ok(())
    }

    #[test]
    fn test_cume_dist() -> WindowResult<()> {
        let distinct = run(&CumeDist, &[10, 20, 30, 40])?;
        assert_eq!(decimals(&distinct), vec!["0.25", "0.50", "0.75", "1.00"]);

        // every row of a tie-group gets the position of the group's last row
        let tied = run(&CumeDist, &[10, 10, 20, 30, 30, 30])?;
        assert_eq!(
            decimals(&tied),
            vec!["0.33", "0.33", "0.50", "1.00", "1.00", "1.00"]
        );
        Ok(())
    }

    #[test]
    fn test_ntile_is_empty() -> WindowResult<()> {
        assert!(run(&NTile::new(3), &[1, 2, 3, 4])?.is_empty());
        assert!(matches!(
            WindowFunction::<i32>::validate(&NTile::new(0)),
            Err(WindowError::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn test_rank_limit_stops_early() {
        let values = [1, 1, 2, 3, 3, 4];
        let rows: Vec<&i32> = values.iter().collect();
        let compare = by_value();
        assert_eq!(rank_sorted(&rows, &compare, RankMode::Dense, 2), vec![1, 1, 2]);
        assert_eq!(rank_sorted(&rows, &compare, RankMode::Gapped, 3), vec![1, 1, 3]);
        assert!(rank_sorted(&rows, &compare, RankMode::Dense, 0).is_empty());
    }

    #[test]
    fn test_rank_same_asc_and_cut_first_rank() -> WindowResult<()> {
        let values = vec![30, 10, 20, 10, 40, 20];
        let ranked = rank_same_asc(&values, |a: &i32, b: &i32| a.cmp(b), 2)?;
        let pairs: Vec<(i32, usize)> = ranked.iter().map(|(v, r)| (**v, *r)).collect();
        assert_eq!(pairs, vec![(10, 1), (10, 1), (20, 2), (20, 2)]);

        let top = cut_first_rank(&values, |a: &i32, b: &i32| b.cmp(a), 1)?;
        assert_eq!(top, vec![&40]);

        let err = rank_same_asc(&values, |a: &i32, b: &i32| a.cmp(b), 0).unwrap_err();
        assert!(matches!(err, WindowError::InvalidArgument(_)));
        Ok(())
    }
}
