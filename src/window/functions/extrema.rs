//! MIN / MAX over a sliding frame
//!
//! Both use a monotonic deque of row indices: the front is always the
//! extreme of the current frame, and a row is dropped from the back as soon
//! as a newer row is at least as extreme (ties keep the rightmost index).
//! Because clamped ROWS frame edges never move backwards, each row is pushed
//! and popped at most once, so the frame width may vary from row to row.

use crate::common::error::WindowResult;
use crate::window::engine::{Partition, WindowFunction, WindowFunctionType};
use crate::window::functions::aggregate::clamped_span;
use crate::window::functions::field::{Field, FieldExtractor, TryField};
use std::cmp::Ordering;
use std::collections::VecDeque;

fn sliding_extreme<T, X>(
    partition: &Partition<'_, T>,
    field: &X,
    keep: Ordering,
) -> WindowResult<Vec<Option<X::Value>>>
where
    X: FieldExtractor<T>,
    X::Value: Ord + Clone,
{
    let values = field.extract_all(partition.rows)?;

    if partition.is_all_rows() {
        let extreme = values
            .iter()
            .reduce(|best, v| if v.cmp(best) == keep { v } else { best })
            .cloned();
        return Ok(vec![extreme; values.len()]);
    }

    let mut deque: VecDeque<usize> = VecDeque::new();
    let mut pushed = 0;
    let mut result = Vec::with_capacity(values.len());
    for row in 0..values.len() {
        let (lo, hi) = clamped_span(partition, row);
        while pushed < hi {
            while let Some(&back) = deque.back() {
                if values[pushed].cmp(&values[back]) == keep.reverse() {
                    break;
                }
                deque.pop_back();
            }
            deque.push_back(pushed);
            pushed += 1;
        }
        while deque.front().is_some_and(|&front| front < lo) {
            deque.pop_front();
        }
        let extreme = if lo < hi {
            deque.front().map(|&index| values[index].clone())
        } else {
            None
        };
        result.push(extreme);
    }
    Ok(result)
}

/// MAX - largest value in the frame, `None` for an empty frame
pub struct Max<X> {
    field: X,
}

impl<F, V> Max<Field<F, V>> {
    pub fn new(field: F) -> Self {
        Self {
            field: Field::new(field),
        }
    }
}

impl<F, V, E> Max<TryField<F, V, E>> {
    pub fn try_new(field: F) -> Self {
        Self {
            field: TryField::new(field),
        }
    }
}

impl<T, X> WindowFunction<T> for Max<X>
where
    X: FieldExtractor<T>,
    X::Value: Ord + Clone + Send,
{
    type Output = Option<X::Value>;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::Max
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<Self::Output>> {
        sliding_extreme(partition, &self.field, Ordering::Greater)
    }
}

/// MIN - smallest value in the frame, `None` for an empty frame
pub struct Min<X> {
    field: X,
}

impl<F, V> Min<Field<F, V>> {
    pub fn new(field: F) -> Self {
        Self {
            field: Field::new(field),
        }
    }
}

impl<F, V, E> Min<TryField<F, V, E>> {
    pub fn try_new(field: F) -> Self {
        Self {
            field: TryField::new(field),
        }
    }
}

impl<T, X> WindowFunction<T> for Min<X>
where
    X: FieldExtractor<T>,
    X::Value: Ord + Clone + Send,
{
    type Output = Option<X::Value>;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::Min
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<Self::Output>> {
        sliding_extreme(partition, &self.field, Ordering::Less)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowConfig;
    use crate::window::frame::{FrameBound, WindowFrame};

    fn run<W: WindowFunction<i32>>(
        function: &W,
        values: &[i32],
        frame: WindowFrame,
    ) -> WindowResult<Vec<W::Output>> {
        let rows: Vec<&i32> = values.iter().collect();
        let config = WindowConfig::sequential();
        function.evaluate(&Partition {
            rows: &rows,
            frame,
            comparator: None,
            config: &config,
        })
    }

    fn value(v: &i32) -> i32 {
        *v
    }

    fn some(values: &[i32]) -> Vec<Option<i32>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_max_centered_width_three() -> WindowResult<()> {
        let frame = WindowFrame::rows_between(FrameBound::preceding(1), FrameBound::following(1));
        let result = run(&Max::new(value), &[1, 5, 2, 8, 3], frame)?;
        assert_eq!(result, some(&[5, 5, 8, 8, 8]));
        Ok(())
    }

    #[test]
    fn test_min_centered_width_three() -> WindowResult<()> {
        let frame = WindowFrame::rows_between(FrameBound::preceding(1), FrameBound::following(1));
        let result = run(&Min::new(value), &[1, 5, 2, 8, 3], frame)?;
        assert_eq!(result, some(&[1, 1, 2, 2, 3]));
        Ok(())
    }

    #[test]
    fn test_running_min_max() -> WindowResult<()> {
        let data = [40, 20, 30, 10];
        let min = run(&Min::new(value), &data, WindowFrame::running())?;
        assert_eq!(min, some(&[40, 20, 20, 10]));

        let max = run(&Max::new(value), &data, WindowFrame::running())?;
        assert_eq!(max, some(&[40, 40, 40, 40]));
        Ok(())
    }

    #[test]
    fn test_growing_then_shrinking_frame() -> WindowResult<()> {
        // fixed end with a sliding start: the frame narrows every row
        let frame =
            WindowFrame::rows_between(FrameBound::CurrentRow, FrameBound::UnboundedFollowing);
        let result = run(&Max::new(value), &[9, 1, 7, 3, 2], frame)?;
        assert_eq!(result, some(&[9, 7, 7, 3, 2]));
        Ok(())
    }

    #[test]
    fn test_whole_partition_broadcast_and_empty_frames() -> WindowResult<()> {
        let result = run(&Max::new(value), &[3, 9, 4], WindowFrame::all_rows())?;
        assert_eq!(result, some(&[9, 9, 9]));

        let ahead = WindowFrame::rows_between(FrameBound::following(2), FrameBound::following(2));
        let result = run(&Min::new(value), &[3, 9, 4], ahead)?;
        assert_eq!(result, vec![Some(4), None, None]);
        Ok(())
    }

    #[test]
    fn test_fallible_field_error_aborts() {
        let frame = WindowFrame::rows_between(FrameBound::preceding(1), FrameBound::CurrentRow);
        let bounded = |v: &i32| {
            if *v > 100 {
                Err(format!("reading {} out of range", v))
            } else {
                Ok(*v)
            }
        };
        let err = run(&Max::try_new(bounded), &[1, 500, 2], frame).unwrap_err();
        assert!(matches!(err, crate::WindowError::Extraction(msg) if msg.contains("reading 500")));

        let ok = run(&Min::try_new(bounded), &[4, 2, 9], frame);
        assert_eq!(ok, Ok(some(&[4, 2, 2])));
    }

    #[test]
    fn test_ties_keep_rightmost() -> WindowResult<()> {
        let data = [(1, 'a'), (5, 'b'), (5, 'c'), (2, 'd')];
        let rows: Vec<&(i32, char)> = data.iter().collect();
        let config = WindowConfig::sequential();
        let frame = WindowFrame::rows_between(FrameBound::preceding(2), FrameBound::CurrentRow);
        // compare on the number only, report which row won
        let max = Max::new(|r: &(i32, char)| Tagged(r.0, r.1));
        let result = max.evaluate(&Partition {
            rows: &rows,
            frame,
            comparator: None,
            config: &config,
        })?;
        let winners: Vec<char> = result.iter().flatten().map(|t| t.1).collect();
        assert_eq!(winners, vec!['a', 'b', 'c', 'c']);
        Ok(())
    }

    #[derive(Debug, Clone)]
    struct Tagged(i32, char);

    impl PartialEq for Tagged {
        fn eq(&self, other: &Self) -> bool {
            self.0 == other.0
        }
    }
    impl Eq for Tagged {}
    impl PartialOrd for Tagged {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for Tagged {
        fn cmp(&self, other: &Self) -> Ordering {
            self.0.cmp(&other.0)
        }
    }
}
