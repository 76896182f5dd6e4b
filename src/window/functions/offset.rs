//! Offset functions: LAG, LEAD, NTH_VALUE (and FIRST_VALUE / LAST_VALUE)
//!
//! A target row outside the partition, or outside the row's resolved frame,
//! yields `None`. Only target rows have their field extracted.

use crate::common::constants::NTH_VALUE_LAST;
use crate::common::error::{WindowError, WindowResult};
use crate::window::engine::{Partition, WindowFunction, WindowFunctionType};
use crate::window::functions::field::{Field, FieldExtractor, TryField};

fn check_offset(function: WindowFunctionType, offset: i64) -> WindowResult<()> {
    if offset <= 0 {
        return Err(WindowError::InvalidArgument(format!(
            "{} offset must be positive, got {}",
            function, offset
        )));
    }
    Ok(())
}

fn value_at<T, X>(
    partition: &Partition<'_, T>,
    field: &X,
    target: Option<i64>,
) -> WindowResult<Option<X::Value>>
where
    X: FieldExtractor<T>,
{
    target
        .map(|index| field.extract(partition.rows[index as usize]))
        .transpose()
}

/// LAG - value of the row `offset` rows before the current one
pub struct Lag<X> {
    field: X,
    offset: i64,
}

impl<F, V> Lag<Field<F, V>> {
    pub fn new(field: F, offset: i64) -> Self {
        Self {
            field: Field::new(field),
            offset,
        }
    }
}

impl<F, V, E> Lag<TryField<F, V, E>> {
    pub fn try_new(field: F, offset: i64) -> Self {
        Self {
            field: TryField::new(field),
            offset,
        }
    }
}

impl<T, X> WindowFunction<T> for Lag<X>
where
    X: FieldExtractor<T>,
    X::Value: Send,
{
    type Output = Option<X::Value>;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::Lag
    }

    fn validate(&self) -> WindowResult<()> {
        check_offset(WindowFunctionType::Lag, self.offset)
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<Self::Output>> {
        let mut result = Vec::with_capacity(partition.len());
        for row in 0..partition.len() {
            // offset > 0 and row >= 0, so this cannot overflow
            let target = row as i64 - self.offset;
            // the frame start clips before the partition start does
            let target = Some(target).filter(|&t| t >= 0 && t >= partition.resolve(row).start);
            result.push(value_at(partition, &self.field, target)?);
        }
        Ok(result)
    }
}

/// LEAD - value of the row `offset` rows after the current one
pub struct Lead<X> {
    field: X,
    offset: i64,
}

impl<F, V> Lead<Field<F, V>> {
    pub fn new(field: F, offset: i64) -> Self {
        Self {
            field: Field::new(field),
            offset,
        }
    }
}

impl<F, V, E> Lead<TryField<F, V, E>> {
    pub fn try_new(field: F, offset: i64) -> Self {
        Self {
            field: TryField::new(field),
            offset,
        }
    }
}

impl<T, X> WindowFunction<T> for Lead<X>
where
    X: FieldExtractor<T>,
    X::Value: Send,
{
    type Output = Option<X::Value>;

    fn function_type(&self) -> WindowFunctionType {
        WindowFunctionType::Lead
    }

    fn validate(&self) -> WindowResult<()> {
        check_offset(WindowFunctionType::Lead, self.offset)
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<Self::Output>> {
        let len = partition.len() as i64;
        let mut result = Vec::with_capacity(partition.len());
        for row in 0..partition.len() {
            let target = (row as i64)
                .checked_add(self.offset)
                .filter(|&t| t < len && t <= partition.resolve(row).end);
            result.push(value_at(partition, &self.field, target)?);
        }
        Ok(result)
    }
}

/// NTH_VALUE - value of the n-th row (1-based) of the frame; `n == -1`
/// selects the frame's last row
pub struct NthValue<X> {
    field: X,
    n: i64,
    function_type: WindowFunctionType,
}

impl<F, V> NthValue<Field<F, V>> {
    pub fn new(field: F, n: i64) -> Self {
        Self::with_type(Field::new(field), n, WindowFunctionType::NthValue)
    }

    /// FIRST_VALUE
    pub fn first(field: F) -> Self {
        Self::with_type(Field::new(field), 1, WindowFunctionType::FirstValue)
    }

    /// LAST_VALUE
    pub fn last(field: F) -> Self {
        Self::with_type(Field::new(field), NTH_VALUE_LAST, WindowFunctionType::LastValue)
    }
}

impl<F, V, E> NthValue<TryField<F, V, E>> {
    pub fn try_new(field: F, n: i64) -> Self {
        Self::with_type(TryField::new(field), n, WindowFunctionType::NthValue)
    }
}

impl<X> NthValue<X> {
    fn with_type(field: X, n: i64, function_type: WindowFunctionType) -> Self {
        Self {
            field,
            n,
            function_type,
        }
    }
}

impl<T, X> WindowFunction<T> for NthValue<X>
where
    X: FieldExtractor<T>,
    X::Value: Send,
{
    type Output = Option<X::Value>;

    fn function_type(&self) -> WindowFunctionType {
        self.function_type
    }

    fn validate(&self) -> WindowResult<()> {
        if self.n == NTH_VALUE_LAST || self.n > 0 {
            return Ok(());
        }
        Err(WindowError::InvalidArgument(format!(
            "{} position must be positive or {}, got {}",
            self.function_type, NTH_VALUE_LAST, self.n
        )))
    }

    fn evaluate(&self, partition: &Partition<'_, T>) -> WindowResult<Vec<Self::Output>> {
        let len = partition.len() as i64;
        let last = self.n == NTH_VALUE_LAST;

        // a position past the partition can never be inside any frame
        let partition_index = if last { len - 1 } else { self.n - 1 };
        if partition_index < 0 || partition_index >= len {
            return Ok((0..partition.len()).map(|_| None).collect());
        }

        let mut result = Vec::with_capacity(partition.len());
        for row in 0..partition.len() {
            let bounds = partition.resolve(row);
            let target = if last {
                Some(bounds.end)
            } else {
                bounds.start.checked_add(self.n - 1)
            };
            let target = target.filter(|&t| bounds.contains(t) && t >= 0 && t < len);
            result.push(value_at(partition, &self.field, target)?);
        }
        Ok(result)
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
        function.validate()?;
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

    #[test]
    fn test_lag() -> WindowResult<()> {
        let data = [10, 20, 30, 40, 50];
        let result = run(&Lag::new(value, 1), &data, WindowFrame::all_rows())?;
        assert_eq!(result, vec![None, Some(10), Some(20), Some(30), Some(40)]);

        let result = run(&Lag::new(value, 2), &data, WindowFrame::all_rows())?;
        assert_eq!(result, vec![None, None, Some(10), Some(20), Some(30)]);
        Ok(())
    }

    #[test]
    fn test_lag_clipped_by_frame_start() -> WindowResult<()> {
        let data = [10, 20, 30, 40, 50];
        let frame = WindowFrame::rows_between(FrameBound::preceding(1), FrameBound::CurrentRow);
        let result = run(&Lag::new(value, 2), &data, frame)?;
        assert!(result.iter().all(Option::is_none));

        let result = run(&Lag::new(value, 1), &data, frame)?;
        assert_eq!(result, vec![None, Some(10), Some(20), Some(30), Some(40)]);
        Ok(())
    }

    #[test]
    fn test_lead() -> WindowResult<()> {
        let data = [10, 20, 30, 40, 50];
        let result = run(&Lead::new(value, 1), &data, WindowFrame::all_rows())?;
        assert_eq!(result, vec![Some(20), Some(30), Some(40), Some(50), None]);

        let frame = WindowFrame::rows_between(FrameBound::CurrentRow, FrameBound::following(1));
        let result = run(&Lead::new(value, 2), &data, frame)?;
        assert!(result.iter().all(Option::is_none));
        Ok(())
    }

    #[test]
    fn test_non_positive_offset_rejected() {
        let err = run(&Lag::new(value, 0), &[1], WindowFrame::all_rows()).unwrap_err();
        assert!(matches!(err, WindowError::InvalidArgument(_)));
        let err = run(&Lead::new(value, -2), &[1], WindowFrame::all_rows()).unwrap_err();
        assert!(matches!(err, WindowError::InvalidArgument(_)));
        let err = run(&NthValue::new(value, 0), &[1], WindowFrame::all_rows()).unwrap_err();
        assert!(matches!(err, WindowError::InvalidArgument(_)));
    }

    #[test]
    fn test_largest_offsets_are_absent() -> WindowResult<()> {
        let data = [1, 2, 3];
        let lead = run(&Lead::new(value, i64::MAX), &data, WindowFrame::all_rows())?;
        assert_eq!(lead, vec![None, None, None]);

        let lag = run(&Lag::new(value, i64::MAX), &data, WindowFrame::all_rows())?;
        assert_eq!(lag, vec![None, None, None]);

        // the frame starts far beyond the partition
        let ahead = WindowFrame::rows_between(
            FrameBound::Following(usize::MAX),
            FrameBound::UnboundedFollowing,
        );
        let nth = run(&NthValue::new(value, 2), &data, ahead)?;
        assert_eq!(nth, vec![None, None, None]);
        Ok(())
    }

    #[test]
    fn test_fallible_field_aborts_only_on_visible_rows() -> WindowResult<()> {
        let data = [10, -1, 30];
        let checked = |v: &i32| {
            if *v < 0 {
                Err(format!("negative reading {}", v))
            } else {
                Ok(*v)
            }
        };

        // row 1 is never a target of LEAD(2), so its bad value is not read
        let lead = run(&Lead::try_new(checked, 2), &data, WindowFrame::all_rows())?;
        assert_eq!(lead, vec![Some(30), None, None]);

        let frame = WindowFrame::rows_between(FrameBound::CurrentRow, FrameBound::following(1));
        assert!(run(&Lead::try_new(checked, 2), &data, frame)?.iter().all(Option::is_none));

        let err = run(&Lag::try_new(checked, 1), &data, WindowFrame::all_rows()).unwrap_err();
        assert!(matches!(err, WindowError::Extraction(msg) if msg.contains("negative reading -1")));
        Ok(())
    }

    #[test]
    fn test_nth_value_running_frame() -> WindowResult<()> {
        let data = [10, 20, 30, 40];
        let second = run(&NthValue::new(value, 2), &data, WindowFrame::running())?;
        assert_eq!(second, vec![None, Some(20), Some(20), Some(20)]);

        let fifth = run(&NthValue::new(value, 5), &data, WindowFrame::running())?;
        assert!(fifth.iter().all(Option::is_none));
        Ok(())
    }

    #[test]
    fn test_nth_value_out_of_partition_frame_is_none() -> WindowResult<()> {
        let data = [10, 20, 30, 40];
        let frame = WindowFrame::rows_between(FrameBound::preceding(2), FrameBound::CurrentRow);
        // frame starts before the partition for the first two rows
        let first = run(&NthValue::first(value), &data, frame)?;
        assert_eq!(first, vec![None, None, Some(10), Some(20)]);
        Ok(())
    }

    #[test]
    fn test_first_and_last_value() -> WindowResult<()> {
        let data = [10, 20, 30, 40];
        let first = run(&NthValue::first(value), &data, WindowFrame::all_rows())?;
        assert_eq!(first, vec![Some(10); 4]);

        let last = run(&NthValue::last(value), &data, WindowFrame::running())?;
        assert_eq!(last, vec![Some(10), Some(20), Some(30), Some(40)]);

        let frame = WindowFrame::rows_between(FrameBound::CurrentRow, FrameBound::following(1));
        let last = run(&NthValue::last(value), &data, frame)?;
        assert_eq!(last, vec![Some(20), Some(30), Some(40), None]);
        Ok(())
    }
}
