//! Per-row value extraction
//!
//! Value functions read one field of every row through a [`FieldExtractor`].
//! [`Field`] wraps a plain closure; [`TryField`] wraps a fallible one whose
//! errors abort the evaluation as [`WindowError::Extraction`].

use crate::common::error::{WindowError, WindowResult};
use std::fmt;
use std::marker::PhantomData;

pub trait FieldExtractor<T>: Send + Sync {
    type Value;

    fn extract(&self, row: &T) -> WindowResult<Self::Value>;

    /// Extract the field of every row, stopping at the first failure
    fn extract_all(&self, rows: &[&T]) -> WindowResult<Vec<Self::Value>> {
        rows.iter().map(|row| self.extract(*row)).collect()
    }
}

/// Infallible extractor
pub struct Field<F, V> {
    extract: F,
    _marker: PhantomData<fn() -> V>,
}

impl<F, V> Field<F, V> {
    pub fn new(extract: F) -> Self {
        Self {
            extract,
            _marker: PhantomData,
        }
    }
}

impl<T, V, F> FieldExtractor<T> for Field<F, V>
where
    F: Fn(&T) -> V + Send + Sync,
{
    type Value = V;

    fn extract(&self, row: &T) -> WindowResult<V> {
        Ok((self.extract)(row))
    }
}

/// Fallible extractor
pub struct TryField<F, V, E> {
    extract: F,
    _marker: PhantomData<fn() -> (V, E)>,
}

impl<F, V, E> TryField<F, V, E> {
    pub fn new(extract: F) -> Self {
        Self {
            extract,
            _marker: PhantomData,
        }
    }
}

impl<T, V, E, F> FieldExtractor<T> for TryField<F, V, E>
where
    F: Fn(&T) -> Result<V, E> + Send + Sync,
    E: fmt::Display,
{
    type Value = V;

    fn extract(&self, row: &T) -> WindowResult<V> {
        (self.extract)(row)
            .map_err(|e| WindowError::Extraction(format!("field extraction failed: {}", e)))
    }
}
