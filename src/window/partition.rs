//! PARTITION BY
//!
//! Rows are split recursively, one key at a time: the first key groups the
//! input, every group is then split by the second key, and so on. Grouping is
//! stable, so rows keep their relative input order inside a partition.
//! Partitions come out in the order their key tuple is first seen.

use crate::common::error::{WindowError, WindowResult};
use ahash::AHashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// One level of partitioning: splits a group of rows by a single key
pub trait PartitionKey<T>: Send + Sync {
    fn group<'a>(&self, rows: Vec<&'a T>) -> WindowResult<Vec<Vec<&'a T>>>;
}

/// Partition key backed by a (possibly fallible) extractor function
pub struct KeyExtractor<F, K, E> {
    extract: F,
    _marker: PhantomData<fn() -> (K, E)>,
}

impl<F, K, E> KeyExtractor<F, K, E> {
    pub fn new(extract: F) -> Self {
        Self {
            extract,
            _marker: PhantomData,
        }
    }
}

impl<T, F, K, E> PartitionKey<T> for KeyExtractor<F, K, E>
where
    F: Fn(&T) -> Result<K, E> + Send + Sync,
    K: Hash + Eq,
    E: fmt::Display,
{
    fn group<'a>(&self, rows: Vec<&'a T>) -> WindowResult<Vec<Vec<&'a T>>> {
        let mut slots: AHashMap<K, usize> = AHashMap::new();
        let mut groups: Vec<Vec<&'a T>> = Vec::new();

        for row in rows {
            let key = (self.extract)(row).map_err(|e| {
                WindowError::Extraction(format!("partition key extraction failed: {}", e))
            })?;
            let slot = *slots.entry(key).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(row);
        }

        Ok(groups)
    }
}

/// Splits rows into partitions
pub struct Partitioner;

impl Partitioner {
    /// Group `rows` into leaf partitions by every key in `keys`.
    /// With no keys the whole input is a single partition.
    pub fn partition<'a, T>(
        rows: &'a [T],
        keys: &[Box<dyn PartitionKey<T> + '_>],
    ) -> WindowResult<Vec<Vec<&'a T>>> {
        let mut partitions = Vec::new();
        if rows.is_empty() {
            return Ok(partitions);
        }
        Self::split(rows.iter().collect(), keys, 0, &mut partitions)?;
        Ok(partitions)
    }

    fn split<'a, T>(
        rows: Vec<&'a T>,
        keys: &[Box<dyn PartitionKey<T> + '_>],
        depth: usize,
        partitions: &mut Vec<Vec<&'a T>>,
    ) -> WindowResult<()> {
        let Some(key) = keys.get(depth) else {
            partitions.push(rows);
            return Ok(());
        };
        for group in key.group(rows)? {
            Self::split(group, keys, depth + 1, partitions)?;
        }
        Ok(())
    }
}
