//! Window specification: PARTITION BY / ORDER BY / ROWS BETWEEN
//!
//! ```
//! use prism_window::{FrameBound, WindowSpec};
//!
//! struct Sale { region: String, amount: i64 }
//!
//! let spec = WindowSpec::<Sale>::new()
//!     .partition_by(|s| s.region.clone())
//!     .order_by_key(|s| s.amount)
//!     .rows_between(FrameBound::preceding(1), FrameBound::CurrentRow);
//! assert_eq!(spec.partition_count(), 1);
//! ```

use crate::window::frame::{FrameBound, WindowFrame};
use crate::window::partition::{KeyExtractor, PartitionKey};
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Total order over records used for sorting partitions and detecting ties
pub type Comparator<'s, T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync + 's>;

/// Immutable description of how rows are grouped, ordered and framed.
///
/// `'s` bounds the extractor and comparator closures, so records that borrow
/// from a buffer (and closures that capture locals) can be windowed too.
pub struct WindowSpec<'s, T> {
    partition_keys: Vec<Box<dyn PartitionKey<T> + 's>>,
    comparator: Option<Comparator<'s, T>>,
    start_bound: Option<FrameBound>,
    end_bound: Option<FrameBound>,
}

impl<'s, T> WindowSpec<'s, T> {
    /// A window over the whole input, in input order
    pub fn new() -> Self {
        Self {
            partition_keys: Vec::new(),
            comparator: None,
            start_bound: None,
            end_bound: None,
        }
    }

    /// Add a partition key; keys nest in the order they are added
    pub fn partition_by<K, F>(self, extract: F) -> Self
    where
        K: Hash + Eq + 's,
        F: Fn(&T) -> K + Send + Sync + 's,
    {
        self.try_partition_by(move |row: &T| Ok::<K, Infallible>(extract(row)))
    }

    /// Add a partition key whose extractor can fail; a failure aborts the
    /// evaluation with an extraction error
    pub fn try_partition_by<K, E, F>(mut self, extract: F) -> Self
    where
        K: Hash + Eq + 's,
        E: fmt::Display + 's,
        F: Fn(&T) -> Result<K, E> + Send + Sync + 's,
    {
        self.partition_keys.push(Box::new(KeyExtractor::new(extract)));
        self
    }

    pub fn order_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 's,
    {
        self.comparator = Some(Arc::new(compare));
        self
    }

    /// Ascending order on an extracted key
    pub fn order_by_key<K, F>(self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 's,
    {
        self.order_by(move |a, b| key(a).cmp(&key(b)))
    }

    /// Descending order on an extracted key
    pub fn order_by_key_desc<K, F>(self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 's,
    {
        self.order_by(move |a, b| key(b).cmp(&key(a)))
    }

    /// Break ties of the current ordering with `compare`. Without a prior
    /// ordering this becomes the ordering.
    pub fn then_by<F>(mut self, compare: F) -> Self
    where
        T: 's,
        F: Fn(&T, &T) -> Ordering + Send + Sync + 's,
    {
        let combined: Comparator<'s, T> = match self.comparator.take() {
            Some(first) => Arc::new(move |a: &T, b: &T| first(a, b).then_with(|| compare(a, b))),
            None => Arc::new(compare),
        };
        self.comparator = Some(combined);
        self
    }

    pub fn rows_between(mut self, start: FrameBound, end: FrameBound) -> Self {
        self.start_bound = Some(start);
        self.end_bound = Some(end);
        self
    }

    pub fn start_bound(mut self, start: FrameBound) -> Self {
        self.start_bound = Some(start);
        self
    }

    pub fn end_bound(mut self, end: FrameBound) -> Self {
        self.end_bound = Some(end);
        self
    }

    /// The frame with unset bounds filled in as unbounded
    pub fn frame(&self) -> WindowFrame {
        WindowFrame {
            start: self.start_bound.unwrap_or(FrameBound::UnboundedPreceding),
            end: self.end_bound.unwrap_or(FrameBound::UnboundedFollowing),
        }
    }

    pub fn comparator(&self) -> Option<&Comparator<'s, T>> {
        self.comparator.as_ref()
    }

    pub fn has_ordering(&self) -> bool {
        self.comparator.is_some()
    }

    pub fn partition_keys(&self) -> &[Box<dyn PartitionKey<T> + 's>] {
        &self.partition_keys
    }

    pub fn partition_count(&self) -> usize {
        self.partition_keys.len()
    }
}

impl<T> Default for WindowSpec<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for WindowSpec<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowSpec")
            .field("partition_keys", &self.partition_keys.len())
            .field("ordered", &self.comparator.is_some())
            .field("frame", &self.frame())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_frame_is_all_rows() {
        let spec = WindowSpec::<i32>::new();
        assert!(spec.frame().is_all_rows());
        assert!(!spec.has_ordering());

        let half = WindowSpec::<i32>::new().end_bound(FrameBound::CurrentRow);
        assert_eq!(half.frame(), WindowFrame::running());
    }

    #[test]
    fn test_then_by_breaks_ties() {
        let spec = WindowSpec::<(i32, i32)>::new()
            .order_by_key(|r| r.0)
            .then_by(|a, b| b.1.cmp(&a.1));
        let cmp = spec.comparator().unwrap();
        assert_eq!(cmp(&(1, 5), &(2, 0)), Ordering::Less);
        assert_eq!(cmp(&(1, 5), &(1, 3)), Ordering::Less);
        assert_eq!(cmp(&(1, 3), &(1, 3)), Ordering::Equal);
    }

    #[test]
    fn test_order_by_key_desc() {
        let spec = WindowSpec::<i32>::new().order_by_key_desc(|v| *v);
        let cmp = spec.comparator().unwrap();
        assert_eq!(cmp(&1, &2), Ordering::Greater);
    }

    #[test]
    fn test_borrowed_records_and_captured_state() {
        struct Entry<'a> {
            name: &'a str,
            score: i32,
        }
        let buffer = String::from("ann bob ann");
        let entries: Vec<Entry<'_>> = buffer
            .split(' ')
            .zip([3, 1, 2])
            .map(|(name, score)| Entry { name, score })
            .collect();

        let bonus = vec![0, 10];
        let spec = WindowSpec::<Entry<'_>>::new()
            .partition_by(|e| e.name)
            .order_by_key(|e| e.score + bonus[(e.score % 2) as usize]);
        assert_eq!(spec.partition_count(), 1);

        let cmp = spec.comparator().unwrap();
        assert_eq!(cmp(&entries[0], &entries[2]), Ordering::Greater);
        assert_eq!(cmp(&entries[1], &entries[2]), Ordering::Greater);
    }

    #[test]
    fn test_debug_output() {
        let spec = WindowSpec::<i32>::new().partition_by(|v| v % 2);
        let text = format!("{:?}", spec);
        assert!(text.contains("partition_keys: 1"));
    }
}
