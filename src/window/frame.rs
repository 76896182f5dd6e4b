//! Window frames
//!
//! A frame is the inclusive row range `[start, end]` a function sees for one
//! output row. Bounds resolve to raw row indices that may fall outside the
//! partition; each function decides whether an out-of-range bound means
//! "absent" or "clamp to the partition edge".

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// One end of a ROWS frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(usize),
    CurrentRow,
    Following(usize),
    UnboundedFollowing,
}

impl FrameBound {
    pub fn preceding(n: usize) -> Self {
        FrameBound::Preceding(n)
    }

    pub fn following(n: usize) -> Self {
        FrameBound::Following(n)
    }

    /// Resolve this bound for `row` in a partition of `partition_size` rows.
    /// Row-relative bounds are not clamped; offsets past `i64` saturate.
    pub fn resolve(&self, row: usize, partition_size: usize) -> i64 {
        let row = to_i64(row);
        match self {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::Preceding(n) => row.saturating_sub(to_i64(*n)),
            FrameBound::CurrentRow => row,
            FrameBound::Following(n) => row.saturating_add(to_i64(*n)),
            FrameBound::UnboundedFollowing => to_i64(partition_size) - 1,
        }
    }

    /// A fixed bound stays put while the current row advances
    pub fn is_fixed(&self) -> bool {
        matches!(
            self,
            FrameBound::UnboundedPreceding | FrameBound::UnboundedFollowing
        )
    }
}

/// ROWS BETWEEN `start` AND `end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowFrame {
    pub start: FrameBound,
    pub end: FrameBound,
}

impl WindowFrame {
    pub fn rows_between(start: FrameBound, end: FrameBound) -> Self {
        Self { start, end }
    }

    /// UNBOUNDED PRECEDING to UNBOUNDED FOLLOWING
    pub fn all_rows() -> Self {
        Self::rows_between(FrameBound::UnboundedPreceding, FrameBound::UnboundedFollowing)
    }

    /// UNBOUNDED PRECEDING to CURRENT ROW
    pub fn running() -> Self {
        Self::rows_between(FrameBound::UnboundedPreceding, FrameBound::CurrentRow)
    }

    pub fn is_all_rows(&self) -> bool {
        self.start == FrameBound::UnboundedPreceding && self.end == FrameBound::UnboundedFollowing
    }
}

impl Default for WindowFrame {
    fn default() -> Self {
        Self::all_rows()
    }
}

/// Resolved frame boundaries for a specific row (inclusive, unclamped)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBounds {
    pub start: i64,
    pub end: i64,
}

impl FrameBounds {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Closed-interval membership against the unclamped bounds
    pub fn contains(&self, index: i64) -> bool {
        index >= self.start && index <= self.end
    }

    /// The part of the frame that lies inside a partition of `partition_size`
    /// rows, or `None` when the two do not overlap.
    pub fn clamp(&self, partition_size: usize) -> Option<(usize, usize)> {
        if partition_size == 0 {
            return None;
        }
        let start = self.start.max(0);
        let end = self.end.min(partition_size as i64 - 1);
        if start > end {
            None
        } else {
            Some((start as usize, end as usize))
        }
    }

    /// Whether the frame selects no rows at all, regardless of partition
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of partition rows inside the frame
    pub fn clamped_len(&self, partition_size: usize) -> usize {
        self.clamp(partition_size)
            .map_or(0, |(start, end)| end - start + 1)
    }
}

/// Computes frame bounds for rows of a partition
pub struct FrameResolver;

impl FrameResolver {
    pub fn resolve(frame: &WindowFrame, partition_size: usize, row: usize) -> FrameBounds {
        FrameBounds {
            start: frame.start.resolve(row, partition_size),
            end: frame.end.resolve(row, partition_size),
        }
    }

    /// True iff the frame covers the whole partition for every row
    pub fn is_all_rows(frame: &WindowFrame) -> bool {
        frame.is_all_rows()
    }
}
