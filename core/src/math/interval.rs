//! Monotonic search

use super::clamp::clamp;

/// Returns the largest index `i` in `[first, last)` for which `pred(i)` is
/// true, or `None` if there is no such index. `pred` must be monotonically
/// non-increasing over the range: once it turns false it stays false.
///
/// * `first` - First index of the range.
/// * `last`  - One past the last index of the range.
/// * `pred`  - Predicate evaluated at an index.
pub fn upper_bound<Predicate>(first: usize, last: usize, pred: Predicate) -> Option<usize>
where
    Predicate: Fn(usize) -> bool,
{
    let (mut lo, mut hi) = (first, last);

    while lo < hi {
        let middle = lo + (hi - lo) / 2;

        // Bisect range based on value of `pred` at `middle`.
        if pred(middle) {
            lo = middle + 1;
        } else {
            hi = middle;
        }
    }

    // `lo` is now the first index where `pred` is false.
    if lo > first {
        Some(lo - 1)
    } else {
        None
    }
}

/// Emulates the behavior of `upper_bound` but clamps the result so that it
/// can always be used as the start of an interval `[i, i + 1]` in an array of
/// `size` entries. If no index satisfies `pred` the result is 0; if all do the
/// result is `size - 2`.
///
/// * `size` - Size of array; must be at least 2.
/// * `pred` - Function that returns a value at a given index.
pub fn find_interval<Predicate>(size: usize, pred: Predicate) -> usize
where
    Predicate: Fn(usize) -> bool,
{
    debug_assert!(size >= 2, "find_interval needs at least one interval");

    upper_bound(0, size, pred).map_or(0, |i| clamp(i, 0, size - 2))
}
