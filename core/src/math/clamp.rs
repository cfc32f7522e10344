//! Clamp

use super::common::*;

/// Clamps a value to the closed interval `[low, high]`.
///
/// * `val`  - The value to clamp.
/// * `low`  - Lower bound.
/// * `high` - Upper bound.
#[inline(always)]
pub fn clamp<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd,
{
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Maps a coordinate in `[0, 1)` to one of `n` equal-width bins. Values
/// outside that range (including NaN) land in the first or last bin.
///
/// * `x` - The coordinate.
/// * `n` - Number of bins; must be at least 1.
#[inline(always)]
pub fn bin_index(x: Float, n: usize) -> usize {
    debug_assert!(n > 0);

    // `as` saturates negative values and NaN to 0.
    clamp((x * n as Float) as usize, 0, n - 1)
}

/// Nudges a coordinate by whole ulps until `bin_index()` maps it to bin
/// `offset` of `n`. Rounding in `(offset + du) / n` can otherwise push a
/// coordinate onto a neighboring bin's edge.
///
/// * `x`      - The coordinate; must not be NaN.
/// * `offset` - The bin the coordinate must fall in; less than `n`.
/// * `n`      - Number of bins.
pub fn clamp_to_bin(x: Float, offset: usize, n: usize) -> Float {
    debug_assert!(!x.is_nan());
    debug_assert!(offset < n);

    let mut x = x;
    while bin_index(x, n) > offset {
        x = next_float_down(x);
    }
    while bin_index(x, n) < offset {
        x = next_float_up(x);
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clamp_passes_through_values_in_range() {
        assert_eq!(clamp(5, 0, 10), 5);
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
    }

    #[test]
    fn clamp_limits_values_out_of_range() {
        assert_eq!(clamp(-3, 0, 10), 0);
        assert_eq!(clamp(13, 0, 10), 10);
        assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
    }

    #[test]
    fn bin_index_handles_boundaries() {
        assert_eq!(bin_index(0.0, 4), 0);
        assert_eq!(bin_index(0.25, 4), 1);
        assert_eq!(bin_index(0.99999994, 4), 3);
        assert_eq!(bin_index(1.0, 4), 3);
        assert_eq!(bin_index(-0.5, 4), 0);
        assert_eq!(bin_index(f32::NAN, 4), 0);
    }

    #[test]
    fn clamp_to_bin_pulls_upper_edge_back_into_bin() {
        let x = clamp_to_bin(5.0 / 256.0, 4, 256);
        assert!(x < 5.0 / 256.0);
        assert_eq!(bin_index(x, 256), 4);
    }

    #[test]
    fn clamp_to_bin_pushes_values_below_lower_edge_into_bin() {
        let edge = 3.0 / 7.0;
        let x = clamp_to_bin(next_float_down(next_float_down(edge)), 3, 7);
        assert_eq!(bin_index(x, 7), 3);
    }

    #[test]
    fn clamp_to_bin_keeps_values_inside_bin() {
        assert_eq!(clamp_to_bin(0.3, 1, 4), 0.3);
        assert_eq!(clamp_to_bin(0.0, 0, 4), 0.0);
    }

    proptest! {
        #[test]
        fn clamp_to_bin_lands_in_requested_bin(n in 1usize..1024, k in 0usize..1024, du in 0.0f32..=1.0) {
            let offset = k % n;
            let x = clamp_to_bin((offset as Float + du) / n as Float, offset, n);
            prop_assert_eq!(bin_index(x, n), offset);
        }

        #[test]
        fn bin_index_is_always_in_range(x in -2.0f32..2.0f32, n in 1usize..512) {
            prop_assert!(bin_index(x, n) < n);
        }
    }
}
