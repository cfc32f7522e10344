//! 1D Distribution.

use super::error::*;
use crate::math::*;
use allocator_api2::alloc::{Allocator, Global};

/// Buffer of function or CDF values owned by a distribution.
pub(crate) type Buffer<A> = allocator_api2::vec::Vec<Float, A>;

/// Represents a piecewise-constant 1D function’s PDF and CDF and provides methods to perform this sampling efficiently.
///
/// The function is defined over `n` equal-width bins covering [0, 1). The
/// buffers are allocated with `A`, which defaults to the global heap; pass an
/// arena such as `&bumpalo::Bump` to `new_in()` to place them there instead.
#[derive(Clone, Debug)]
pub struct Distribution1D<A: Allocator = Global> {
    /// Piecewise-constant function.
    func: Buffer<A>,

    /// CDF for `func`. Has `func.len() + 1` entries starting at 0 and ending at 1.
    cdf: Buffer<A>,

    /// Integral of `func` over [0, 1), i.e. the mean of the function values.
    /// Zero if the function is zero everywhere.
    func_int: Float,
}

impl Distribution1D {
    /// Returns a new `Distribution1D` for given piecewise-constant function.
    ///
    /// * `f` - Piecewise-constant 1D function. Must contain at least one value
    ///         and all values must be finite and non-negative.
    pub fn new(f: &[Float]) -> Result<Self, DistributionError> {
        Self::new_in(f, Global)
    }
}

impl<A: Allocator + Clone> Distribution1D<A> {
    /// Returns a new `Distribution1D` for given piecewise-constant function
    /// with its buffers allocated by `alloc`.
    ///
    /// * `f`     - Piecewise-constant 1D function.
    /// * `alloc` - Allocator for the function and CDF buffers.
    pub fn new_in(f: &[Float], alloc: A) -> Result<Self, DistributionError> {
        validate_weights(f)?;

        let n = f.len();

        let mut func = Buffer::with_capacity_in(n, alloc.clone());
        func.extend_from_slice(f);

        // Compute integral of step function at `x_i`.
        let mut cdf = Buffer::with_capacity_in(n + 1, alloc);
        cdf.push(0.0);
        for i in 1..n + 1 {
            let c = cdf[i - 1] + f[i - 1] / n as Float;
            cdf.push(c);
        }

        let func_int = cdf[n];
        if !func_int.is_finite() {
            return Err(DistributionError::InvalidArgument(format!(
                "integral of function with {n} values overflows"
            )));
        }

        // Transform step function integral into CDF.
        if func_int == 0.0 {
            debug!("Function is zero over all {n} bins; sampling it uniformly");
            for (i, v) in cdf.iter_mut().enumerate().skip(1) {
                *v = i as Float / n as Float;
            }
        } else {
            for v in cdf.iter_mut().skip(1) {
                *v /= func_int;
            }

            // Everything past the last non-zero bin must be exactly 1 so that
            // draws in [0, 1) never land in a trailing zero-valued bin.
            if let Some(last) = f.iter().rposition(|&w| w > 0.0) {
                for v in cdf.iter_mut().skip(last + 1) {
                    *v = 1.0;
                }
            }
        }

        debug!("Built 1D distribution with {n} bins, integral = {func_int}");

        Ok(Self { func, cdf, func_int })
    }

    /// Returns the number of sample points for the piecewise-constant function.
    pub fn count(&self) -> usize {
        self.func.len()
    }

    /// Returns the integral of the piecewise-constant function over [0, 1).
    pub fn integral(&self) -> Float {
        self.func_int
    }

    /// Returns the piecewise-constant function values.
    pub fn func(&self) -> &[Float] {
        &self.func
    }

    /// Returns the CDF.
    pub fn cdf(&self) -> &[Float] {
        &self.cdf
    }

    /// Returns true if the function is zero everywhere and is sampled uniformly.
    pub fn is_uniform_fallback(&self) -> bool {
        self.func_int == 0.0
    }

    /// Return a sample in [0, 1), PDF and offset from the distribution given a random sample.
    ///
    /// The PDF is a density with respect to [0, 1), not a per-bin probability.
    ///
    /// * `u` - The random sample in [0, 1).
    pub fn sample_continuous(&self, u: Float) -> (Float, Float, usize) {
        // Find surrounding CDF segments and `offset`.
        let offset = self.find_bin(u);

        // Compute offset along CDF segment.
        let du = self.remap(u, offset);
        debug_assert!(!du.is_nan());

        // Return `x` in [0,1) corresponding to sample, PDF and offset. `x`
        // must stay inside bin `offset` so that `pdf_continuous(x)` agrees.
        let n = self.count();
        let x = min((offset as Float + du) / n as Float, ONE_MINUS_EPSILON);
        (clamp_to_bin(x, offset, n), self.density(offset), offset)
    }

    /// Return a sample and its probability from the discrete distribution given a random sample.
    ///
    /// * `u` - The random sample in [0, 1).
    pub fn sample_discrete(&self, u: Float) -> (usize, Float) {
        let offset = self.find_bin(u);
        (offset, self.pdf_discrete(offset))
    }

    /// Return a sample from the discrete distribution, its probability and
    /// the random sample remapped to [0, 1) within the selected bin so that
    /// it can be reused for further sampling decisions.
    ///
    /// * `u` - The random sample in [0, 1).
    pub fn sample_discrete_remapped(&self, u: Float) -> (usize, Float, Float) {
        let offset = self.find_bin(u);
        let u_remapped = min(self.remap(u, offset), ONE_MINUS_EPSILON);
        (offset, self.pdf_discrete(offset), u_remapped)
    }

    /// Return the PDF for sampling a given value from the discrete PDF.
    ///
    /// * `index` - Sample index.
    pub fn pdf_discrete(&self, index: usize) -> Float {
        assert!(index < self.count());
        self.density(index) / self.count() as Float
    }

    /// Return the PDF for sampling a given value in [0, 1) from the continuous
    /// distribution.
    ///
    /// * `x` - Sample value.
    pub fn pdf_continuous(&self, x: Float) -> Float {
        self.density(bin_index(x, self.count()))
    }

    /// Returns the bin whose CDF segment contains `u`. Always a valid bin
    /// index even for `u` outside [0, 1).
    ///
    /// * `u` - The random sample.
    fn find_bin(&self, u: Float) -> usize {
        find_interval(self.cdf.len(), |index| self.cdf[index] <= u)
    }

    /// Returns the position of `u` within the CDF segment of bin `offset` in
    /// [0, 1]. Zero-width segments map to 0.
    ///
    /// * `u`      - The random sample.
    /// * `offset` - The bin.
    fn remap(&self, u: Float, offset: usize) -> Float {
        let width = self.cdf[offset + 1] - self.cdf[offset];
        if width > 0.0 {
            clamp((u - self.cdf[offset]) / width, 0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Returns the density of bin `offset` with respect to [0, 1).
    ///
    /// * `offset` - The bin.
    fn density(&self, offset: usize) -> Float {
        if self.func_int > 0.0 {
            self.func[offset] / self.func_int
        } else {
            1.0
        }
    }
}
