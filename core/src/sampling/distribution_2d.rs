//! 2D Distribution.

use super::distribution_1d::*;
use super::error::*;
use crate::geometry::*;
use crate::math::*;
use allocator_api2::alloc::{Allocator, Global};
use allocator_api2::vec::Vec as AllocVec;
use std::thread;

/// Represents a piecewise-constant 2D function’s PDF and CDF and provides methods to perform this sampling efficiently.
///
/// The function covers [0, 1)² with `nv` rows of `nu` values each. Sampling
/// first picks a row from the marginal density of the row integrals and then a
/// column from that row's conditional density.
#[derive(Clone, Debug)]
pub struct Distribution2D<A: Allocator = Global> {
    /// 1D conditional sampling density `p[ũ|ṽ]` for each `nv`.
    p_conditional_v: AllocVec<Distribution1D<A>, A>,

    /// Marginal sampling density p[ṽ].
    p_marginal: Distribution1D<A>,
}

impl Distribution2D {
    /// Returns a new `Distribution2D` for given piecewise-constant function.
    ///
    /// * `func` - Row-major piecewise-constant 2D function with `nu * nv` values.
    /// * `nu`   - Number of values per row.
    /// * `nv`   - Number of rows.
    pub fn new(func: &[Float], nu: usize, nv: usize) -> Result<Self, DistributionError> {
        Self::new_in(func, nu, nv, Global)
    }

    /// Returns a new `Distribution2D` for a piecewise-constant function given
    /// as a list of rows. All rows must have the same length.
    ///
    /// * `rows` - Rows of the piecewise-constant 2D function.
    pub fn from_rows(rows: &[Vec<Float>]) -> Result<Self, DistributionError> {
        let nv = rows.len();
        let nu = rows.first().map_or(0, |row| row.len());
        if let Some(v) = rows.iter().position(|row| row.len() != nu) {
            return Err(DistributionError::InvalidArgument(format!(
                "row {v} has {} values, expected {nu}",
                rows[v].len()
            )));
        }

        let func: Vec<Float> = rows.concat();
        Self::new(&func, nu, nv)
    }

    /// Returns a new `Distribution2D` for given piecewise-constant function
    /// building the conditional densities of the rows on multiple threads.
    ///
    /// * `func`      - Row-major piecewise-constant 2D function with `nu * nv` values.
    /// * `nu`        - Number of values per row.
    /// * `nv`        - Number of rows.
    /// * `n_threads` - Number of worker threads.
    pub fn par_new(func: &[Float], nu: usize, nv: usize, n_threads: usize) -> Result<Self, DistributionError> {
        validate_grid(func, nu, nv)?;

        let n_threads = clamp(n_threads, 1, nv);
        let mut rows: Vec<Option<Distribution1D>> = (0..nv).map(|_| None).collect();

        thread::scope(|scope| -> Result<(), DistributionError> {
            let (tx_worker, rx_worker) = crossbeam_channel::bounded::<usize>(n_threads);
            let (tx_collector, rx_collector) =
                crossbeam_channel::bounded::<(usize, Result<Distribution1D, DistributionError>)>(nv);

            // Spawn worker threads.
            for _ in 0..n_threads {
                let rx_worker = rx_worker.clone();
                let tx_collector = tx_collector.clone();
                scope.spawn(move || {
                    for v in rx_worker.iter() {
                        let row = Distribution1D::new(&func[v * nu..(v + 1) * nu]);
                        if tx_collector.send((v, row)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(rx_worker); // Drop extra since we've cloned one for each worker.
            drop(tx_collector);

            // Send work.
            for v in 0..nv {
                if tx_worker.send(v).is_err() {
                    break;
                }
            }
            drop(tx_worker);

            // Collect rows until all workers are done.
            for (v, row) in rx_collector.iter() {
                rows[v] = Some(row?);
            }
            Ok(())
        })?;

        let mut p_conditional_v = AllocVec::with_capacity_in(nv, Global);
        p_conditional_v.extend(rows.into_iter().flatten());
        debug_assert_eq!(p_conditional_v.len(), nv);

        let d = Self::from_conditionals(p_conditional_v, Global)?;
        info!(
            "Built {nu} x {nv} distribution on {n_threads} threads, integral = {}",
            d.integral()
        );
        Ok(d)
    }
}

impl<A: Allocator + Clone> Distribution2D<A> {
    /// Returns a new `Distribution2D` for given piecewise-constant function
    /// with all buffers allocated by `alloc`.
    ///
    /// * `func`  - Row-major piecewise-constant 2D function with `nu * nv` values.
    /// * `nu`    - Number of values per row.
    /// * `nv`    - Number of rows.
    /// * `alloc` - Allocator for the conditional and marginal densities.
    pub fn new_in(func: &[Float], nu: usize, nv: usize, alloc: A) -> Result<Self, DistributionError> {
        validate_grid(func, nu, nv)?;

        let mut p_conditional_v = AllocVec::with_capacity_in(nv, alloc.clone());
        for row in func.chunks_exact(nu) {
            p_conditional_v.push(Distribution1D::new_in(row, alloc.clone())?);
        }

        let d = Self::from_conditionals(p_conditional_v, alloc)?;
        debug!("Built {nu} x {nv} distribution, integral = {}", d.integral());
        Ok(d)
    }

    /// Builds the marginal density from the integrals of the conditional
    /// densities.
    ///
    /// * `p_conditional_v` - Conditional densities, one per row.
    /// * `alloc`           - Allocator for the marginal density.
    fn from_conditionals(
        p_conditional_v: AllocVec<Distribution1D<A>, A>,
        alloc: A,
    ) -> Result<Self, DistributionError> {
        // Scratch copy of the row integrals; the marginal keeps its own.
        let mut marginal_func = Buffer::with_capacity_in(p_conditional_v.len(), alloc.clone());
        marginal_func.extend(p_conditional_v.iter().map(|pcv| pcv.integral()));

        let p_marginal = Distribution1D::new_in(&marginal_func, alloc)?;

        Ok(Self {
            p_conditional_v,
            p_marginal,
        })
    }

    /// Returns the number of values per row.
    pub fn nu(&self) -> usize {
        self.p_conditional_v[0].count()
    }

    /// Returns the number of rows.
    pub fn nv(&self) -> usize {
        self.p_marginal.count()
    }

    /// Returns the integral of the function over [0, 1)².
    pub fn integral(&self) -> Float {
        self.p_marginal.integral()
    }

    /// Returns the marginal density over the rows.
    pub fn marginal(&self) -> &Distribution1D<A> {
        &self.p_marginal
    }

    /// Returns the conditional density of a row.
    ///
    /// * `v` - The row.
    pub fn conditional(&self, v: usize) -> &Distribution1D<A> {
        &self.p_conditional_v[v]
    }

    /// Return a sample point in [0, 1)² and PDF from the distribution given a random sample.
    ///
    /// * `u` - The random sample. `u[0]` selects the row and `u[1]` the column.
    pub fn sample_continuous(&self, u: &Point2f) -> (Point2f, Float) {
        // Draw a sample from the p[ṽ] marginal distribution in order to find the
        // ṽ coordinate.
        let (d1, pdf1, v) = self.p_marginal.sample_continuous(u[0]);

        // Use ṽ to find the precomputed conditional distribution to use for
        // sampling ũ.
        let (d0, pdf0, _) = self.p_conditional_v[v].sample_continuous(u[1]);

        (Point2f::new(d0, d1), pdf0 * pdf1)
    }

    /// Return the PDF value for a given sample value.
    ///
    /// * `p` - Sample value in [0, 1)².
    pub fn pdf_continuous(&self, p: &Point2f) -> Float {
        // The product of the conditional and marginal PDFs reduces to the
        // function value over the integral of the whole function.
        let iu = bin_index(p[0], self.nu());
        let iv = bin_index(p[1], self.nv());
        if self.p_marginal.is_uniform_fallback() {
            1.0
        } else {
            self.p_conditional_v[iv].func()[iu] / self.p_marginal.integral()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RNG;
    use bumpalo::Bump;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn invalid_dimensions_are_rejected() {
        assert!(Distribution2D::new(&[], 0, 0).is_err());
        assert!(Distribution2D::new(&[1.0, 1.0], 0, 2).is_err());
        assert!(Distribution2D::new(&[1.0, 1.0], 2, 0).is_err());
        assert!(Distribution2D::new(&[1.0, 1.0, 1.0], 2, 2).is_err());
        assert!(Distribution2D::new(&[1.0, -1.0, 1.0, 1.0], 2, 2).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            Distribution2D::from_rows(&rows),
            Err(DistributionError::InvalidArgument(_))
        ));
        assert!(Distribution2D::from_rows(&[]).is_err());
    }

    #[test]
    fn conditionals_and_marginal_have_grid_dimensions() {
        let d = Distribution2D::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
        assert_eq!(d.nu(), 3);
        assert_eq!(d.nv(), 2);
        assert_eq!(d.marginal().count(), 2);
        assert_eq!(d.conditional(0).func(), &[1.0, 2.0, 3.0]);
        assert_eq!(d.conditional(1).func(), &[4.0, 5.0, 6.0]);

        // Marginal is built from the row integrals.
        assert!(approx_eq!(f32, d.marginal().func()[0], 2.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, d.marginal().func()[1], 5.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, d.integral(), 3.5, epsilon = 1e-6));
    }

    #[test]
    fn uniform_grid_has_unit_density() {
        let d = Distribution2D::new(&[1.0, 1.0, 1.0, 1.0], 2, 2).unwrap();
        let (p, pdf) = d.sample_continuous(&Point2f::new(0.25, 0.25));
        assert!(approx_eq!(f32, pdf, 1.0, epsilon = 1e-6));
        assert!(p.x < 0.5 && p.y < 0.5, "{p}");
        assert!(approx_eq!(f32, p.x, 0.25, epsilon = 1e-6));
        assert!(approx_eq!(f32, p.y, 0.25, epsilon = 1e-6));
        assert!(approx_eq!(f32, d.pdf_continuous(&p), 1.0, epsilon = 1e-6));
    }

    #[test]
    fn first_sample_dimension_selects_row() {
        // All mass in the second row, first column.
        let d = Distribution2D::new(&[0.0, 0.0, 4.0, 0.0], 2, 2).unwrap();
        let (p, pdf) = d.sample_continuous(&Point2f::new(0.5, 0.5));
        assert!(p.y >= 0.5, "{p}");
        assert!(p.x < 0.5, "{p}");
        assert!(approx_eq!(f32, pdf, 4.0, epsilon = 1e-5));
    }

    #[test]
    fn sample_pdf_matches_pdf_continuous() {
        let f = [1.0, 2.0, 0.5, 4.0, 0.0, 3.0, 2.0, 1.0, 6.0, 0.25, 1.0, 2.0];
        let d = Distribution2D::new(&f, 4, 3).unwrap();

        let mut rng = RNG::new(9);
        for _ in 0..1_000 {
            let (p, pdf) = d.sample_continuous(&rng.uniform_point2f());
            assert!(p.in_unit_square(), "{p}");
            assert!(pdf > 0.0);
            assert!(approx_eq!(f32, pdf, d.pdf_continuous(&p), epsilon = 1e-4), "{p}");
        }
    }

    #[test]
    fn samples_below_marginal_cdf_edges_avoid_zero_rows() {
        // Every odd row is zero.
        let (nu, nv) = (2, 200);
        let f: Vec<Float> = (0..nu * nv)
            .map(|i| if (i / nu) % 2 == 0 { 1.0 + (i % nu) as Float } else { 0.0 })
            .collect();
        let d = Distribution2D::new(&f, nu, nv).unwrap();

        for v in 0..nv {
            let mut u0 = d.marginal().cdf()[v + 1];
            for _ in 0..4 {
                u0 = next_float_down(u0);
                if !(0.0..1.0).contains(&u0) {
                    continue;
                }
                for u1 in [0.0, 0.3, next_float_down(0.25), ONE_MINUS_EPSILON] {
                    let (p, pdf) = d.sample_continuous(&Point2f::new(u0, u1));
                    let row = bin_index(p.y, nv);
                    assert_eq!(row % 2, 0, "u0 = {u0}, p = {p}");
                    assert!(pdf > 0.0);
                    assert!(
                        approx_eq!(f32, pdf, d.pdf_continuous(&p), epsilon = 1e-4),
                        "u0 = {u0}, p = {p}, pdf = {pdf}"
                    );
                }
            }
        }
    }

    #[test]
    fn pdf_integrates_to_one() {
        let f = [1.0, 2.0, 0.5, 4.0, 0.0, 3.0, 2.0, 1.0, 6.0, 0.25, 1.0, 2.0];
        let d = Distribution2D::new(&f, 4, 3).unwrap();

        let (mu, mv) = (400, 300);
        let mut sum = 0.0_f64;
        for j in 0..mv {
            for i in 0..mu {
                let p = Point2f::new((i as Float + 0.5) / mu as Float, (j as Float + 0.5) / mv as Float);
                sum += d.pdf_continuous(&p) as f64;
            }
        }
        sum /= (mu * mv) as f64;
        assert!((sum - 1.0).abs() < 1e-3, "sum = {sum}");
    }

    #[test]
    fn pdf_continuous_clamps_out_of_range_points() {
        let d = Distribution2D::new(&[1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(d.pdf_continuous(&Point2f::new(1.0, 1.0)), d.pdf_continuous(&Point2f::new(0.9, 0.9)));
        assert_eq!(d.pdf_continuous(&Point2f::new(-0.5, 0.0)), d.pdf_continuous(&Point2f::new(0.0, 0.0)));
    }

    #[test]
    fn all_zero_grid_falls_back_to_uniform() {
        let d = Distribution2D::new(&[0.0; 6], 3, 2).unwrap();
        assert_eq!(d.integral(), 0.0);
        let (p, pdf) = d.sample_continuous(&Point2f::new(0.3, 0.8));
        assert_eq!(pdf, 1.0);
        assert!(approx_eq!(f32, p.x, 0.8, epsilon = 1e-6));
        assert!(approx_eq!(f32, p.y, 0.3, epsilon = 1e-6));
        assert_eq!(d.pdf_continuous(&p), 1.0);
    }

    #[test]
    fn zero_rows_are_never_sampled() {
        let d = Distribution2D::new(&[0.0, 0.0, 1.0, 3.0, 0.0, 0.0], 2, 3).unwrap();
        let mut rng = RNG::new(1);
        for _ in 0..1_000 {
            let (p, pdf) = d.sample_continuous(&rng.uniform_point2f());
            assert_eq!(bin_index(p.y, 3), 1, "{p}");
            assert!(pdf > 0.0);
        }
    }

    #[test]
    fn from_rows_matches_row_major_grid() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![0.0, 5.0, 1.0]];
        let a = Distribution2D::from_rows(&rows).unwrap();
        let b = Distribution2D::new(&[1.0, 2.0, 3.0, 0.0, 5.0, 1.0], 3, 2).unwrap();
        assert_eq!(a.marginal().cdf(), b.marginal().cdf());
        let u = Point2f::new(0.6, 0.3);
        assert_eq!(a.sample_continuous(&u), b.sample_continuous(&u));
    }

    #[test]
    fn parallel_construction_matches_serial() {
        let (nu, nv) = (16, 37);
        let mut rng = RNG::new(4);
        let f: Vec<Float> = (0..nu * nv).map(|_| rng.uniform_float() * 10.0).collect();

        let serial = Distribution2D::new(&f, nu, nv).unwrap();
        for n_threads in [0, 1, 4, 100] {
            let parallel = Distribution2D::par_new(&f, nu, nv, n_threads).unwrap();
            assert_eq!(parallel.nu(), nu);
            assert_eq!(parallel.nv(), nv);
            assert_eq!(parallel.marginal().cdf(), serial.marginal().cdf());
            for v in 0..nv {
                assert_eq!(parallel.conditional(v).cdf(), serial.conditional(v).cdf());
            }
        }
    }

    #[test]
    fn parallel_construction_rejects_invalid_grid() {
        assert!(Distribution2D::par_new(&[1.0, 1.0, 1.0], 2, 2, 4).is_err());
        assert!(Distribution2D::par_new(&[1.0, Float::NAN, 1.0, 1.0], 2, 2, 4).is_err());
    }

    #[test]
    fn arena_allocated_distribution_matches_heap_allocated() {
        let arena = Bump::new();
        let f = [1.0, 2.0, 0.5, 4.0, 0.0, 3.0];
        let heap = Distribution2D::new(&f, 3, 2).unwrap();
        let bump = Distribution2D::new_in(&f, 3, 2, &arena).unwrap();

        let u = Point2f::new(0.7, 0.2);
        assert_eq!(heap.sample_continuous(&u), bump.sample_continuous(&u));
        assert_eq!(heap.pdf_continuous(&u), bump.pdf_continuous(&u));
    }

    #[test]
    fn distribution_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Distribution2D>();
    }

    proptest! {
        #[test]
        fn samples_are_in_unit_square(
            nu in 1usize..8,
            nv in 1usize..8,
            seed in 0u64..1000,
            u0 in 0.0f32..1.0,
            u1 in 0.0f32..1.0,
        ) {
            let mut rng = RNG::new(seed);
            let f: Vec<Float> = (0..nu * nv).map(|_| rng.uniform_float() * 4.0).collect();
            let d = Distribution2D::new(&f, nu, nv).unwrap();
            let (p, pdf) = d.sample_continuous(&Point2f::new(u0, u1));
            prop_assert!(p.in_unit_square());
            prop_assert!(pdf >= 0.0 && pdf.is_finite());
        }
    }
}
