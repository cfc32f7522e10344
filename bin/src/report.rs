//! Sampling reports

use piecewise::geometry::*;
use piecewise::math::*;
use piecewise::rng::RNG;
use piecewise::sampling::*;
use std::fmt;

/// Expected and observed probability of one bin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BinStats {
    /// Probability of the bin according to the distribution.
    pub expected: f64,

    /// Fraction of samples that landed in the bin.
    pub observed: f64,
}

/// Result of drawing samples from a distribution.
#[derive(Clone, Debug)]
pub struct Report {
    /// Dimensions of the distribution (nu, nv).
    pub dims: (usize, usize),

    /// Integral of the function.
    pub integral: Float,

    /// Number of samples drawn.
    pub n_samples: usize,

    /// Per bin statistics in row-major order.
    pub bins: Vec<BinStats>,
}

impl Report {
    /// Returns the largest absolute difference between an expected and an
    /// observed bin probability.
    pub fn max_deviation(&self) -> f64 {
        self.bins
            .iter()
            .map(|b| (b.expected - b.observed).abs())
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for Report {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nu, nv) = self.dims;
        writeln!(
            f,
            "{nu} x {nv} bins, integral = {}, {} samples",
            self.integral, self.n_samples
        )?;
        for (i, b) in self.bins.iter().enumerate() {
            writeln!(
                f,
                "  ({}, {}) expected {:.5} observed {:.5}",
                i % nu,
                i / nu,
                b.expected,
                b.observed
            )?;
        }
        write!(f, "max deviation = {:.5}", self.max_deviation())
    }
}

/// Draws discrete samples from a 1D distribution.
///
/// * `func`      - Piecewise-constant function.
/// * `n_samples` - Number of samples to draw.
/// * `rng`       - Random number generator.
pub fn sample_1d(func: &[Float], n_samples: usize, rng: &mut RNG) -> Result<Report, String> {
    let d = Distribution1D::new(func).map_err(|e| e.to_string())?;

    let mut counts = vec![0_usize; d.count()];
    for _ in 0..n_samples {
        let (i, _pdf) = d.sample_discrete(rng.uniform_float());
        counts[i] += 1;
    }

    let bins = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| BinStats {
            expected: d.pdf_discrete(i) as f64,
            observed: c as f64 / max(n_samples, 1) as f64,
        })
        .collect();

    Ok(Report {
        dims: (d.count(), 1),
        integral: d.integral(),
        n_samples,
        bins,
    })
}

/// Draws continuous samples from a 2D distribution and bins them by grid cell.
///
/// * `rows`      - Rows of the piecewise-constant function.
/// * `n_samples` - Number of samples to draw.
/// * `n_threads` - Number of threads used to build the distribution.
/// * `rng`       - Random number generator.
pub fn sample_2d(rows: &[Vec<Float>], n_samples: usize, n_threads: usize, rng: &mut RNG) -> Result<Report, String> {
    let built = if n_threads > 1 {
        let nu = rows.first().map_or(0, |row| row.len());
        if rows.iter().any(|row| row.len() != nu) {
            return Err("all rows must have the same number of values".to_string());
        }
        Distribution2D::par_new(&rows.concat(), nu, rows.len(), n_threads)
    } else {
        Distribution2D::from_rows(rows)
    };
    let d = built.map_err(|e| e.to_string())?;

    let (nu, nv) = (d.nu(), d.nv());
    let mut counts = vec![0_usize; nu * nv];
    for _ in 0..n_samples {
        let (p, _pdf) = d.sample_continuous(&rng.uniform_point2f());
        counts[bin_index(p.y, nv) * nu + bin_index(p.x, nu)] += 1;
    }

    let cell_area = 1.0 / (nu * nv) as f64;
    let bins = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let center = Point2f::new(
                ((i % nu) as Float + 0.5) / nu as Float,
                ((i / nu) as Float + 0.5) / nv as Float,
            );
            BinStats {
                expected: d.pdf_continuous(&center) as f64 * cell_area,
                observed: c as f64 / max(n_samples, 1) as f64,
            }
        })
        .collect();

    Ok(Report {
        dims: (nu, nv),
        integral: d.integral(),
        n_samples,
        bins,
    })
}
