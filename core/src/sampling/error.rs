//! Distribution errors.

use crate::math::*;
use thiserror::Error;

/// Errors raised while building a distribution. Queries on a built
/// distribution never fail.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DistributionError {
    /// The function values or dimensions cannot describe a distribution.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Checks that a piecewise-constant function has at least one value and
/// that every value is finite and non-negative.
///
/// * `f` - Piecewise-constant function.
pub(crate) fn validate_weights(f: &[Float]) -> Result<(), DistributionError> {
    if f.is_empty() {
        return Err(DistributionError::InvalidArgument(
            "piecewise-constant function needs at least one value".to_string(),
        ));
    }

    match f.iter().position(|&w| !is_valid_weight(w)) {
        Some(i) => Err(DistributionError::InvalidArgument(format!(
            "function value {} at index {i} is not a finite non-negative number",
            f[i]
        ))),
        None => Ok(()),
    }
}

/// Checks the dimensions and values of a row-major `nu` x `nv` grid.
///
/// * `grid` - Row-major function values.
/// * `nu`   - Number of values per row.
/// * `nv`   - Number of rows.
pub(crate) fn validate_grid(grid: &[Float], nu: usize, nv: usize) -> Result<(), DistributionError> {
    if nu == 0 || nv == 0 {
        return Err(DistributionError::InvalidArgument(format!(
            "grid dimensions must be positive, got {nu} x {nv}"
        )));
    }

    if nu.checked_mul(nv) != Some(grid.len()) {
        return Err(DistributionError::InvalidArgument(format!(
            "grid of {} values does not match dimensions {nu} x {nv}",
            grid.len()
        )));
    }

    validate_weights(grid)
}
