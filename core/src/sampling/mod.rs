//! Sampling

mod distribution_1d;
mod distribution_2d;
mod error;

// Re-export
pub use distribution_1d::*;
pub use distribution_2d::*;
pub use error::*;
