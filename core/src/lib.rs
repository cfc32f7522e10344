//! Piecewise-constant importance sampling.

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate log;

// Re-export.
pub mod geometry;
pub mod math;
pub mod rng;
pub mod sampling;
