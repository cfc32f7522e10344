//! Common numeric stuff

mod clamp;
mod common;
mod interval;

// Re-export
pub use clamp::*;
pub use common::*;
pub use interval::*;
