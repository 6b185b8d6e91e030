//! Identifiers and planar math shared by every map crate.

pub mod ids;
pub mod math;

pub use ids::*;
