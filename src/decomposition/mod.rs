//! Seasonal decomposition for diagnostics.
//!
//! - Classical: centered moving-average trend with per-position seasonal means

mod classical;

pub use classical::{seasonal_decompose, Decomposition, DecompositionModel};
