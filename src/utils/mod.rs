//! Utility functions shared by the models and diagnostics.

pub mod metrics;
pub mod ols;
pub mod optimization;
pub mod stats;

pub use metrics::{calculate_metrics, mean_absolute_error, AccuracyMetrics};
pub use ols::{ols, OlsFit};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{normal_cdf, quantile_normal};

/// Seeded uniform noise on [-0.5, 0.5) for test series.
#[cfg(test)]
pub(crate) fn uniform_noise(n: usize, seed: u64) -> Vec<f64> {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-0.5..0.5)).collect()
}
