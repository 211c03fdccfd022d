//! Exponential smoothing models.
//!
//! - [`SimpleExponentialSmoothing`]: level only, flat forecast
//! - [`DoubleExponentialSmoothing`]: level plus additive (optionally damped) trend
//! - [`HoltWinters`]: level, trend and additive or multiplicative seasonality

mod holt;
mod holt_winters;
mod ses;

pub use holt::DoubleExponentialSmoothing;
pub use holt_winters::{HoltWinters, SeasonalType};
pub use ses::SimpleExponentialSmoothing;

use crate::error::{ForecastError, Result};

/// Admissible range of every smoothing weight.
pub const SMOOTHING_BOUNDS: (f64, f64) = (0.0001, 0.9999);

/// Admissible range of the trend damping factor.
pub const DAMPING_BOUNDS: (f64, f64) = (0.8, 1.0);

pub(crate) fn clamp_smoothing(value: f64) -> f64 {
    value.clamp(SMOOTHING_BOUNDS.0, SMOOTHING_BOUNDS.1)
}

pub(crate) fn clamp_damping(value: f64) -> f64 {
    value.clamp(DAMPING_BOUNDS.0, DAMPING_BOUNDS.1)
}

/// The recursions cannot skip gaps, so any NaN or infinity aborts the fit.
pub(crate) fn check_finite(values: &[f64]) -> Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::MissingValues);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping_respects_bounds() {
        assert_eq!(clamp_smoothing(0.0), 0.0001);
        assert_eq!(clamp_smoothing(1.0), 0.9999);
        assert_eq!(clamp_smoothing(0.42), 0.42);
        assert_eq!(clamp_damping(0.5), 0.8);
        assert_eq!(clamp_damping(1.2), 1.0);
    }

    #[test]
    fn non_finite_values_are_missing() {
        assert!(check_finite(&[1.0, 2.0]).is_ok());
        assert!(matches!(
            check_finite(&[1.0, f64::INFINITY]),
            Err(ForecastError::MissingValues)
        ));
    }
}
