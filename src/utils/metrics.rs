//! Accuracy metrics for forecast evaluation.

use crate::error::{ForecastError, Result};
use serde::Serialize;

/// Accuracy metrics for evaluating forecast performance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (None if zeros in actual)
    pub mape: Option<f64>,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

fn check_pair(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    Ok(())
}

/// Mean absolute error, the objective minimized by the grid searches.
///
/// # Example
/// ```
/// use smoothcast::utils::mean_absolute_error;
///
/// let mae = mean_absolute_error(&[1.0, 2.0, 3.0], &[1.5, 2.0, 2.0]).unwrap();
/// assert!((mae - 0.5).abs() < 1e-12);
/// ```
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    Ok(actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64)
}

/// Calculate accuracy metrics between actual and predicted values.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    check_pair(actual, predicted)?;

    let n = actual.len() as f64;
    let mae = mean_absolute_error(actual, predicted)?;

    let mse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n;

    let mape = if actual.contains(&0.0) {
        None
    } else {
        let sum: f64 = actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| ((a - p) / a).abs())
            .sum();
        Some(100.0 * sum / n)
    };

    let smape: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| {
            let denom = a.abs() + p.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (a - p).abs() / denom
            }
        })
        .sum::<f64>()
        * 100.0
        / n;

    Ok(AccuracyMetrics {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
        smape,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mae_known_values() {
        let actual = [366.0, 367.5, 368.0];
        let predicted = [365.0, 368.5, 368.0];
        assert_relative_eq!(
            mean_absolute_error(&actual, &predicted).unwrap(),
            2.0 / 3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn mae_rejects_mismatched_lengths() {
        assert!(matches!(
            mean_absolute_error(&[1.0, 2.0], &[1.0]),
            Err(ForecastError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(
            mean_absolute_error(&[], &[]),
            Err(ForecastError::EmptyData)
        ));
    }

    #[test]
    fn metrics_perfect_forecast() {
        let actual = [1.0, 2.0, 3.0];
        let m = calculate_metrics(&actual, &actual).unwrap();
        assert_relative_eq!(m.mae, 0.0);
        assert_relative_eq!(m.rmse, 0.0);
        assert_relative_eq!(m.mape.unwrap(), 0.0);
        assert_relative_eq!(m.smape, 0.0);
    }

    #[test]
    fn metrics_known_values() {
        let actual = [2.0, 4.0];
        let predicted = [1.0, 6.0];
        let m = calculate_metrics(&actual, &predicted).unwrap();
        assert_relative_eq!(m.mae, 1.5);
        assert_relative_eq!(m.mse, 2.5);
        assert_relative_eq!(m.rmse, 2.5_f64.sqrt());
        // (|1/2| + |2/4|) / 2 * 100
        assert_relative_eq!(m.mape.unwrap(), 50.0);
    }

    #[test]
    fn mape_undefined_with_zero_actuals() {
        let m = calculate_metrics(&[0.0, 1.0], &[0.5, 1.0]).unwrap();
        assert!(m.mape.is_none());
    }
}
