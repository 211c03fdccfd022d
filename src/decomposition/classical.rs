//! Classical moving-average decomposition.
//!
//! The trend is a centered moving average spanning one full period (a 2×m
//! average for even periods), the seasonal component is the per-position
//! mean of the detrended series and the residual is what remains.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::utils::stats::{nan_mean, nan_variance};

/// How the components combine into the observed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionModel {
    /// `y = trend + seasonal + resid`
    #[default]
    Additive,
    /// `y = trend × seasonal × resid`
    Multiplicative,
}

/// Components of a classical decomposition.
///
/// `trend` and `resid` are NaN for the first and last `period / 2`
/// observations, where the centered average is undefined.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub observed: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub resid: Vec<f64>,
    pub period: usize,
    pub model: DecompositionModel,
}

impl Decomposition {
    /// One seasonal index per position in the cycle.
    pub fn seasonal_indices(&self) -> &[f64] {
        &self.seasonal[..self.period.min(self.seasonal.len())]
    }

    pub fn seasonal_mean(&self) -> f64 {
        nan_mean(&self.seasonal)
    }

    /// Mean of the defined residuals.
    pub fn resid_mean(&self) -> f64 {
        nan_mean(&self.resid)
    }

    /// `max(0, 1 - Var(R) / Var(T + R))`, over positions where the trend exists.
    pub fn trend_strength(&self) -> f64 {
        self.strength(&self.trend)
    }

    /// `max(0, 1 - Var(R) / Var(S + R))`, over positions where the trend exists.
    pub fn seasonal_strength(&self) -> f64 {
        self.strength(&self.seasonal)
    }

    fn strength(&self, component: &[f64]) -> f64 {
        let combine = |c: f64, r: f64| match self.model {
            DecompositionModel::Additive => c + r,
            DecompositionModel::Multiplicative => c * r,
        };

        let (resid, combined): (Vec<f64>, Vec<f64>) = component
            .iter()
            .zip(&self.resid)
            .filter(|(_, r)| r.is_finite())
            .map(|(&c, &r)| (r, combine(c, r)))
            .unzip();

        let var_combined = nan_variance(&combined);
        if !var_combined.is_finite() || var_combined < 1e-10 {
            return 0.0;
        }
        (1.0 - nan_variance(&resid) / var_combined).max(0.0)
    }
}

/// Decompose `values` into trend, seasonal and residual components.
///
/// # Example
/// ```
/// use smoothcast::decomposition::{seasonal_decompose, DecompositionModel};
///
/// let values: Vec<f64> = (0..48)
///     .map(|i| 0.5 * i as f64 + [2.0, -1.0, 0.5, -1.5][i % 4])
///     .collect();
/// let result = seasonal_decompose(&values, 4, DecompositionModel::Additive).unwrap();
///
/// assert!((result.seasonal_indices()[0] - 2.0).abs() < 1e-9);
/// assert!(result.trend[0].is_nan());
/// ```
pub fn seasonal_decompose(
    values: &[f64],
    period: usize,
    model: DecompositionModel,
) -> Result<Decomposition> {
    if period < 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "decomposition period must be at least 2, got {period}"
        )));
    }
    if values.len() < 2 * period {
        return Err(ForecastError::InsufficientData {
            needed: 2 * period,
            got: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::MissingValues);
    }
    if model == DecompositionModel::Multiplicative && values.iter().any(|&v| v <= 0.0) {
        return Err(ForecastError::InvalidParameter(
            "multiplicative decomposition requires strictly positive data".into(),
        ));
    }

    let trend = centered_moving_average(values, period);

    let detrended: Vec<f64> = values
        .iter()
        .zip(&trend)
        .map(|(&y, &t)| match model {
            DecompositionModel::Additive => y - t,
            DecompositionModel::Multiplicative => y / t,
        })
        .collect();

    let mut indices: Vec<f64> = (0..period)
        .map(|k| {
            let column: Vec<f64> = detrended.iter().skip(k).step_by(period).copied().collect();
            nan_mean(&column)
        })
        .collect();

    let center = indices.iter().sum::<f64>() / period as f64;
    match model {
        DecompositionModel::Additive => indices.iter_mut().for_each(|s| *s -= center),
        DecompositionModel::Multiplicative => indices.iter_mut().for_each(|s| *s /= center),
    }

    let seasonal: Vec<f64> = (0..values.len()).map(|i| indices[i % period]).collect();

    let resid: Vec<f64> = values
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((&y, &t), &s)| match model {
            DecompositionModel::Additive => y - t - s,
            DecompositionModel::Multiplicative => y / (t * s),
        })
        .collect();

    tracing::debug!(
        period,
        ?model,
        n = values.len(),
        "classical decomposition complete"
    );

    Ok(Decomposition {
        observed: values.to_vec(),
        trend,
        seasonal,
        resid,
        period,
        model,
    })
}

/// Two-sided moving average over one period; NaN where the window does not fit.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![f64::NAN; n];

    for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
        let sum = if period % 2 == 0 {
            0.5 * (values[i - half] + values[i + half])
                + values[i - half + 1..i + half].iter().sum::<f64>()
        } else {
            values[i - half..=i + half].iter().sum::<f64>()
        };
        *slot = sum / period as f64;
    }

    trend
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn additive_known_decomposition() {
        let values = [1.0, 5.0, 3.0, 7.0, 2.0, 6.0, 4.0, 8.0, 3.0, 7.0, 5.0, 9.0];
        let result = seasonal_decompose(&values, 4, DecompositionModel::Additive).unwrap();

        assert!(result.trend[0].is_nan() && result.trend[1].is_nan());
        assert!(result.trend[10].is_nan() && result.trend[11].is_nan());
        let expected_trend = [4.125, 4.375, 4.625, 4.875, 5.125, 5.375, 5.625, 5.875];
        for (i, t) in expected_trend.iter().enumerate() {
            assert_relative_eq!(result.trend[i + 2], *t, epsilon = 1e-12);
        }

        let indices = result.seasonal_indices();
        assert_relative_eq!(indices[0], -2.625, epsilon = 1e-12);
        assert_relative_eq!(indices[1], 1.125, epsilon = 1e-12);
        assert_relative_eq!(indices[2], -1.125, epsilon = 1e-12);
        assert_relative_eq!(indices[3], 2.625, epsilon = 1e-12);

        for r in &result.resid[2..10] {
            assert_relative_eq!(*r, 0.0, epsilon = 1e-12);
        }
        assert!(result.resid[0].is_nan());
        assert_relative_eq!(result.resid_mean(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn odd_period_uses_simple_average() {
        let values: Vec<f64> = (0..21).map(|i| i as f64 + [1.0, 0.0, -1.0][i % 3]).collect();
        let result = seasonal_decompose(&values, 3, DecompositionModel::Additive).unwrap();

        assert!(result.trend[0].is_nan());
        assert!(result.trend[20].is_nan());
        for i in 1..20 {
            assert_relative_eq!(result.trend[i], i as f64, epsilon = 1e-12);
        }
        assert_relative_eq!(result.seasonal_indices()[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.seasonal_indices()[2], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn seasonal_component_is_centered_and_periodic() {
        let values: Vec<f64> = (0..120)
            .map(|i| 315.0 + 0.1 * i as f64 + 3.0 * (2.0 * PI * i as f64 / 12.0).sin())
            .collect();
        let result = seasonal_decompose(&values, 12, DecompositionModel::Additive).unwrap();

        assert_relative_eq!(
            result.seasonal_indices().iter().sum::<f64>(),
            0.0,
            epsilon = 1e-9
        );
        for i in 12..120 {
            assert_eq!(result.seasonal[i], result.seasonal[i - 12]);
        }
        assert_relative_eq!(result.seasonal_mean(), 0.0, epsilon = 1e-9);
        assert_eq!(result.trend.iter().filter(|t| t.is_nan()).count(), 12);
    }

    #[test]
    fn multiplicative_indices_average_to_one() {
        let values: Vec<f64> = (0..48)
            .map(|i| (50.0 + i as f64) * (1.0 + 0.2 * (2.0 * PI * i as f64 / 12.0).cos()))
            .collect();
        let result = seasonal_decompose(&values, 12, DecompositionModel::Multiplicative).unwrap();

        let mean = result.seasonal_indices().iter().sum::<f64>() / 12.0;
        assert_relative_eq!(mean, 1.0, epsilon = 1e-12);
        assert!(result.seasonal_indices()[0] > 1.1);
        assert!(result.resid.iter().filter(|r| r.is_finite()).all(|r| (r - 1.0).abs() < 0.05));
    }

    #[test]
    fn strengths_reflect_components() {
        let values: Vec<f64> = (0..96)
            .map(|i| {
                let noise = if i % 7 == 0 { 0.05 } else { -0.01 };
                2.0 * i as f64 + 0.5 * (2.0 * PI * i as f64 / 12.0).sin() + noise
            })
            .collect();
        let result = seasonal_decompose(&values, 12, DecompositionModel::Additive).unwrap();

        assert!(result.trend_strength() > 0.9);
        let s = result.seasonal_strength();
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let values: Vec<f64> = (0..30).map(|i| i as f64 + 1.0).collect();

        assert!(matches!(
            seasonal_decompose(&values, 1, DecompositionModel::Additive),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(matches!(
            seasonal_decompose(&values[..23], 12, DecompositionModel::Additive),
            Err(ForecastError::InsufficientData { needed: 24, got: 23 })
        ));

        let mut gappy = values.clone();
        gappy[4] = f64::NAN;
        assert!(matches!(
            seasonal_decompose(&gappy, 12, DecompositionModel::Additive),
            Err(ForecastError::MissingValues)
        ));

        let mut negative = values;
        negative[0] = -1.0;
        assert!(matches!(
            seasonal_decompose(&negative, 12, DecompositionModel::Multiplicative),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
