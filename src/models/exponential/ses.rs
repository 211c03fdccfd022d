//! Simple Exponential Smoothing (SES) forecasting model.
//!
//! SES tracks a level only, so its forecast is flat. On a trending, seasonal
//! series such as monthly CO2 it serves as the baseline the richer models
//! are measured against.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::exponential::{check_finite, clamp_smoothing, SMOOTHING_BOUNDS};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::quantile_normal;

/// Simple Exponential Smoothing forecaster.
///
/// The model equation is:
/// `level_t = α × y_t + (1-α) × level_{t-1}`
///
/// where α (alpha) is the smoothing parameter (0 < α < 1) and the level
/// starts at the first observation.
///
/// # Example
/// ```
/// use smoothcast::core::TimeSeries;
/// use smoothcast::models::exponential::SimpleExponentialSmoothing;
/// use smoothcast::models::Forecaster;
///
/// let ts = TimeSeries::from_values(vec![10.0, 12.0, 11.0, 13.0, 12.0, 14.0]).unwrap();
///
/// let mut model = SimpleExponentialSmoothing::new(0.5);
/// model.fit(&ts).unwrap();
///
/// let forecast = model.predict(3).unwrap();
/// assert_eq!(forecast.horizon(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SimpleExponentialSmoothing {
    /// Smoothing parameter (0 < alpha < 1).
    alpha: Option<f64>,
    /// Whether to optimize alpha automatically.
    optimize: bool,
    /// Current level state.
    level: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    /// Residual variance for prediction intervals.
    residual_variance: Option<f64>,
    sse: Option<f64>,
}

impl SimpleExponentialSmoothing {
    /// Create a new SES model with a fixed smoothing parameter.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: Some(clamp_smoothing(alpha)),
            optimize: false,
            level: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
            sse: None,
        }
    }

    /// Create a new SES model whose alpha minimizes the in-sample SSE.
    pub fn auto() -> Self {
        Self {
            alpha: None,
            optimize: true,
            ..Self::new(0.5)
        }
    }

    /// Get the smoothing parameter.
    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    /// Get the current level.
    pub fn level(&self) -> Option<f64> {
        self.level
    }

    /// In-sample sum of squared one-step errors.
    pub fn sse(&self) -> Option<f64> {
        self.sse
    }

    fn calculate_sse(values: &[f64], alpha: f64) -> f64 {
        let mut level = values[0];
        let mut sse = 0.0;

        for &y in &values[1..] {
            let error = y - level;
            sse += error * error;
            level = alpha * y + (1.0 - alpha) * level;
        }

        sse
    }

    fn optimize_alpha(values: &[f64]) -> f64 {
        let config = NelderMeadConfig {
            max_iter: 500,
            ..Default::default()
        };

        let result = nelder_mead(
            |params| Self::calculate_sse(values, params[0]),
            &[0.5],
            Some(&[SMOOTHING_BOUNDS]),
            config,
        );

        clamp_smoothing(result.optimal_point[0])
    }
}

impl Default for SimpleExponentialSmoothing {
    fn default() -> Self {
        Self::auto()
    }
}

impl Forecaster for SimpleExponentialSmoothing {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        check_finite(values)?;

        if self.optimize {
            self.alpha = Some(Self::optimize_alpha(values));
        }

        let alpha = self.alpha.ok_or(ForecastError::FitRequired)?;

        let mut level = values[0];
        let mut fitted = Vec::with_capacity(values.len());
        let mut residuals = Vec::with_capacity(values.len());

        // The first observation seeds the level and has no residual
        fitted.push(level);
        residuals.push(0.0);

        for &y in &values[1..] {
            fitted.push(level);
            residuals.push(y - level);
            level = alpha * y + (1.0 - alpha) * level;
        }

        let sse: f64 = residuals[1..].iter().map(|r| r * r).sum();
        if values.len() > 1 {
            self.residual_variance = Some(sse / (values.len() - 1) as f64);
        }

        tracing::debug!(alpha, level, sse, n = values.len(), "fitted SES");

        self.level = Some(level);
        self.sse = Some(sse);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let level = self.level.ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        Ok(Forecast::from_values(vec![level; horizon]))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let current_level = self.level.ok_or(ForecastError::FitRequired)?;
        let alpha = self.alpha.ok_or(ForecastError::FitRequired)?;
        let variance = self.residual_variance.unwrap_or(0.0);

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let z = quantile_normal((1.0 + level) / 2.0);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);

        for h in 1..=horizon {
            // Var(e_{n+h}) = σ² (1 + (h-1) α²)
            let factor = 1.0 + (h - 1) as f64 * alpha * alpha;
            let se = (variance * factor).sqrt();
            lower.push(current_level - z * se);
            upper.push(current_level + z * se);
        }

        Ok(Forecast::from_values_with_intervals(
            vec![current_level; horizon],
            lower,
            upper,
        ))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SimpleExponentialSmoothing"
    }
}
