//! Double exponential smoothing (Holt's additive trend method).

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::exponential::{
    check_finite, clamp_damping, clamp_smoothing, DAMPING_BOUNDS, SMOOTHING_BOUNDS,
};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::quantile_normal;

/// Level and additive trend smoother.
///
/// - Level: `l_t = α y_t + (1-α)(l_{t-1} + φ b_{t-1})`
/// - Trend: `b_t = β (l_t - l_{t-1}) + (1-β) φ b_{t-1}`
/// - Forecast: `ŷ_{n+h} = l_n + (φ + φ² + ... + φ^h) b_n`
///
/// Without damping φ is 1 and the forecast is a straight line. The level
/// starts at `y_0` and the trend at `y_1 - y_0`.
#[derive(Debug, Clone)]
pub struct DoubleExponentialSmoothing {
    alpha: Option<f64>,
    beta: Option<f64>,
    /// Damping factor, `None` for an undamped trend.
    phi: Option<f64>,
    optimize: bool,
    level: Option<f64>,
    trend: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    sse: Option<f64>,
}

/// One pass of the recursion over a series.
struct TrendPass {
    level: f64,
    trend: f64,
    fitted: Vec<f64>,
    sse: f64,
}

fn run_recursion(values: &[f64], alpha: f64, beta: f64, phi: f64) -> TrendPass {
    let mut level = values[0];
    let mut trend = values.get(1).map_or(0.0, |y1| y1 - values[0]);
    let mut fitted = Vec::with_capacity(values.len());
    let mut sse = 0.0;

    fitted.push(values[0]);
    for &y in &values[1..] {
        let forecast = level + phi * trend;
        fitted.push(forecast);
        sse += (y - forecast).powi(2);

        let previous = level;
        level = alpha * y + (1.0 - alpha) * (previous + phi * trend);
        trend = beta * (level - previous) + (1.0 - beta) * phi * trend;
    }

    TrendPass {
        level,
        trend,
        fitted,
        sse,
    }
}

/// `φ + φ² + ... + φ^h`, which is `h` when φ is 1.
fn damped_sum(phi: f64, h: usize) -> f64 {
    if (phi - 1.0).abs() < 1e-10 {
        h as f64
    } else {
        phi * (1.0 - phi.powi(h as i32)) / (1.0 - phi)
    }
}

impl DoubleExponentialSmoothing {
    /// Fixed smoothing weights, undamped trend.
    ///
    /// # Example
    /// ```
    /// use smoothcast::core::TimeSeries;
    /// use smoothcast::models::exponential::DoubleExponentialSmoothing;
    /// use smoothcast::models::Forecaster;
    ///
    /// let ts = TimeSeries::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    /// let mut model = DoubleExponentialSmoothing::new(0.5, 0.5);
    /// model.fit(&ts).unwrap();
    ///
    /// let forecast = model.predict(2).unwrap();
    /// assert!((forecast.primary()[0] - 6.0).abs() < 1e-9);
    /// assert!((forecast.primary()[1] - 7.0).abs() < 1e-9);
    /// ```
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha: Some(clamp_smoothing(alpha)),
            beta: Some(clamp_smoothing(beta)),
            phi: None,
            optimize: false,
            level: None,
            trend: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
            sse: None,
        }
    }

    /// Fixed smoothing weights with a damped trend.
    pub fn damped(alpha: f64, beta: f64, phi: f64) -> Self {
        Self {
            phi: Some(clamp_damping(phi)),
            ..Self::new(alpha, beta)
        }
    }

    /// Alpha and beta chosen by minimizing the in-sample SSE.
    pub fn auto() -> Self {
        Self {
            alpha: None,
            beta: None,
            optimize: true,
            ..Self::new(0.5, 0.5)
        }
    }

    /// Alpha, beta and phi chosen by minimizing the in-sample SSE.
    pub fn auto_damped() -> Self {
        Self {
            phi: Some(0.98),
            ..Self::auto()
        }
    }

    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn beta(&self) -> Option<f64> {
        self.beta
    }

    pub fn phi(&self) -> Option<f64> {
        self.phi
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    pub fn trend(&self) -> Option<f64> {
        self.trend
    }

    /// In-sample sum of squared one-step errors.
    pub fn sse(&self) -> Option<f64> {
        self.sse
    }

    fn optimize_params(values: &[f64], damped: bool) -> (f64, f64, Option<f64>) {
        let config = NelderMeadConfig {
            max_iter: 1000,
            tolerance: 1e-8,
            ..Default::default()
        };

        let (initial, bounds): (Vec<f64>, Vec<(f64, f64)>) = if damped {
            (
                vec![0.3, 0.1, 0.98],
                vec![SMOOTHING_BOUNDS, SMOOTHING_BOUNDS, DAMPING_BOUNDS],
            )
        } else {
            (vec![0.3, 0.1], vec![SMOOTHING_BOUNDS, SMOOTHING_BOUNDS])
        };

        let result = nelder_mead(
            |p| {
                let phi = p.get(2).copied().unwrap_or(1.0);
                run_recursion(values, p[0], p[1], phi).sse
            },
            &initial,
            Some(&bounds),
            config,
        );

        let point = &result.optimal_point;
        (
            clamp_smoothing(point[0]),
            clamp_smoothing(point[1]),
            point.get(2).map(|&phi| clamp_damping(phi)),
        )
    }
}

impl Default for DoubleExponentialSmoothing {
    fn default() -> Self {
        Self::auto()
    }
}

impl Forecaster for DoubleExponentialSmoothing {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        if values.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: values.len(),
            });
        }
        check_finite(values)?;

        if self.optimize {
            let (alpha, beta, phi) = Self::optimize_params(values, self.phi.is_some());
            self.alpha = Some(alpha);
            self.beta = Some(beta);
            if phi.is_some() {
                self.phi = phi;
            }
        }

        let alpha = self.alpha.ok_or(ForecastError::FitRequired)?;
        let beta = self.beta.ok_or(ForecastError::FitRequired)?;
        let phi = self.phi.unwrap_or(1.0);

        let pass = run_recursion(values, alpha, beta, phi);
        let residuals: Vec<f64> = values
            .iter()
            .zip(&pass.fitted)
            .map(|(y, f)| y - f)
            .collect();

        tracing::debug!(
            alpha,
            beta,
            phi,
            level = pass.level,
            trend = pass.trend,
            sse = pass.sse,
            "fitted double exponential smoothing"
        );

        self.residual_variance = Some(pass.sse / (values.len() - 1) as f64);
        self.level = Some(pass.level);
        self.trend = Some(pass.trend);
        self.sse = Some(pass.sse);
        self.fitted = Some(pass.fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let level = self.level.ok_or(ForecastError::FitRequired)?;
        let trend = self.trend.ok_or(ForecastError::FitRequired)?;
        let phi = self.phi.unwrap_or(1.0);

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        Ok(Forecast::from_values(
            (1..=horizon)
                .map(|h| level + damped_sum(phi, h) * trend)
                .collect(),
        ))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let point = self.predict(horizon)?;
        if horizon == 0 {
            return Ok(point);
        }

        let alpha = self.alpha.ok_or(ForecastError::FitRequired)?;
        let beta = self.beta.ok_or(ForecastError::FitRequired)?;
        let phi = self.phi.unwrap_or(1.0);
        let variance = self.residual_variance.unwrap_or(0.0);
        let z = quantile_normal((1.0 + level) / 2.0);

        let mut factor = 1.0;
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);

        for (i, &pred) in point.primary().iter().enumerate() {
            if i > 0 {
                factor += (alpha * (1.0 + beta * damped_sum(phi, i))).powi(2);
            }
            let se = (variance * factor).sqrt();
            lower.push(pred - z * se);
            upper.push(pred + z * se);
        }

        Ok(Forecast::from_values_with_intervals(
            point.into_values(),
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
        if self.phi.is_some() {
            "DoubleExponentialSmoothing(damped)"
        } else {
            "DoubleExponentialSmoothing"
        }
    }
}
