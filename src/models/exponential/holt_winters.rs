//! Holt-Winters triple exponential smoothing.
//!
//! Level, additive trend and a seasonal component repeating every `period`
//! observations. This is the model that captures the yearly cycle of the
//! monthly CO2 record.

use serde::{Deserialize, Serialize};

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::exponential::{check_finite, clamp_smoothing, SMOOTHING_BOUNDS};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::quantile_normal;

/// How the seasonal component combines with level and trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalType {
    /// `y_t = l_t + b_t + s_t + e_t`
    #[default]
    Additive,
    /// `y_t = (l_t + b_t) s_t + e_t`
    Multiplicative,
}

/// Holt-Winters forecaster.
///
/// Additive form:
/// - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
/// - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{n+h} = l_n + h b_n + s_{n+h-m}`
///
/// The multiplicative form divides by the seasonal index where the
/// additive form subtracts it.
///
/// The first season seeds the state: its mean is the initial level, the
/// average per-step change between the first two seasons is the initial
/// trend, and the seasonal indices are the first season's deviations from
/// the level, normalized to sum to zero (additive) or average to one
/// (multiplicative).
#[derive(Debug, Clone)]
pub struct HoltWinters {
    alpha: Option<f64>,
    beta: Option<f64>,
    gamma: Option<f64>,
    seasonal_period: usize,
    seasonal_type: SeasonalType,
    optimize: bool,
    level: Option<f64>,
    trend: Option<f64>,
    /// Seasonal indices by position within the cycle.
    seasonals: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    sse: Option<f64>,
    /// Length of the training series, used to align forecast seasons.
    n: usize,
}

/// Result of one pass of the recursion.
struct SeasonalPass {
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
    /// One-step predictions; the first season holds the observations.
    fitted: Vec<f64>,
    sse: f64,
}

#[derive(Debug, Clone, Copy)]
struct Weights {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

fn initial_state(values: &[f64], period: usize, kind: SeasonalType) -> (f64, f64, Vec<f64>) {
    let first = &values[..period];
    let level = first.iter().sum::<f64>() / period as f64;

    let trend = (0..period)
        .map(|i| values[period + i] - values[i])
        .sum::<f64>()
        / (period * period) as f64;

    let mut seasonals: Vec<f64> = match kind {
        SeasonalType::Additive => first.iter().map(|y| y - level).collect(),
        SeasonalType::Multiplicative => first.iter().map(|y| y / level).collect(),
    };

    let mean = seasonals.iter().sum::<f64>() / period as f64;
    match kind {
        SeasonalType::Additive => seasonals.iter_mut().for_each(|s| *s -= mean),
        SeasonalType::Multiplicative => seasonals.iter_mut().for_each(|s| *s /= mean),
    }

    (level, trend, seasonals)
}

fn run_recursion(values: &[f64], period: usize, kind: SeasonalType, w: Weights) -> SeasonalPass {
    let (mut level, mut trend, mut seasonals) = initial_state(values, period, kind);
    let mut fitted: Vec<f64> = values[..period].to_vec();
    fitted.reserve(values.len() - period);
    let mut sse = 0.0;

    for (t, &y) in values.iter().enumerate().skip(period) {
        let idx = t % period;
        let s = seasonals[idx];

        let forecast = match kind {
            SeasonalType::Additive => level + trend + s,
            SeasonalType::Multiplicative => (level + trend) * s,
        };
        fitted.push(forecast);
        sse += (y - forecast).powi(2);

        let previous = level;
        match kind {
            SeasonalType::Additive => {
                level = w.alpha * (y - s) + (1.0 - w.alpha) * (previous + trend);
                trend = w.beta * (level - previous) + (1.0 - w.beta) * trend;
                seasonals[idx] = w.gamma * (y - level) + (1.0 - w.gamma) * s;
            }
            SeasonalType::Multiplicative => {
                level = w.alpha * (y / s) + (1.0 - w.alpha) * (previous + trend);
                trend = w.beta * (level - previous) + (1.0 - w.beta) * trend;
                seasonals[idx] = w.gamma * (y / level) + (1.0 - w.gamma) * s;
            }
        }
    }

    SeasonalPass {
        level,
        trend,
        seasonals,
        fitted,
        sse,
    }
}

impl HoltWinters {
    /// Create a model with fixed smoothing weights.
    pub fn new(
        alpha: f64,
        beta: f64,
        gamma: f64,
        seasonal_period: usize,
        seasonal_type: SeasonalType,
    ) -> Self {
        Self {
            alpha: Some(clamp_smoothing(alpha)),
            beta: Some(clamp_smoothing(beta)),
            gamma: Some(clamp_smoothing(gamma)),
            seasonal_period,
            seasonal_type,
            optimize: false,
            level: None,
            trend: None,
            seasonals: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
            sse: None,
            n: 0,
        }
    }

    /// Additive seasonality with fixed weights.
    ///
    /// # Example
    /// ```
    /// use smoothcast::core::TimeSeries;
    /// use smoothcast::models::exponential::HoltWinters;
    /// use smoothcast::models::Forecaster;
    ///
    /// let values: Vec<f64> = (0..36)
    ///     .map(|i| 320.0 + 0.1 * i as f64 + if i % 12 < 6 { 2.0 } else { -2.0 })
    ///     .collect();
    /// let ts = TimeSeries::from_values(values).unwrap();
    ///
    /// let mut model = HoltWinters::additive(0.5, 0.5, 0.5, 12);
    /// model.fit(&ts).unwrap();
    /// assert_eq!(model.predict(24).unwrap().horizon(), 24);
    /// ```
    pub fn additive(alpha: f64, beta: f64, gamma: f64, seasonal_period: usize) -> Self {
        Self::new(alpha, beta, gamma, seasonal_period, SeasonalType::Additive)
    }

    /// Multiplicative seasonality with fixed weights.
    pub fn multiplicative(alpha: f64, beta: f64, gamma: f64, seasonal_period: usize) -> Self {
        Self::new(
            alpha,
            beta,
            gamma,
            seasonal_period,
            SeasonalType::Multiplicative,
        )
    }

    /// Weights chosen by minimizing the in-sample SSE.
    pub fn auto(seasonal_period: usize, seasonal_type: SeasonalType) -> Self {
        Self {
            alpha: None,
            beta: None,
            gamma: None,
            optimize: true,
            ..Self::new(0.5, 0.5, 0.5, seasonal_period, seasonal_type)
        }
    }

    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn beta(&self) -> Option<f64> {
        self.beta
    }

    pub fn gamma(&self) -> Option<f64> {
        self.gamma
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    pub fn seasonal_type(&self) -> SeasonalType {
        self.seasonal_type
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    pub fn trend(&self) -> Option<f64> {
        self.trend
    }

    pub fn seasonals(&self) -> Option<&[f64]> {
        self.seasonals.as_deref()
    }

    /// Sum of squared one-step errors after the first season.
    pub fn sse(&self) -> Option<f64> {
        self.sse
    }

    fn validate(&self, values: &[f64]) -> Result<()> {
        let period = self.seasonal_period;
        if period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {period}"
            )));
        }
        if values.len() < 2 * period {
            return Err(ForecastError::InsufficientData {
                needed: 2 * period,
                got: values.len(),
            });
        }
        check_finite(values)?;
        if self.seasonal_type == SeasonalType::Multiplicative && values.iter().any(|&v| v <= 0.0)
        {
            return Err(ForecastError::InvalidParameter(
                "multiplicative seasonality requires strictly positive data".into(),
            ));
        }
        Ok(())
    }

    fn optimize_weights(values: &[f64], period: usize, kind: SeasonalType) -> Weights {
        let config = NelderMeadConfig {
            max_iter: 1000,
            tolerance: 1e-8,
            ..Default::default()
        };

        let result = nelder_mead(
            |p| {
                let w = Weights {
                    alpha: p[0],
                    beta: p[1],
                    gamma: p[2],
                };
                let sse = run_recursion(values, period, kind, w).sse;
                if sse.is_finite() {
                    sse
                } else {
                    f64::MAX
                }
            },
            &[0.3, 0.1, 0.1],
            Some(&[SMOOTHING_BOUNDS; 3]),
            config,
        );

        Weights {
            alpha: clamp_smoothing(result.optimal_point[0]),
            beta: clamp_smoothing(result.optimal_point[1]),
            gamma: clamp_smoothing(result.optimal_point[2]),
        }
    }

    fn point_forecast(&self, level: f64, trend: f64, seasonals: &[f64], h: usize) -> f64 {
        let s = seasonals[(self.n + h - 1) % self.seasonal_period];
        let base = level + h as f64 * trend;
        match self.seasonal_type {
            SeasonalType::Additive => base + s,
            SeasonalType::Multiplicative => base * s,
        }
    }
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self::auto(12, SeasonalType::Additive)
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        self.validate(values)?;

        let period = self.seasonal_period;
        if self.optimize {
            let w = Self::optimize_weights(values, period, self.seasonal_type);
            self.alpha = Some(w.alpha);
            self.beta = Some(w.beta);
            self.gamma = Some(w.gamma);
        }

        let weights = Weights {
            alpha: self.alpha.ok_or(ForecastError::FitRequired)?,
            beta: self.beta.ok_or(ForecastError::FitRequired)?,
            gamma: self.gamma.ok_or(ForecastError::FitRequired)?,
        };

        let pass = run_recursion(values, period, self.seasonal_type, weights);
        let residuals: Vec<f64> = values
            .iter()
            .zip(&pass.fitted)
            .map(|(y, f)| y - f)
            .collect();

        tracing::debug!(
            alpha = weights.alpha,
            beta = weights.beta,
            gamma = weights.gamma,
            period,
            level = pass.level,
            trend = pass.trend,
            sse = pass.sse,
            "fitted Holt-Winters"
        );

        self.n = values.len();
        self.residual_variance = Some(pass.sse / (values.len() - period) as f64);
        self.level = Some(pass.level);
        self.trend = Some(pass.trend);
        self.sse = Some(pass.sse);
        self.seasonals = Some(pass.seasonals);
        self.fitted = Some(pass.fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let level = self.level.ok_or(ForecastError::FitRequired)?;
        let trend = self.trend.ok_or(ForecastError::FitRequired)?;
        let seasonals = self.seasonals.as_deref().ok_or(ForecastError::FitRequired)?;

        Ok(Forecast::from_values(
            (1..=horizon)
                .map(|h| self.point_forecast(level, trend, seasonals, h))
                .collect(),
        ))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let point = self.predict(horizon)?;
        if horizon == 0 {
            return Ok(point);
        }

        let variance = self.residual_variance.unwrap_or(0.0);
        let z = quantile_normal((1.0 + level) / 2.0);
        let period = self.seasonal_period;

        // Widen once per completed seasonal cycle
        let (lower, upper): (Vec<f64>, Vec<f64>) = point
            .primary()
            .iter()
            .enumerate()
            .map(|(i, &pred)| {
                let cycles = (i / period + 1) as f64;
                let se = (variance * cycles).sqrt();
                (pred - z * se, pred + z * se)
            })
            .unzip();

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
        match self.seasonal_type {
            SeasonalType::Additive => "HoltWinters(additive)",
            SeasonalType::Multiplicative => "HoltWinters(multiplicative)",
        }
    }
}
