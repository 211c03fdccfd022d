//! Augmented Dickey-Fuller unit-root test.
//!
//! The test regresses the differenced series on its lagged level, optional
//! deterministic terms and lagged differences:
//!
//! `Δy_t = c [+ δ t] + ρ y_{t-1} + Σ γ_i Δy_{t-i} + ε_t`
//!
//! and reports the t-statistic of `ρ`. Under H0 (`ρ = 0`) the series has a
//! unit root and is non-stationary. P-values follow MacKinnon's (1994)
//! response surface and critical values his (2010) finite-sample tables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::utils::ols::{ols, OlsFit};
use crate::utils::stats::normal_cdf;

/// Deterministic terms included in the test regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdfRegression {
    /// Constant only.
    #[default]
    Constant,
    /// Constant and linear time trend.
    ConstantTrend,
}

impl AdfRegression {
    fn num_deterministic(self) -> usize {
        match self {
            Self::Constant => 1,
            Self::ConstantTrend => 2,
        }
    }
}

/// Lag order selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Autolag {
    /// Minimize the Akaike information criterion.
    #[default]
    Aic,
    /// Minimize the Bayesian information criterion.
    Bic,
    /// Use the maximum lag as given.
    Fixed,
}

/// Settings for [`adf_test`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdfConfig {
    /// Largest lagged difference considered; `None` uses `ceil(12 (n/100)^(1/4))`.
    pub max_lag: Option<usize>,
    pub autolag: Autolag,
    pub regression: AdfRegression,
}

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

/// Outcome of an ADF test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdfResult {
    /// t-statistic of the lagged level coefficient.
    pub statistic: f64,
    /// MacKinnon approximate p-value.
    pub p_value: f64,
    /// Number of lagged differences in the final regression.
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
    pub critical_values: CriticalValues,
    /// Best information criterion value; `None` when the lag was fixed.
    pub ic_best: Option<f64>,
}

impl AdfResult {
    /// Whether H0 (unit root) is rejected at `significance`.
    pub fn is_stationary(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

/// Stationarity decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stationarity {
    Stationary,
    NonStationary,
}

/// Stationarity decision at a significance level, with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityVerdict {
    pub verdict: Stationarity,
    pub p_value: f64,
    pub statistic: f64,
    pub significance: f64,
}

impl StationarityVerdict {
    /// Decide from a finished test at `significance`.
    pub fn from_adf(result: &AdfResult, significance: f64) -> Self {
        let verdict = if result.is_stationary(significance) {
            Stationarity::Stationary
        } else {
            Stationarity::NonStationary
        };
        Self {
            verdict,
            p_value: result.p_value,
            statistic: result.statistic,
            significance,
        }
    }

    pub fn is_stationary(&self) -> bool {
        self.verdict == Stationarity::Stationary
    }
}

impl fmt::Display for StationarityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.verdict {
            Stationarity::Stationary => "Stationary",
            Stationarity::NonStationary => "Non-stationary",
        };
        write!(
            f,
            "Result: {label} (H0: non-stationary, p-value: {:.3})",
            self.p_value
        )
    }
}

/// Run the default ADF test (AIC lag selection, constant) and decide.
///
/// # Example
/// ```
/// use smoothcast::validation::is_stationary;
///
/// // Deterministic pseudo-noise around zero
/// let series: Vec<f64> = (0..200)
///     .map(|i| ((i * 17 + 13) % 97) as f64 / 50.0 - 1.0)
///     .collect();
/// let verdict = is_stationary(&series, 0.05).unwrap();
/// assert!(verdict.is_stationary());
/// ```
pub fn is_stationary(series: &[f64], significance: f64) -> Result<StationarityVerdict> {
    let result = adf_test(series, &AdfConfig::default())?;
    let verdict = StationarityVerdict::from_adf(&result, significance);

    tracing::info!(
        statistic = result.statistic,
        p_value = result.p_value,
        used_lag = result.used_lag,
        verdict = ?verdict.verdict,
        "ADF stationarity test"
    );

    Ok(verdict)
}

/// Augmented Dickey-Fuller test for a unit root.
///
/// With lag selection, every lag order `0..=max_lag` is fitted on the same
/// trailing sample so the information criteria are comparable; the selected
/// order is then refitted on all observations it can use.
pub fn adf_test(series: &[f64], config: &AdfConfig) -> Result<AdfResult> {
    const MIN_OBS: usize = 6;

    let n = series.len();
    if n < MIN_OBS {
        return Err(ForecastError::InsufficientData {
            needed: MIN_OBS,
            got: n,
        });
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::MissingValues);
    }

    let (min, max) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if max == min {
        return Err(ForecastError::ComputationError(
            "ADF test is undefined for a constant series".into(),
        ));
    }

    let ntrend = config.regression.num_deterministic();
    let lag_cap = (n / 2)
        .checked_sub(ntrend + 1)
        .ok_or(ForecastError::InsufficientData {
            needed: 2 * (ntrend + 1),
            got: n,
        })?;

    let max_lag = match config.max_lag {
        Some(lag) if lag > lag_cap => {
            return Err(ForecastError::InvalidParameter(format!(
                "max_lag {lag} exceeds the largest usable lag {lag_cap} for {n} observations"
            )));
        }
        Some(lag) => lag,
        None => default_max_lag(n).min(lag_cap),
    };

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let (used_lag, ic_best) = match config.autolag {
        Autolag::Fixed => (max_lag, None),
        criterion => {
            let (lag, ic) = select_lag(series, &diff, max_lag, config.regression, criterion)?;
            (lag, Some(ic))
        }
    };

    let fit = regress(series, &diff, used_lag, used_lag, config.regression)?;
    let statistic = fit.t_value(ntrend);
    let nobs = fit.nobs;

    tracing::debug!(statistic, used_lag, nobs, max_lag, "ADF regression fitted");

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic, config.regression),
        used_lag,
        nobs,
        critical_values: mackinnon_critical_values(nobs, config.regression),
        ic_best,
    })
}

/// Schwert's rule `ceil(12 (n/100)^(1/4))`.
fn default_max_lag(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize
}

/// Fit the test regression with `lags` lagged differences, using the
/// differences from index `start` onwards as the dependent variable.
///
/// Column order: constant, optional trend, lagged level, lagged differences.
fn regress(
    series: &[f64],
    diff: &[f64],
    lags: usize,
    start: usize,
    regression: AdfRegression,
) -> Result<OlsFit> {
    let rows = diff.len() - start;
    let mut columns = Vec::with_capacity(regression.num_deterministic() + 1 + lags);

    columns.push(vec![1.0; rows]);
    if regression == AdfRegression::ConstantTrend {
        columns.push((1..=rows).map(|t| t as f64).collect());
    }
    columns.push(series[start..diff.len()].to_vec());
    for i in 1..=lags {
        columns.push(diff[start - i..diff.len() - i].to_vec());
    }

    ols(&diff[start..], &columns)
}

fn select_lag(
    series: &[f64],
    diff: &[f64],
    max_lag: usize,
    regression: AdfRegression,
    criterion: Autolag,
) -> Result<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for lag in 0..=max_lag {
        // A rank-deficient lag order scores +inf and drops out
        let fit = match regress(series, diff, lag, max_lag, regression) {
            Ok(fit) => fit,
            Err(err) => {
                tracing::debug!(lag, error = %err, "ADF lag candidate skipped");
                continue;
            }
        };
        let ic = match criterion {
            Autolag::Bic => fit.bic(),
            _ => fit.aic(),
        };
        tracing::trace!(lag, ic, "ADF lag candidate");

        if ic.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, b)| ic < b) {
            best = Some((lag, ic));
        }
    }

    best.ok_or_else(|| ForecastError::ComputationError("no ADF lag could be evaluated".into()))
}

/// MacKinnon (1994) approximate p-value for a single-series ADF statistic.
pub fn mackinnon_p_value(statistic: f64, regression: AdfRegression) -> f64 {
    // (max, min, star, small-p coefficients, large-p coefficients), ascending powers
    let (max, min, star, small, large): (f64, f64, f64, [f64; 3], [f64; 4]) = match regression {
        AdfRegression::Constant => (
            2.74,
            -18.83,
            -1.61,
            [2.1659, 1.4412, 3.8269e-2],
            [1.7339, 9.3202e-1, -1.2745e-1, -1.0368e-2],
        ),
        AdfRegression::ConstantTrend => (
            0.7,
            -16.18,
            -2.89,
            [3.2512, 1.6047, 4.9588e-2],
            [2.5261, 6.1654e-1, -3.7956e-1, -6.0285e-2],
        ),
    };

    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > max {
        return 1.0;
    }
    if statistic < min {
        return 0.0;
    }

    let z = if statistic <= star {
        polyval(&small, statistic)
    } else {
        polyval(&large, statistic)
    };
    normal_cdf(z)
}

/// MacKinnon (2010) critical values for `nobs` observations.
pub fn mackinnon_critical_values(nobs: usize, regression: AdfRegression) -> CriticalValues {
    let table: [[f64; 4]; 3] = match regression {
        AdfRegression::Constant => [
            [-3.43035, -6.5393, -16.786, -79.433],
            [-2.86154, -2.8903, -4.234, -40.040],
            [-2.56677, -1.5384, -2.809, 0.0],
        ],
        AdfRegression::ConstantTrend => [
            [-3.95877, -9.0531, -28.428, -134.155],
            [-3.41049, -4.3904, -9.036, -45.374],
            [-3.12705, -2.5856, -3.925, -22.380],
        ],
    };

    let inv = 1.0 / nobs as f64;
    CriticalValues {
        cv_1pct: polyval(&table[0], inv),
        cv_5pct: polyval(&table[1], inv),
        cv_10pct: polyval(&table[2], inv),
    }
}

/// Evaluate `c[0] + c[1] x + c[2] x² + ...`.
fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}
