//! End-to-end smoothing study.
//!
//! [`run_study`] runs the fixed sequence of the CO2 analysis: prepare the
//! series, test stationarity, decompose, split off a holdout, then for each
//! of SES, DES and Holt-Winters score a baseline fit, grid-search the
//! smoothing weights and refit with the winners.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::config::StudyConfig;
use crate::core::{MissingValuePolicy, TimeSeries};
use crate::decomposition::{seasonal_decompose, Decomposition, DecompositionModel};
use crate::error::{ForecastError, Result};
use crate::models::exponential::{DoubleExponentialSmoothing, HoltWinters, SimpleExponentialSmoothing};
use crate::models::Forecaster;
use crate::tuning::{
    des_optimizer, ses_optimizer, tes_optimizer, DesParams, SearchOutcome, SesParams, TesGrid,
    TesParams,
};
use crate::utils::metrics::{calculate_metrics, AccuracyMetrics};
use crate::validation::{is_stationary, StationarityVerdict};

/// One holdout period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub timestamp: DateTime<Utc>,
    pub actual: f64,
    pub predicted: f64,
}

/// Summary statistics of the decomposition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionSummary {
    pub model: DecompositionModel,
    pub period: usize,
    pub seasonal_indices: Vec<f64>,
    pub seasonal_mean: f64,
    pub resid_mean: f64,
    pub trend_strength: f64,
    pub seasonal_strength: f64,
}

impl From<&Decomposition> for DecompositionSummary {
    fn from(d: &Decomposition) -> Self {
        Self {
            model: d.model,
            period: d.period,
            seasonal_indices: d.seasonal_indices().to_vec(),
            seasonal_mean: d.seasonal_mean(),
            resid_mean: d.resid_mean(),
            trend_strength: d.trend_strength(),
            seasonal_strength: d.seasonal_strength(),
        }
    }
}

/// Baseline, search and final fit of one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelReport<P> {
    pub name: String,
    pub baseline: P,
    pub baseline_mae: f64,
    pub best: P,
    pub n_trials: usize,
    pub final_mae: f64,
    pub metrics: AccuracyMetrics,
    pub forecast: Vec<ForecastRow>,
}

/// Everything [`run_study`] computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyReport {
    pub n_observations: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub train_end: NaiveDate,
    pub test_start: NaiveDate,
    pub stationarity: StationarityVerdict,
    pub decomposition: DecompositionSummary,
    pub ses: ModelReport<SesParams>,
    pub des: ModelReport<DesParams>,
    pub tes: ModelReport<TesParams>,
}

impl StudyReport {
    /// Name and final MAE of the most accurate model; ties favour the simpler one.
    pub fn best_model(&self) -> (&str, f64) {
        let candidates = [
            (self.ses.name.as_str(), self.ses.final_mae),
            (self.des.name.as_str(), self.des.final_mae),
            (self.tes.name.as_str(), self.tes.final_mae),
        ];
        candidates
            .into_iter()
            .fold(candidates[0], |best, c| if c.1 < best.1 { c } else { best })
    }
}

/// Run the full analysis on `series`.
pub fn run_study(series: &TimeSeries, config: &StudyConfig) -> Result<StudyReport> {
    config.validate()?;

    let prepared = prepare(series, config)?;
    let values = prepared.values();

    let stationarity = is_stationary(values, config.significance)?;
    let decomposition = seasonal_decompose(values, config.seasonal_period, config.decomposition)?;

    let (train, test) = holdout_split(&prepared, config)?;
    let step = test.len();
    let train_end = date_of(&train, train.len() - 1)?;
    let test_start = date_of(&test, 0)?;

    tracing::info!(
        observations = prepared.len(),
        train = train.len(),
        test = step,
        %train_end,
        "holdout split"
    );

    let ses = {
        let baseline = SesParams {
            alpha: config.ses.baseline_alpha,
        };
        let alphas = config.ses.alpha.values()?;
        let outcome = ses_optimizer(&train, test.values(), &alphas, step)?;
        model_report(&train, &test, baseline, outcome, |p| {
            SimpleExponentialSmoothing::new(p.alpha)
        })?
    };

    let des = {
        let baseline = DesParams {
            alpha: config.des.baseline_alpha,
            beta: config.des.baseline_beta,
        };
        let alphas = config.des.alpha.values()?;
        let betas = config.des.beta.values()?;
        let outcome = des_optimizer(&train, test.values(), &alphas, &betas, step)?;
        model_report(&train, &test, baseline, outcome, |p| {
            DoubleExponentialSmoothing::new(p.alpha, p.beta)
        })?
    };

    let tes = {
        let tes = &config.tes;
        let baseline = TesParams {
            alpha: tes.baseline_alpha,
            beta: tes.baseline_beta,
            gamma: tes.baseline_gamma,
        };
        let combos = TesGrid::from_ranges(&tes.alpha, &tes.beta, &tes.gamma)?.product();
        let period = config.seasonal_period;
        let kind = tes.seasonal_type;
        let outcome = tes_optimizer(&train, test.values(), &combos, step, period, kind)?;
        model_report(&train, &test, baseline, outcome, |p| {
            HoltWinters::new(p.alpha, p.beta, p.gamma, period, kind)
        })?
    };

    let report = StudyReport {
        n_observations: prepared.len(),
        train_size: train.len(),
        test_size: step,
        train_end,
        test_start,
        stationarity,
        decomposition: DecompositionSummary::from(&decomposition),
        ses,
        des,
        tes,
    };

    let (best, mae) = report.best_model();
    tracing::info!(best, mae, "study complete");

    Ok(report)
}

/// Resample if configured and back-fill gaps.
fn prepare(series: &TimeSeries, config: &StudyConfig) -> Result<TimeSeries> {
    let series = if config.resample_monthly {
        series.resample_monthly_mean()?
    } else {
        series.clone()
    };

    let filled = series.sanitized(MissingValuePolicy::BackwardFill)?;
    let remaining = filled.missing_count();
    if remaining > 0 {
        tracing::warn!(remaining, "trailing values missing after back-fill");
        return Err(ForecastError::MissingValues);
    }
    Ok(filled)
}

fn holdout_split(series: &TimeSeries, config: &StudyConfig) -> Result<(TimeSeries, TimeSeries)> {
    match (config.test_size, config.train_end) {
        (Some(size), _) => {
            if size >= series.len() {
                return Err(ForecastError::InsufficientData {
                    needed: size + 1,
                    got: series.len(),
                });
            }
            series.split_at(series.len() - size)
        }
        (None, Some(date)) => series.split_at_date(date),
        (None, None) => Err(ForecastError::Config(
            "either train_end or test_size is required".into(),
        )),
    }
}

fn date_of(series: &TimeSeries, index: usize) -> Result<NaiveDate> {
    series
        .timestamps()
        .get(index)
        .map(|t| t.date_naive())
        .ok_or(ForecastError::IndexOutOfBounds {
            index,
            size: series.len(),
        })
}

/// Fit `model` on `train` and forecast the length of `test`.
fn holdout_forecast<M: Forecaster>(
    model: &mut M,
    train: &TimeSeries,
    test: &TimeSeries,
) -> Result<Vec<f64>> {
    model.fit(train)?;
    Ok(model.predict(test.len())?.into_values())
}

fn model_report<P, F, M>(
    train: &TimeSeries,
    test: &TimeSeries,
    baseline: P,
    outcome: SearchOutcome<P>,
    build: F,
) -> Result<ModelReport<P>>
where
    F: Fn(&P) -> M,
    M: Forecaster,
{
    let mut baseline_model = build(&baseline);
    let baseline_pred = holdout_forecast(&mut baseline_model, train, test)?;
    let baseline_mae = calculate_metrics(test.values(), &baseline_pred)?.mae;

    let mut model = build(&outcome.best);
    let predicted = holdout_forecast(&mut model, train, test)?;
    let metrics = calculate_metrics(test.values(), &predicted)?;

    tracing::info!(
        model = model.name(),
        baseline_mae,
        final_mae = metrics.mae,
        "model evaluated"
    );

    let forecast = test
        .timestamps()
        .iter()
        .zip(test.values())
        .zip(&predicted)
        .map(|((&timestamp, &actual), &predicted)| ForecastRow {
            timestamp,
            actual,
            predicted,
        })
        .collect();

    Ok(ModelReport {
        name: model.name().to_string(),
        baseline,
        baseline_mae,
        n_trials: outcome.num_trials(),
        best: outcome.best,
        final_mae: metrics.mae,
        metrics,
        forecast,
    })
}
