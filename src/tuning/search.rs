//! Exhaustive holdout search over smoothing weights.
//!
//! Every candidate is fitted on the training series, forecast over the
//! holdout horizon and scored by mean absolute error against the holdout.

use std::fmt::Debug;

use serde::Serialize;

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::exponential::{
    DoubleExponentialSmoothing, HoltWinters, SeasonalType, SimpleExponentialSmoothing,
};
use crate::models::Forecaster;
use crate::tuning::grid::{DesParams, SesParams, TesParams};
use crate::utils::metrics::mean_absolute_error;

/// Score of one candidate. `mae` is NaN when the candidate failed to fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial<P> {
    pub params: P,
    pub mae: f64,
}

/// Result of a grid search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome<P> {
    /// First candidate reaching the lowest holdout MAE.
    pub best: P,
    pub best_mae: f64,
    /// Every candidate in grid order.
    pub trials: Vec<Trial<P>>,
}

impl<P> SearchOutcome<P> {
    pub fn num_trials(&self) -> usize {
        self.trials.len()
    }
}

/// Search `candidates` for the lowest holdout MAE.
///
/// `build` turns a candidate into an unfitted model. Ties keep the earlier
/// candidate; candidates that fail to fit or score a non-finite MAE are
/// recorded but never selected.
pub fn grid_search<P, F, M>(
    train: &TimeSeries,
    test: &[f64],
    candidates: &[P],
    step: usize,
    build: F,
) -> Result<SearchOutcome<P>>
where
    P: Clone + Debug,
    F: Fn(&P) -> M,
    M: Forecaster,
{
    if candidates.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "parameter grid is empty".into(),
        ));
    }
    if step != test.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: test.len(),
            got: step,
        });
    }

    let mut trials = Vec::with_capacity(candidates.len());
    let mut best: Option<(usize, f64)> = None;
    let mut name = String::new();

    for (index, params) in candidates.iter().enumerate() {
        let mut model = build(params);
        let mae = match score(&mut model, train, test, step) {
            Ok(mae) => mae,
            Err(error) => {
                tracing::debug!(?params, %error, "candidate failed");
                f64::NAN
            }
        };
        if name.is_empty() {
            name = model.name().to_string();
        }

        tracing::debug!(?params, mae, "grid trial");

        if mae.is_finite() && best.map_or(true, |(_, b)| mae < b) {
            best = Some((index, mae));
        }
        trials.push(Trial {
            params: params.clone(),
            mae,
        });
    }

    let (index, best_mae) = best.ok_or_else(|| {
        ForecastError::ComputationError("no candidate produced a finite MAE".into())
    })?;
    let best = candidates[index].clone();

    tracing::info!(
        model = %name,
        params = ?best,
        mae = best_mae,
        trials = trials.len(),
        "grid search winner"
    );

    Ok(SearchOutcome {
        best,
        best_mae,
        trials,
    })
}

fn score<M: Forecaster>(
    model: &mut M,
    train: &TimeSeries,
    test: &[f64],
    step: usize,
) -> Result<f64> {
    model.fit(train)?;
    let forecast = model.predict(step)?;
    mean_absolute_error(test, forecast.primary())
}

/// Search the SES smoothing weight.
pub fn ses_optimizer(
    train: &TimeSeries,
    test: &[f64],
    alphas: &[f64],
    step: usize,
) -> Result<SearchOutcome<SesParams>> {
    let candidates: Vec<SesParams> = alphas.iter().map(|&alpha| SesParams { alpha }).collect();
    grid_search(train, test, &candidates, step, |p| {
        SimpleExponentialSmoothing::new(p.alpha)
    })
}

/// Search level and trend weights of double exponential smoothing.
pub fn des_optimizer(
    train: &TimeSeries,
    test: &[f64],
    alphas: &[f64],
    betas: &[f64],
    step: usize,
) -> Result<SearchOutcome<DesParams>> {
    let candidates: Vec<DesParams> = alphas
        .iter()
        .flat_map(|&alpha| betas.iter().map(move |&beta| DesParams { alpha, beta }))
        .collect();
    grid_search(train, test, &candidates, step, |p| {
        DoubleExponentialSmoothing::new(p.alpha, p.beta)
    })
}

/// Search all three Holt-Winters weights over precomputed combinations.
pub fn tes_optimizer(
    train: &TimeSeries,
    test: &[f64],
    combos: &[TesParams],
    step: usize,
    period: usize,
    seasonal_type: SeasonalType,
) -> Result<SearchOutcome<TesParams>> {
    grid_search(train, test, combos, step, |p| {
        HoltWinters::new(p.alpha, p.beta, p.gamma, period, seasonal_type)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::grid::{arange, TesGrid};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn seasonal(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 320.0 + 0.1 * i as f64 + 2.5 * (2.0 * PI * i as f64 / 12.0).sin())
            .collect()
    }

    #[test]
    fn ses_search_prefers_fast_adaptation_after_level_shift() {
        let train = TimeSeries::from_values(vec![10.0, 10.0, 10.0, 20.0]).unwrap();
        let test = [20.0, 20.0];
        let alphas = [0.1, 0.5, 0.9];

        let outcome = ses_optimizer(&train, &test, &alphas, 2).unwrap();

        assert_eq!(outcome.best, SesParams { alpha: 0.9 });
        // level after the shift is 10 + 0.9 × 10 = 19
        assert_relative_eq!(outcome.best_mae, 1.0, epsilon = 1e-9);
        assert_eq!(outcome.num_trials(), 3);
        assert_relative_eq!(outcome.trials[0].mae, 9.0, epsilon = 1e-9);
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let train = TimeSeries::from_values(vec![5.0; 6]).unwrap();
        let test = [5.0, 5.0, 5.0];
        let outcome = ses_optimizer(&train, &test, &[0.3, 0.6, 0.9], 3).unwrap();

        assert_eq!(outcome.best.alpha, 0.3);
        assert_eq!(outcome.best_mae, 0.0);
    }

    #[test]
    fn des_search_covers_product_in_order() {
        let train = TimeSeries::from_values((0..20).map(|i| 2.0 * i as f64).collect()).unwrap();
        let test: Vec<f64> = (20..25).map(|i| 2.0 * i as f64).collect();
        let alphas = arange(0.01, 1.0, 0.10).unwrap();
        let betas = arange(0.01, 1.0, 0.10).unwrap();

        let outcome = des_optimizer(&train, &test, &alphas, &betas, 5).unwrap();

        assert_eq!(outcome.num_trials(), 100);
        assert_eq!(outcome.trials[1].params.alpha, alphas[0]);
        assert_eq!(outcome.trials[1].params.beta, betas[1]);
        // A straight line is extrapolated exactly by every candidate
        assert!(outcome.best_mae < 1e-9);
    }

    #[test]
    fn tes_search_beats_baseline() {
        let values = seasonal(84);
        let ts = TimeSeries::from_values(values).unwrap();
        let (train, test) = ts.split_at(72).unwrap();

        let range = arange(0.2, 1.0, 0.2).unwrap();
        let grid = TesGrid {
            alphas: range.clone(),
            betas: range.clone(),
            gammas: range,
        };
        assert_eq!(grid.alphas.len(), 4);
        let combos = grid.product();

        let outcome = tes_optimizer(
            &train,
            test.values(),
            &combos,
            12,
            12,
            SeasonalType::Additive,
        )
        .unwrap();

        let mid = grid.alphas[2];
        let mut baseline = HoltWinters::additive(mid, mid, mid, 12);
        baseline.fit(&train).unwrap();
        let baseline_mae =
            mean_absolute_error(test.values(), baseline.predict(12).unwrap().primary()).unwrap();

        assert_eq!(outcome.num_trials(), 64);
        assert!(outcome.best_mae <= baseline_mae);
        let min = outcome
            .trials
            .iter()
            .map(|t| t.mae)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(outcome.best_mae, min);
    }

    #[test]
    fn failing_candidates_are_recorded_not_selected() {
        // Period 30 needs 60 points; period 12 fits
        let ts = TimeSeries::from_values(seasonal(48)).unwrap();
        let (train, test) = ts.split_at(40).unwrap();
        let combos = [TesParams {
            alpha: 0.5,
            beta: 0.1,
            gamma: 0.5,
        }];

        let result = tes_optimizer(&train, test.values(), &combos, 8, 30, SeasonalType::Additive);
        assert!(matches!(result, Err(ForecastError::ComputationError(_))));

        let candidates = [30usize, 12];
        let outcome = grid_search(&train, test.values(), &candidates, 8, |&period| {
            HoltWinters::additive(0.5, 0.1, 0.5, period)
        })
        .unwrap();
        assert!(outcome.trials[0].mae.is_nan());
        assert_eq!(outcome.best, 12);
    }

    #[test]
    fn horizon_must_match_holdout() {
        let train = TimeSeries::from_values(vec![1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(
            ses_optimizer(&train, &[4.0, 5.0], &[0.5], 3),
            Err(ForecastError::DimensionMismatch {
                expected: 2,
                got: 3
            })
        ));
        assert!(matches!(
            ses_optimizer(&train, &[4.0], &[], 1),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
