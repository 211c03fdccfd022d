//! Parameter grids for the smoothing weight searches.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Evenly spaced values in the half-open interval `[start, stop)`.
///
/// The count is `ceil((stop - start) / step)` and the values are
/// `start + i × step`, so the grid never includes `stop` itself.
///
/// # Example
/// ```
/// use smoothcast::tuning::arange;
///
/// let alphas = arange(0.8, 1.0, 0.01).unwrap();
/// assert_eq!(alphas.len(), 20);
/// assert!((alphas[19] - 0.99).abs() < 1e-12);
/// ```
pub fn arange(start: f64, stop: f64, step: f64) -> Result<Vec<f64>> {
    if !(step.is_finite() && step > 0.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "grid step must be positive, got {step}"
        )));
    }
    if !start.is_finite() || !stop.is_finite() {
        return Err(ForecastError::InvalidParameter(
            "grid bounds must be finite".into(),
        ));
    }

    let count = ((stop - start) / step).ceil().max(0.0) as usize;
    Ok((0..count).map(|i| start + i as f64 * step).collect())
}

/// A `[start, stop)` range sampled every `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl ParamRange {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// Materialize the grid, see [`arange`].
    pub fn values(&self) -> Result<Vec<f64>> {
        arange(self.start, self.stop, self.step)
    }
}

/// Smoothing weights of simple exponential smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SesParams {
    pub alpha: f64,
}

/// Smoothing weights of double exponential smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesParams {
    pub alpha: f64,
    pub beta: f64,
}

/// Smoothing weights of Holt-Winters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TesParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// Per-weight value lists whose cartesian product is searched for Holt-Winters.
#[derive(Debug, Clone, PartialEq)]
pub struct TesGrid {
    pub alphas: Vec<f64>,
    pub betas: Vec<f64>,
    pub gammas: Vec<f64>,
}

impl TesGrid {
    pub fn from_ranges(alpha: &ParamRange, beta: &ParamRange, gamma: &ParamRange) -> Result<Self> {
        Ok(Self {
            alphas: alpha.values()?,
            betas: beta.values()?,
            gammas: gamma.values()?,
        })
    }

    /// Every `(alpha, beta, gamma)` combination, alpha varying slowest.
    pub fn product(&self) -> Vec<TesParams> {
        let mut combos =
            Vec::with_capacity(self.alphas.len() * self.betas.len() * self.gammas.len());
        for &alpha in &self.alphas {
            for &beta in &self.betas {
                for &gamma in &self.gammas {
                    combos.push(TesParams { alpha, beta, gamma });
                }
            }
        }
        combos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn arange_reference_grids() {
        let ses = arange(0.8, 1.0, 0.01).unwrap();
        assert_eq!(ses.len(), 20);
        assert_relative_eq!(ses[0], 0.8);

        let des = arange(0.01, 1.0, 0.10).unwrap();
        assert_eq!(des.len(), 10);
        assert_relative_eq!(des[9], 0.91, epsilon = 1e-12);

        let tes = arange(0.20, 1.0, 0.10).unwrap();
        assert_eq!(tes.len(), 8);
        assert_relative_eq!(tes[7], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn arange_excludes_stop() {
        assert_eq!(arange(0.0, 3.0, 1.0).unwrap(), vec![0.0, 1.0, 2.0]);
        assert!(arange(1.0, 1.0, 0.1).unwrap().is_empty());
        assert!(arange(2.0, 1.0, 0.1).unwrap().is_empty());
    }

    #[test]
    fn arange_rejects_bad_step() {
        assert!(matches!(
            arange(0.0, 1.0, 0.0),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(matches!(
            arange(0.0, 1.0, -0.1),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(arange(0.0, f64::NAN, 0.1).is_err());
    }

    #[test]
    fn tes_product_order_and_size() {
        let grid = TesGrid {
            alphas: vec![0.1, 0.2],
            betas: vec![0.3, 0.4],
            gammas: vec![0.5, 0.6, 0.7],
        };
        let combos = grid.product();
        assert_eq!(combos.len(), 12);
        assert_eq!(
            combos[0],
            TesParams {
                alpha: 0.1,
                beta: 0.3,
                gamma: 0.5
            }
        );
        assert_eq!(
            combos[1],
            TesParams {
                alpha: 0.1,
                beta: 0.3,
                gamma: 0.6
            }
        );
        assert_eq!(combos[11].alpha, 0.2);
    }

    #[test]
    fn reference_tes_grid_has_512_combinations() {
        let range = ParamRange::new(0.20, 1.0, 0.10);
        let grid = TesGrid::from_ranges(&range, &range, &range).unwrap();
        assert_eq!(grid.product().len(), 512);
    }
}
