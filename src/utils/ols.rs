//! Ordinary Least Squares regression for the unit-root test regressions.
//!
//! The design matrix is passed column by column; callers add the constant
//! (and any deterministic trend) themselves. Columns are equilibrated to unit
//! norm before the normal equations are solved with a Cholesky factorization,
//! which keeps level regressors around a few hundred well conditioned next to
//! small differenced lags.

use crate::error::{ForecastError, Result};

/// Fitted OLS regression.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Coefficients, one per design column.
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients.
    pub std_errors: Vec<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    /// Number of observations.
    pub nobs: usize,
}

impl OlsFit {
    /// Number of estimated parameters.
    pub fn num_params(&self) -> usize {
        self.coefficients.len()
    }

    /// t-statistic of coefficient `index`.
    pub fn t_value(&self, index: usize) -> f64 {
        match (self.coefficients.get(index), self.std_errors.get(index)) {
            (Some(&b), Some(&se)) if se > 0.0 => b / se,
            _ => f64::NAN,
        }
    }

    /// Gaussian log-likelihood at the OLS estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.num_params() as f64
    }

    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood() + self.num_params() as f64 * (self.nobs as f64).ln()
    }
}

/// Fit `y = X β + ε` where `columns` holds the columns of `X`.
pub fn ols(y: &[f64], columns: &[Vec<f64>]) -> Result<OlsFit> {
    let n = y.len();
    let k = columns.len();

    if k == 0 {
        return Err(ForecastError::InvalidParameter(
            "regression needs at least one column".into(),
        ));
    }
    if n <= k {
        return Err(ForecastError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }
    for column in columns {
        if column.len() != n {
            return Err(ForecastError::DimensionMismatch {
                expected: n,
                got: column.len(),
            });
        }
    }

    let scales: Vec<f64> = columns
        .iter()
        .map(|c| c.iter().map(|x| x * x).sum::<f64>().sqrt())
        .collect();
    if scales.iter().any(|&s| s == 0.0 || !s.is_finite()) {
        return Err(ForecastError::ComputationError(
            "design matrix has a zero or non-finite column".into(),
        ));
    }

    // Normal equations on the equilibrated columns
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for i in 0..k {
        for j in 0..=i {
            let dot: f64 = columns[i]
                .iter()
                .zip(&columns[j])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / (scales[i] * scales[j]);
            xtx[i][j] = dot;
            xtx[j][i] = dot;
        }
        xty[i] = columns[i].iter().zip(y).map(|(a, b)| a * b).sum::<f64>() / scales[i];
    }

    let chol = cholesky(&xtx).ok_or_else(|| {
        ForecastError::ComputationError("regressors are collinear".into())
    })?;

    let scaled_beta = cholesky_solve(&chol, &xty);
    let coefficients: Vec<f64> = scaled_beta
        .iter()
        .zip(&scales)
        .map(|(b, s)| b / s)
        .collect();

    let ssr: f64 = (0..n)
        .map(|t| {
            let fitted: f64 = columns
                .iter()
                .zip(&coefficients)
                .map(|(c, b)| c[t] * b)
                .sum();
            (y[t] - fitted).powi(2)
        })
        .sum();

    let sigma_sq = ssr / (n - k) as f64;

    // Diagonal of (X'X)^-1 via one solve per unit vector
    let std_errors: Vec<f64> = (0..k)
        .map(|i| {
            let mut unit = vec![0.0; k];
            unit[i] = 1.0;
            let column = cholesky_solve(&chol, &unit);
            (sigma_sq * column[i]).sqrt() / scales[i]
        })
        .collect();

    Ok(OlsFit {
        coefficients,
        std_errors,
        ssr,
        nobs: n,
    })
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for p in 0..j {
                sum -= l[i][p] * l[j][p];
            }

            if i == j {
                if sum <= 1e-14 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

/// Solve `L L' x = b`.
fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    x
}
