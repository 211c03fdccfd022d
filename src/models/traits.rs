//! Forecaster trait defining the common interface for all models.

use crate::core::{Forecast, TimeSeries};
use crate::error::Result;

/// Common interface for the smoothing models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with prediction intervals.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon)
    }

    /// Get the fitted values (in-sample one-step predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use smoothcast::models::{BoxedForecaster, Forecaster};
/// use smoothcast::models::exponential::SimpleExponentialSmoothing;
///
/// let model: BoxedForecaster = Box::new(SimpleExponentialSmoothing::new(0.5));
/// assert_eq!(model.name(), "SimpleExponentialSmoothing");
/// ```
pub type BoxedForecaster = Box<dyn Forecaster>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exponential::{
        DoubleExponentialSmoothing, HoltWinters, SimpleExponentialSmoothing,
    };

    fn seasonal_series(n: usize) -> TimeSeries {
        let values = (0..n)
            .map(|i| {
                315.0
                    + 0.1 * i as f64
                    + 3.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin()
            })
            .collect();
        TimeSeries::from_values(values).unwrap()
    }

    #[test]
    fn nested_models_share_the_interface() {
        let ts = seasonal_series(60);
        let mut models: Vec<BoxedForecaster> = vec![
            Box::new(SimpleExponentialSmoothing::new(0.5)),
            Box::new(DoubleExponentialSmoothing::new(0.5, 0.5)),
            Box::new(HoltWinters::additive(0.5, 0.5, 0.5, 12)),
        ];

        for model in models.iter_mut() {
            assert!(!model.is_fitted());
            model.fit(&ts).unwrap();
            assert!(model.is_fitted());
            assert_eq!(model.predict(48).unwrap().horizon(), 48);
            assert_eq!(model.residuals().unwrap().len(), 60);
        }
    }

    #[test]
    fn default_intervals_fall_back_to_points() {
        struct Constant;

        impl Forecaster for Constant {
            fn fit(&mut self, _series: &TimeSeries) -> Result<()> {
                Ok(())
            }
            fn predict(&self, horizon: usize) -> Result<Forecast> {
                Ok(Forecast::from_values(vec![1.0; horizon]))
            }
            fn fitted_values(&self) -> Option<&[f64]> {
                None
            }
            fn residuals(&self) -> Option<&[f64]> {
                None
            }
            fn name(&self) -> &str {
                "Constant"
            }
        }

        let forecast = Constant.predict_with_intervals(3, 0.95).unwrap();
        assert_eq!(forecast.horizon(), 3);
        assert!(!forecast.has_lower());
    }
}
