//! Forecast result structure for holding predictions.

/// A forecast result containing point predictions and optional intervals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: None,
            upper: None,
        }
    }

    /// Create a forecast with prediction intervals.
    pub fn from_values_with_intervals(values: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn primary(&self) -> &[f64] {
        &self.point
    }

    /// Consume the forecast, returning the point predictions.
    pub fn into_values(self) -> Vec<f64> {
        self.point
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    /// Check if lower interval is available.
    pub fn has_lower(&self) -> bool {
        self.lower.is_some()
    }

    /// Check if upper interval is available.
    pub fn has_upper(&self) -> bool {
        self.upper.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_forecast() {
        let f = Forecast::new();
        assert!(f.is_empty());
        assert_eq!(f.horizon(), 0);
        assert!(!f.has_lower());
    }

    #[test]
    fn forecast_with_intervals() {
        let f = Forecast::from_values_with_intervals(
            vec![1.0, 2.0],
            vec![0.5, 1.5],
            vec![1.5, 2.5],
        );
        assert_eq!(f.horizon(), 2);
        assert_eq!(f.lower().unwrap(), &[0.5, 1.5]);
        assert_eq!(f.upper().unwrap(), &[1.5, 2.5]);
        assert_eq!(f.into_values(), vec![1.0, 2.0]);
    }
}
