//! # smoothcast
//!
//! Exponential smoothing for seasonal series.
//!
//! Provides simple, double (Holt) and triple (Holt-Winters) exponential
//! smoothing, classical seasonal decomposition, the Augmented Dickey-Fuller
//! stationarity test and holdout grid search over smoothing weights. The
//! [`study`] module chains them into the monthly CO2 analysis.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod decomposition;
pub mod error;
pub mod io;
pub mod models;
pub mod study;
pub mod tuning;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::config::StudyConfig;
    pub use crate::core::{Forecast, MissingValuePolicy, TimeSeries};
    pub use crate::decomposition::{seasonal_decompose, DecompositionModel};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::exponential::{
        DoubleExponentialSmoothing, HoltWinters, SeasonalType, SimpleExponentialSmoothing,
    };
    pub use crate::models::Forecaster;
    pub use crate::study::{run_study, StudyReport};
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
    pub use crate::validation::{adf_test, is_stationary};
}
