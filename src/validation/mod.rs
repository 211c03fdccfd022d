//! Stationarity diagnostics.
//!
//! # Example
//!
//! ```
//! use smoothcast::validation::{adf_test, AdfConfig, AdfRegression, Autolag};
//!
//! let series: Vec<f64> = (0..120)
//!     .map(|i| ((i * 31 + 7) % 53) as f64 / 10.0)
//!     .collect();
//!
//! let config = AdfConfig {
//!     max_lag: Some(4),
//!     autolag: Autolag::Fixed,
//!     regression: AdfRegression::Constant,
//! };
//! let result = adf_test(&series, &config).unwrap();
//! assert_eq!(result.used_lag, 4);
//! println!("ADF statistic {:.3}, p-value {:.3}", result.statistic, result.p_value);
//! ```

pub mod stationarity;

pub use stationarity::{
    adf_test, is_stationary, mackinnon_critical_values, mackinnon_p_value, AdfConfig, AdfResult,
    AdfRegression, Autolag, CriticalValues, Stationarity, StationarityVerdict,
};
