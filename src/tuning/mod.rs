//! Hyperparameter grid search against a holdout horizon.
//!
//! # Example
//!
//! ```
//! use smoothcast::core::TimeSeries;
//! use smoothcast::tuning::{arange, ses_optimizer};
//!
//! let ts = TimeSeries::from_values(vec![10.0, 11.0, 10.5, 12.0, 12.5, 13.0, 12.8, 13.5]).unwrap();
//! let (train, test) = ts.split_at(6).unwrap();
//!
//! let alphas = arange(0.8, 1.0, 0.01).unwrap();
//! let outcome = ses_optimizer(&train, test.values(), &alphas, test.len()).unwrap();
//! assert_eq!(outcome.num_trials(), 20);
//! ```

mod grid;
mod search;

pub use grid::{arange, DesParams, ParamRange, SesParams, TesGrid, TesParams};
pub use search::{
    des_optimizer, grid_search, ses_optimizer, tes_optimizer, SearchOutcome, Trial,
};
