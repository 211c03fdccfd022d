//! Study configuration.
//!
//! Every field has a default, so an empty TOML document reproduces the
//! reference CO2 analysis: a 12-month season, training data through
//! December 1997, 0.5 baseline weights and the reference search grids.
//! `train_end` may be a TOML date or a quoted `YYYY-MM-DD` string.
//!
//! ```toml
//! seasonal_period = 12
//! train_end = 1997-12-01
//! significance = 0.05
//! decomposition = "additive"
//!
//! [ses]
//! baseline_alpha = 0.5
//! alpha = { start = 0.8, stop = 1.0, step = 0.01 }
//!
//! [tes]
//! seasonal_type = "additive"
//! alpha = { start = 0.2, stop = 1.0, step = 0.1 }
//! ```

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::decomposition::DecompositionModel;
use crate::error::{ForecastError, Result};
use crate::models::exponential::SeasonalType;
use crate::tuning::ParamRange;

/// Settings for [`run_study`](crate::study::run_study).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudyConfig {
    /// Observations per seasonal cycle.
    pub seasonal_period: usize,
    /// Last date of the training part.
    #[serde(deserialize_with = "deserialize_date")]
    pub train_end: Option<NaiveDate>,
    /// Holdout length; takes precedence over `train_end` when set.
    pub test_size: Option<usize>,
    /// ADF significance level.
    pub significance: f64,
    /// Average observations into calendar months before analysis.
    pub resample_monthly: bool,
    pub decomposition: DecompositionModel,
    pub ses: SesConfig,
    pub des: DesConfig,
    pub tes: TesConfig,
}

/// Accept a native TOML date (`1997-12-01`) as well as a quoted one.
fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<toml::Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(toml::Value::String(text)) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid date {text:?}: {e}"))),
        Some(toml::Value::Datetime(datetime)) => match (datetime.date, datetime.time) {
            (Some(date), None) => NaiveDate::from_ymd_opt(
                i32::from(date.year),
                u32::from(date.month),
                u32::from(date.day),
            )
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date {datetime}"))),
            _ => Err(D::Error::custom(format!(
                "expected a date without a time of day, got {datetime}"
            ))),
        },
        Some(other) => Err(D::Error::custom(format!(
            "expected a date, got {}",
            other.type_str()
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SesConfig {
    pub baseline_alpha: f64,
    pub alpha: ParamRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesConfig {
    pub baseline_alpha: f64,
    pub baseline_beta: f64,
    pub alpha: ParamRange,
    pub beta: ParamRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TesConfig {
    pub baseline_alpha: f64,
    pub baseline_beta: f64,
    pub baseline_gamma: f64,
    pub seasonal_type: SeasonalType,
    pub alpha: ParamRange,
    pub beta: ParamRange,
    pub gamma: ParamRange,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            seasonal_period: 12,
            train_end: NaiveDate::from_ymd_opt(1997, 12, 1),
            test_size: None,
            significance: 0.05,
            resample_monthly: true,
            decomposition: DecompositionModel::Additive,
            ses: SesConfig::default(),
            des: DesConfig::default(),
            tes: TesConfig::default(),
        }
    }
}

impl Default for SesConfig {
    fn default() -> Self {
        Self {
            baseline_alpha: 0.5,
            alpha: ParamRange::new(0.8, 1.0, 0.01),
        }
    }
}

impl Default for DesConfig {
    fn default() -> Self {
        let grid = ParamRange::new(0.01, 1.0, 0.10);
        Self {
            baseline_alpha: 0.5,
            baseline_beta: 0.5,
            alpha: grid,
            beta: grid,
        }
    }
}

impl Default for TesConfig {
    fn default() -> Self {
        let grid = ParamRange::new(0.20, 1.0, 0.10);
        Self {
            baseline_alpha: 0.5,
            baseline_beta: 0.5,
            baseline_gamma: 0.5,
            seasonal_type: SeasonalType::Additive,
            alpha: grid,
            beta: grid,
            gamma: grid,
        }
    }
}

impl StudyConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: StudyConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "loaded study configuration");
        Self::from_toml_str(&contents)
    }

    /// Check ranges and cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        if self.seasonal_period < 2 {
            return Err(ForecastError::Config(format!(
                "seasonal_period must be at least 2, got {}",
                self.seasonal_period
            )));
        }
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(ForecastError::Config(format!(
                "significance must lie in (0, 1), got {}",
                self.significance
            )));
        }
        match (self.train_end, self.test_size) {
            (None, None) => {
                return Err(ForecastError::Config(
                    "either train_end or test_size is required".into(),
                ))
            }
            (_, Some(0)) => {
                return Err(ForecastError::Config("test_size must be positive".into()))
            }
            _ => {}
        }

        check_weight("ses.baseline_alpha", self.ses.baseline_alpha)?;
        check_weight("des.baseline_alpha", self.des.baseline_alpha)?;
        check_weight("des.baseline_beta", self.des.baseline_beta)?;
        check_weight("tes.baseline_alpha", self.tes.baseline_alpha)?;
        check_weight("tes.baseline_beta", self.tes.baseline_beta)?;
        check_weight("tes.baseline_gamma", self.tes.baseline_gamma)?;

        check_range("ses.alpha", &self.ses.alpha)?;
        check_range("des.alpha", &self.des.alpha)?;
        check_range("des.beta", &self.des.beta)?;
        check_range("tes.alpha", &self.tes.alpha)?;
        check_range("tes.beta", &self.tes.beta)?;
        check_range("tes.gamma", &self.tes.gamma)?;

        Ok(())
    }
}

fn check_weight(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ForecastError::Config(format!(
            "{name} must lie in (0, 1), got {value}"
        )))
    }
}

fn check_range(name: &str, range: &ParamRange) -> Result<()> {
    let values = range
        .values()
        .map_err(|e| ForecastError::Config(format!("{name}: {e}")))?;
    if values.is_empty() {
        return Err(ForecastError::Config(format!("{name} grid is empty")));
    }
    Ok(())
}
