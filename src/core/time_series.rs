//! TimeSeries data structure for representing temporal data.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Timelike, Utc};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Policy for handling missing values (NaN/Inf).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingValuePolicy {
    /// Drop observations with missing values.
    Drop,
    /// Fill with a specific value.
    Fill(f64),
    /// Forward fill (use previous valid value).
    ForwardFill,
    /// Backward fill (use next valid value).
    BackwardFill,
    /// Return error if missing values found.
    Error,
}

/// Sampling frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// Calendar months stamped at the first day of the month.
    Monthly,
    /// Constant spacing.
    Fixed(Duration),
}

/// A univariate time series with timestamps and values.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a new series, validating that timestamps strictly increase.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ForecastError::TimestampError(
                "timestamps must be strictly increasing".to_string(),
            ));
        }

        Ok(Self { timestamps, values })
    }

    /// Create a simple univariate time series.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        Self::new(timestamps, values)
    }

    /// Create a monthly series starting at 2000-01-01 from bare values.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        let start = month_start(2000, 1)?;
        let timestamps = (0..values.len())
            .map(|i| add_months(start, i))
            .collect::<Result<Vec<_>>>()?;
        Self::new(timestamps, values)
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get values; kept for symmetry with the model code that reads the
    /// observed dimension.
    pub fn primary_values(&self) -> &[f64] {
        &self.values
    }

    /// Extract a slice of the time series.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        })
    }

    /// Split into `(train, test)` at `index`; train holds `[0, index)`.
    pub fn split_at(&self, index: usize) -> Result<(TimeSeries, TimeSeries)> {
        if index > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index,
                size: self.len(),
            });
        }
        Ok((self.slice(0, index)?, self.slice(index, self.len())?))
    }

    /// Holdout split by calendar date.
    ///
    /// Every observation dated on or before `last_train` goes to the training
    /// part, the remainder to the test part.
    pub fn split_at_date(&self, last_train: NaiveDate) -> Result<(TimeSeries, TimeSeries)> {
        let index = self
            .timestamps
            .partition_point(|t| t.date_naive() <= last_train);

        if index == 0 || index == self.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "split date {} leaves an empty train or test set",
                last_train
            )));
        }

        self.split_at(index)
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Count missing values.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }

    /// Return a sanitized copy with missing values handled.
    pub fn sanitized(&self, policy: MissingValuePolicy) -> Result<TimeSeries> {
        match policy {
            MissingValuePolicy::Error => {
                if self.has_missing_values() {
                    return Err(ForecastError::MissingValues);
                }
                Ok(self.clone())
            }
            MissingValuePolicy::Drop => {
                let (timestamps, values) = self
                    .timestamps
                    .iter()
                    .zip(self.values.iter())
                    .filter(|(_, v)| v.is_finite())
                    .map(|(t, v)| (*t, *v))
                    .unzip();
                Ok(TimeSeries { timestamps, values })
            }
            MissingValuePolicy::Fill(fill_value) => {
                let values = self
                    .values
                    .iter()
                    .map(|&v| if v.is_finite() { v } else { fill_value })
                    .collect();
                Ok(TimeSeries {
                    timestamps: self.timestamps.clone(),
                    values,
                })
            }
            MissingValuePolicy::ForwardFill => {
                let mut result = Vec::with_capacity(self.len());
                let mut last_valid = None;
                for &v in &self.values {
                    if v.is_finite() {
                        last_valid = Some(v);
                        result.push(v);
                    } else {
                        result.push(last_valid.unwrap_or(v));
                    }
                }
                Ok(TimeSeries {
                    timestamps: self.timestamps.clone(),
                    values: result,
                })
            }
            MissingValuePolicy::BackwardFill => {
                let mut result = self.values.clone();
                let mut next_valid = None;
                for v in result.iter_mut().rev() {
                    if v.is_finite() {
                        next_valid = Some(*v);
                    } else if let Some(next) = next_valid {
                        *v = next;
                    }
                }
                Ok(TimeSeries {
                    timestamps: self.timestamps.clone(),
                    values: result,
                })
            }
        }
    }

    /// Aggregate to calendar months by averaging.
    ///
    /// Each month between the first and the last observation gets one entry
    /// stamped at the first of the month. Months with no finite observation
    /// are NaN, so callers usually follow up with [`TimeSeries::sanitized`].
    pub fn resample_monthly_mean(&self) -> Result<TimeSeries> {
        let (first, last) = match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(ForecastError::EmptyData),
        };

        let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
        for (t, &v) in self.timestamps.iter().zip(self.values.iter()) {
            let entry = buckets.entry(month_index(t)).or_insert((0.0, 0));
            if v.is_finite() {
                entry.0 += v;
                entry.1 += 1;
            }
        }

        let start = month_start(first.year(), first.month())?;
        let months = (month_index(&last) - month_index(&first)) as usize + 1;

        let mut timestamps = Vec::with_capacity(months);
        let mut values = Vec::with_capacity(months);
        for offset in 0..months {
            let stamp = add_months(start, offset)?;
            let value = match buckets.get(&month_index(&stamp)) {
                Some(&(sum, count)) if count > 0 => sum / count as f64,
                _ => f64::NAN,
            };
            timestamps.push(stamp);
            values.push(value);
        }

        tracing::debug!(
            observations = self.len(),
            months = months,
            "resampled series to monthly means"
        );

        Ok(TimeSeries { timestamps, values })
    }

    /// Infer the sampling frequency from the timestamps.
    pub fn infer_frequency(&self) -> Result<Frequency> {
        if self.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }

        let month_aligned = self
            .timestamps
            .iter()
            .all(|t| t.day() == 1 && t.num_seconds_from_midnight() == 0);
        let consecutive_months = self
            .timestamps
            .windows(2)
            .all(|w| month_index(&w[1]) - month_index(&w[0]) == 1);

        if month_aligned && consecutive_months {
            return Ok(Frequency::Monthly);
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for w in self.timestamps.windows(2) {
            *counts.entry((w[1] - w[0]).num_seconds()).or_insert(0) += 1;
        }

        // Highest count wins, shortest spacing breaks ties.
        let (modal_diff, _) = counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .ok_or_else(|| ForecastError::FrequencyInference("empty spacing data".to_string()))?;

        Ok(Frequency::Fixed(Duration::seconds(modal_diff)))
    }

    /// Timestamps for the `horizon` periods following the last observation.
    pub fn future_timestamps(&self, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
        let last = *self.timestamps.last().ok_or(ForecastError::EmptyData)?;
        match self.infer_frequency()? {
            Frequency::Monthly => (1..=horizon).map(|h| add_months(last, h)).collect(),
            Frequency::Fixed(step) => Ok((1..=horizon as i32).map(|h| last + step * h).collect()),
        }
    }
}

/// Months since year 0, used as a bucket key.
fn month_index(t: &DateTime<Utc>) -> i64 {
    t.year() as i64 * 12 + t.month0() as i64
}

fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ForecastError::TimestampError(format!("invalid month {}-{}", year, month)))
}

fn add_months(t: DateTime<Utc>, months: usize) -> Result<DateTime<Utc>> {
    t.checked_add_months(Months::new(months as u32))
        .ok_or_else(|| ForecastError::TimestampError("month arithmetic overflow".to_string()))
}
